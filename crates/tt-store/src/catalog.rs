//! Metadata catalog and the selection resolver
//!
//! The catalog is fetched once per load and never mutated afterwards.
//! Resolution turns user-facing identifiers (a project acronym, a filter id)
//! into the concrete catalog entries; it only reads, callers decide whether
//! to commit the result into the selection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Filter identifier -> human-readable label
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub acronym: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    pub fn new(acronym: &str, filters: Vec<Filter>) -> Self {
        Self {
            acronym: acronym.to_string(),
            filters,
            extra: Map::new(),
        }
    }
}

/// A saved issue filter, scoped to one project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub filter: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Filter {
    pub fn new(filter: &str) -> Self {
        Self {
            filter: filter.to_string(),
            extra: Map::new(),
        }
    }
}

/// A [`Filter`] decorated with its display label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterWithLabel {
    pub label: String,
    #[serde(flatten)]
    pub filter: Filter,
}

impl FilterWithLabel {
    /// The filter identifier
    pub fn id(&self) -> &str {
        &self.filter.filter
    }
}

impl Catalog {
    pub fn project(&self, acronym: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.acronym == acronym)
    }

    /// Resolve a project by its acronym (first match wins)
    pub fn resolve_project(&self, acronym: &str) -> Result<Project> {
        self.project(acronym)
            .cloned()
            .ok_or_else(StoreError::project_not_found)
    }

    /// Resolve a filter identifier within `project`
    ///
    /// `project` is whatever the caller considers current; `None` means no
    /// project is selected and resolution fails. The catalog's label wins
    /// over the filter's own identifier.
    pub fn resolve_filter(&self, filter_id: &str, project: Option<&Project>) -> Result<FilterWithLabel> {
        let project = project.ok_or_else(StoreError::project_not_found)?;
        let filter = project
            .filters
            .iter()
            .find(|f| f.filter == filter_id)
            .ok_or_else(StoreError::filter_not_found)?;

        let label = self
            .filters
            .get(filter_id)
            .filter(|label| !label.is_empty())
            .cloned()
            .unwrap_or_else(|| filter.filter.clone());

        let mut filter = filter.clone();
        filter.extra.remove("label");

        Ok(FilterWithLabel { label, filter })
    }
}
