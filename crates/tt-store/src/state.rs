use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::{Catalog, FilterWithLabel, Project};

/// Root application state following Redux pattern
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub tt: TtState,
    pub auth: AuthState,
}

/// Issue browsing state
#[derive(Debug, Clone, Default)]
pub struct TtState {
    /// `None` until the first load completes
    pub catalog: Option<Catalog>,
    pub selection: Selection,
    /// Issue currently opened in the details view
    pub issue: Option<IssueData>,
}

/// The (project, filter, sort) triple driving the issue list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub project: Option<Project>,
    pub filter: Option<FilterWithLabel>,
    pub sort: Option<SortSpec>,
}

impl Selection {
    pub fn acronym(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.acronym.as_str())
    }

    pub fn filter_id(&self) -> Option<&str> {
        self.filter.as_ref().map(FilterWithLabel::id)
    }
}

/// Sort order for the issue list; `direction` carries the sign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub target: String,
    pub direction: i64,
}

impl SortSpec {
    pub fn new(target: &str, direction: i64) -> Self {
        Self {
            target: target.to_string(),
            direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueData {
    pub issue: Issue,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "issueId")]
    pub issue_id: String,
    /// Acronym of the owning project
    pub project: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authentication session state
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub user: Option<Value>,
    pub token: Option<String>,
    /// Device id, generated once per installation
    pub did: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}
