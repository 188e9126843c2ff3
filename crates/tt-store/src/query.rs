//! Issue list request parameters

use std::collections::BTreeMap;
use tt_api::Params;

use crate::{
    error::{Result, StoreError},
    state::Selection,
};

/// Filter value sent when a free-text search replaces the saved filter
pub const SEARCH_FILTER: &str = "#search";

/// One page of the issue list
///
/// `project` and `filter` fall back to the current selection when `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueQuery {
    pub project: Option<String>,
    pub filter: Option<String>,
    pub limit: u32,
    pub skip: u32,
    pub search: Option<String>,
}

impl IssueQuery {
    pub fn page(limit: u32, skip: u32) -> Self {
        Self {
            limit,
            skip,
            ..Default::default()
        }
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

/// Build the normalized parameter set for `tt/issues`
///
/// A search always wins over the saved filter, and exempts the request from
/// needing a filter at all.
pub fn build_issue_params(query: &IssueQuery, selection: &Selection) -> Result<Params> {
    let project = query
        .project
        .clone()
        .or_else(|| selection.acronym().map(str::to_string))
        .filter(|project| !project.is_empty())
        .ok_or_else(|| StoreError::InvalidRequest("Project not selected".into()))?;

    let filter = query
        .filter
        .clone()
        .or_else(|| selection.filter_id().map(str::to_string))
        .filter(|filter| !filter.is_empty());
    let search = query.search.clone().filter(|search| !search.is_empty());

    if filter.is_none() && search.is_none() {
        return Err(StoreError::InvalidRequest("Filter not selected".into()));
    }

    let mut params = BTreeMap::from([
        ("project".to_string(), Some(project)),
        ("filter".to_string(), filter),
        ("skip".to_string(), Some(query.skip.to_string())),
        ("limit".to_string(), Some(query.limit.to_string())),
    ]);

    if let Some(sort) = &selection.sort {
        params.insert(
            format!("sort[{}]", sort.target),
            Some(sort.direction.to_string()),
        );
    }

    if let Some(search) = search {
        params.insert("filter".to_string(), Some(SEARCH_FILTER.to_string()));
        params.insert("search".to_string(), Some(search));
    }

    Ok(filter_undefined(params))
}

/// Drop keys whose value is absent
pub fn filter_undefined(map: BTreeMap<String, Option<String>>) -> BTreeMap<String, String> {
    map.into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect()
}
