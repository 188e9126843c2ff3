use serde_json::Value;

use crate::{
    catalog::{Catalog, FilterWithLabel, Project},
    state::{IssueData, Selection, SortSpec},
};

/// Action enum - represents all possible state changes
/// Actions are dispatched to the reducer to update state
#[derive(Debug, Clone)]
pub enum Action {
    // Issue browsing
    CatalogLoaded(Catalog),
    SetProject(Option<Project>),
    SetFilter(Option<FilterWithLabel>),
    SetSort(Option<SortSpec>),
    /// Replace the whole triple at once (one synchronization pass)
    SetSelection(Selection),
    /// Set project and filter together; `None` leaves the field untouched
    SelectFromUrl {
        project: Option<Project>,
        filter: Option<FilterWithLabel>,
    },
    IssueLoaded(IssueData),

    // Authentication
    LoginStarted,
    LoginSucceeded { token: String },
    LoginFailed(String),
    UserLoaded(Value),
    SetAuthLoading(bool),
    LoggedOut,
    TokenRestored(String),
    DeviceIdRestored(String),
    DeviceIdGenerated(String),
}
