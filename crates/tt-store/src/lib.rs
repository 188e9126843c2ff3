//! Client-side stores for the tasks/tickets app
//!
//! Holds the issue-browsing selection (project, filter, sort) and the
//! authentication session in a Redux-style [`Store`], resolves selections
//! against the backend's metadata catalog, and keeps the selection mirrored
//! to the URL query and to persisted preferences. All real work is delegated
//! to an [`tt_api::ApiClient`].

pub mod actions;
pub mod app;
mod auth;
pub mod catalog;
pub mod effect;
pub mod error;
mod issues;
pub mod navigation;
pub mod preferences;
pub mod query;
pub mod reducer;
pub mod state;
pub mod store;

pub use actions::Action;
pub use app::{App, LoadHandle, LoadOutcome};
pub use catalog::{Catalog, Filter, FilterWithLabel, Project};
pub use error::{Result, StoreError};
pub use navigation::{ISSUES_ROUTE, Location, MemoryNavigator, Navigator, Query};
pub use preferences::{FilePreferences, MemoryPreferences, Preferences};
pub use query::{IssueQuery, SEARCH_FILTER, build_issue_params, filter_undefined};
pub use state::{AppState, AuthState, IssueData, Selection, SortSpec};
pub use store::{Notifications, Store, SubscriptionId};
