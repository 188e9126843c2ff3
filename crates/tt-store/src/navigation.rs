use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// URL query parameters; a key may be present without a value
pub type Query = BTreeMap<String, Option<String>>;

/// Route name of the issue list view
pub const ISSUES_ROUTE: &str = "issues";

/// Navigation/query context the stores read from and push to
pub trait Navigator: Send + Sync {
    /// Name of the route currently shown, if any
    fn route_name(&self) -> Option<String>;

    fn query(&self) -> Query;

    /// Replace the current query parameters
    fn push_query(&self, query: Query);

    fn navigate(&self, path: &str);
}

/// A single history entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Query,
}

impl Location {
    /// Value of a query parameter; `None` also for a key without value
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).and_then(Option::as_deref)
    }
}

/// In-memory router
///
/// Route names are derived from the first path segment: `/issues/ENG`
/// is `issues`, `/` is `home`.
#[derive(Debug)]
pub struct MemoryNavigator {
    inner: Mutex<NavigatorState>,
}

#[derive(Debug)]
struct NavigatorState {
    path: String,
    query: Query,
    history: Vec<Location>,
}

impl MemoryNavigator {
    pub fn new(path: &str, query: Query) -> Self {
        Self {
            inner: Mutex::new(NavigatorState {
                path: path.to_string(),
                query,
                history: Vec::new(),
            }),
        }
    }

    pub fn path(&self) -> String {
        self.state().path.clone()
    }

    /// Every push and navigation, oldest first
    pub fn history(&self) -> Vec<Location> {
        self.state().history.clone()
    }

    fn state(&self) -> MutexGuard<'_, NavigatorState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for MemoryNavigator {
    fn route_name(&self) -> Option<String> {
        route_name_for(&self.state().path)
    }

    fn query(&self) -> Query {
        self.state().query.clone()
    }

    fn push_query(&self, query: Query) {
        let mut state = self.state();
        state.query = query.clone();
        let location = Location {
            path: state.path.clone(),
            query,
        };
        state.history.push(location);
    }

    fn navigate(&self, path: &str) {
        let mut state = self.state();
        state.path = path.to_string();
        state.query.clear();
        state.history.push(Location {
            path: path.to_string(),
            query: Query::new(),
        });
    }
}

fn route_name_for(path: &str) -> Option<String> {
    let path = path.split(['?', '#']).next()?;
    let segment = path.trim_matches('/').split('/').next()?;
    Some(if segment.is_empty() { "home" } else { segment }.to_string())
}

/// Read a query parameter as a non-empty string
pub fn query_param(query: &Query, key: &str) -> Option<String> {
    query
        .get(key)
        .and_then(Option::as_deref)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
