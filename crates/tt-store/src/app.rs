use ::log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tt_api::{ApiClient, Params};

use crate::{
    actions::Action,
    catalog::{Catalog, FilterWithLabel, Project},
    effect::execute_effect,
    error::{Result, StoreError},
    navigation::{Navigator, query_param},
    preferences::{LAST_FILTER, LAST_PROJECT, LAST_SORT, Preferences},
    state::{AppState, Selection, SortSpec},
    store::{Store, SubscriptionId},
};

pub(crate) const CATALOG_PATH: &str = "tt/tt";

/// The client-side stores wired to their collaborators
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct App {
    store: Arc<Mutex<Store>>,
    api: Arc<dyn ApiClient>,
    preferences: Arc<dyn Preferences>,
    navigator: Arc<dyn Navigator>,
}

impl App {
    pub fn new(
        api: Arc<dyn ApiClient>,
        preferences: Arc<dyn Preferences>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            api,
            preferences,
            navigator,
        }
    }

    pub fn api(&self) -> &dyn ApiClient {
        self.api.as_ref()
    }

    pub fn preferences(&self) -> &dyn Preferences {
        self.preferences.as_ref()
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    /// Snapshot of the whole state
    pub fn state(&self) -> AppState {
        self.store().state().clone()
    }

    pub fn selection(&self) -> Selection {
        self.store().state().tt.selection.clone()
    }

    pub(crate) fn with_state<R>(&self, read: impl FnOnce(&AppState) -> R) -> R {
        read(self.store().state())
    }

    /// Observe selection changes, see [`Store::subscribe`]
    pub fn subscribe(
        &self,
        subscriber: impl Fn(&Selection, &Selection) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.store().subscribe(Arc::new(subscriber))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store().unsubscribe(id)
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Dispatch an action and run the effects it produced
    ///
    /// Selection subscribers run first, with the store unlocked so they may
    /// read the app state. Effects are independent: a failing preferences
    /// write is logged and does not stop the others.
    pub async fn dispatch(&self, action: Action) {
        let (effects, notifications) = {
            let mut store = self.store();
            let effects = store.dispatch(action);
            (effects, store.take_notifications())
        };
        notifications.deliver();

        for effect in effects {
            let description = format!("{:?}", effect);
            if let Err(e) = execute_effect(self, effect).await {
                warn!("Effect {} failed: {}", description, e);
            }
        }
    }

    pub async fn set_project(&self, project: Option<Project>) {
        self.dispatch(Action::SetProject(project)).await;
    }

    pub async fn set_filter(&self, filter: Option<FilterWithLabel>) {
        self.dispatch(Action::SetFilter(filter)).await;
    }

    pub async fn set_sort(&self, sort: Option<SortSpec>) {
        self.dispatch(Action::SetSort(sort)).await;
    }

    pub async fn set_selection(&self, selection: Selection) {
        self.dispatch(Action::SetSelection(selection)).await;
    }

    /// Resolve an acronym against the loaded catalog
    pub fn resolve_project(&self, acronym: &str) -> Result<Project> {
        self.with_state(|state| match &state.tt.catalog {
            Some(catalog) => catalog.resolve_project(acronym),
            None => Err(StoreError::project_not_found()),
        })
    }

    /// Resolve a filter within `project`, or within the selected project
    /// when `project` is `None`
    pub fn resolve_filter(&self, filter_id: &str, project: Option<&Project>) -> Result<FilterWithLabel> {
        self.with_state(|state| {
            let catalog = state
                .tt
                .catalog
                .as_ref()
                .ok_or_else(StoreError::project_not_found)?;
            let project = project.or(state.tt.selection.project.as_ref());
            catalog.resolve_filter(filter_id, project)
        })
    }

    /// Fetch the catalog and establish the initial selection
    ///
    /// URL query parameters win over persisted last-used values; the
    /// persisted value is only read when the URL has none. Persisted reads
    /// run as background tasks and their failures stay on the returned
    /// [`LoadHandle`]: `load` itself only fails when the catalog fetch does.
    ///
    /// The background branches are not fenced against later mutations; a
    /// slow branch overwrites whatever was selected in the meantime.
    pub async fn load(&self) -> Result<LoadHandle> {
        let body = self.api.get(CATALOG_PATH, &Params::new()).await?;
        let catalog: Catalog = field(body, "meta")?;
        debug!("Catalog loaded with {} projects", catalog.projects.len());
        self.dispatch(Action::CatalogLoaded(catalog)).await;

        let query = self.navigator.query();

        let url_project = query_param(&query, "project").map(|acronym| self.resolve_project(&acronym));
        let url_filter = query_param(&query, "filter").map(|filter_id| {
            let project = match &url_project {
                Some(Ok(project)) => Some(project),
                _ => None,
            };
            self.resolve_filter(&filter_id, project)
        });
        self.select_from_url(url_project.as_ref(), url_filter.as_ref()).await;

        let project = match url_project {
            Some(resolved) => Branch::Settled(resolved.map(|_| ())),
            None => Branch::Pending(tokio::spawn({
                let app = self.clone();
                async move { app.restore_project().await }
            })),
        };

        let filter = match url_filter {
            Some(resolved) => Branch::Settled(resolved.map(|_| ())),
            None => Branch::Pending(tokio::spawn({
                let app = self.clone();
                async move { app.restore_filter().await }
            })),
        };

        let sort = Branch::Pending(tokio::spawn({
            let app = self.clone();
            async move { app.restore_sort().await }
        }));

        Ok(LoadHandle {
            project: project.log_failure("project"),
            filter: filter.log_failure("filter"),
            sort,
        })
    }

    /// Commit whatever resolved from the URL in a single dispatch
    async fn select_from_url(
        &self,
        project: Option<&Result<Project>>,
        filter: Option<&Result<FilterWithLabel>>,
    ) {
        let project = project.and_then(|resolved| resolved.as_ref().ok()).cloned();
        let filter = filter.and_then(|resolved| resolved.as_ref().ok()).cloned();
        if project.is_some() || filter.is_some() {
            self.dispatch(Action::SelectFromUrl { project, filter }).await;
        }
    }

    async fn select_project(&self, acronym: &str) -> Result<()> {
        let project = self.resolve_project(acronym)?;
        self.set_project(Some(project)).await;
        Ok(())
    }

    async fn select_filter(&self, filter_id: &str) -> Result<()> {
        let filter = self.resolve_filter(filter_id, None)?;
        self.set_filter(Some(filter)).await;
        Ok(())
    }

    async fn restore_project(&self) -> Result<()> {
        let restored = match self.preferences.get(LAST_PROJECT).await? {
            Some(acronym) if !acronym.is_empty() => self.select_project(&acronym).await,
            _ => Ok(()),
        };
        restored.inspect_err(|e| warn!("Failed to restore last project: {}", e))
    }

    async fn restore_filter(&self) -> Result<()> {
        let restored = match self.preferences.get(LAST_FILTER).await? {
            Some(filter_id) if !filter_id.is_empty() => self.select_filter(&filter_id).await,
            _ => Ok(()),
        };
        restored.inspect_err(|e| warn!("Failed to restore last filter: {}", e))
    }

    async fn restore_sort(&self) -> Result<()> {
        let Some(json) = self.preferences.get(LAST_SORT).await? else {
            return Ok(());
        };
        if json.is_empty() {
            return Ok(());
        }

        let sort: Option<SortSpec> = serde_json::from_str(&json)
            .inspect_err(|e| warn!("Failed to restore last sort: {}", e))?;
        self.set_sort(sort).await;
        Ok(())
    }
}

/// Deserialize one field of a response body
pub(crate) fn field<T: DeserializeOwned>(mut body: Value, key: &str) -> Result<T> {
    let value = body.get_mut(key).map(Value::take).unwrap_or(Value::Null);
    Ok(serde_json::from_value(value)?)
}

enum Branch {
    Settled(Result<()>),
    Pending(JoinHandle<Result<()>>),
}

impl Branch {
    fn log_failure(self, name: &str) -> Self {
        if let Branch::Settled(Err(e)) = &self {
            warn!("Failed to select {} from URL: {}", name, e);
        }
        self
    }

    async fn settle(self) -> Result<()> {
        match self {
            Branch::Settled(result) => result,
            Branch::Pending(handle) => handle
                .await
                .map_err(|e| StoreError::Task(e.to_string()))?,
        }
    }
}

/// The selection branches started by [`App::load`]
///
/// Dropping the handle leaves the branches running.
pub struct LoadHandle {
    project: Branch,
    filter: Branch,
    sort: Branch,
}

/// How each load-time branch ended
#[derive(Debug)]
pub struct LoadOutcome {
    pub project: Result<()>,
    pub filter: Result<()>,
    pub sort: Result<()>,
}

impl LoadOutcome {
    pub fn is_ok(&self) -> bool {
        self.project.is_ok() && self.filter.is_ok() && self.sort.is_ok()
    }
}

impl LoadHandle {
    /// Wait for every branch to finish
    pub async fn settled(self) -> LoadOutcome {
        let (project, filter, sort) =
            tokio::join!(self.project.settle(), self.filter.settle(), self.sort.settle());
        LoadOutcome {
            project,
            filter,
            sort,
        }
    }
}
