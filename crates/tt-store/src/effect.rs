/// Effect system for Redux architecture
/// Reducers return (State, Vec<Effect>) where Effects describe side effects to perform
/// The app executes them once the store lock is released
use ::log::debug;

use crate::{
    app::App,
    error::Result,
    navigation::ISSUES_ROUTE,
};

/// Effects that reducers can request to be performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write a preferences key
    Persist { key: &'static str, value: String },

    /// Delete a preferences key
    RemovePersisted { key: &'static str },

    /// Merge changed selection keys into the URL query; pushed only on the
    /// issues route
    SyncQuery {
        project: Option<String>,
        filter: Option<String>,
    },

    /// Navigate to another path
    Navigate { path: String },

    /// Hand the session token to the API client
    SetApiToken(Option<String>),
}

/// Execute a single effect against the app's collaborators
pub async fn execute_effect(app: &App, effect: Effect) -> Result<()> {
    match effect {
        Effect::Persist { key, value } => {
            debug!("Persisting {} = {}", key, value);
            app.preferences().set(key, &value).await?;
        }

        Effect::RemovePersisted { key } => {
            debug!("Removing persisted {}", key);
            app.preferences().remove(key).await?;
        }

        Effect::SyncQuery { project, filter } => {
            let navigator = app.navigator();
            let mut query = navigator.query();
            if let Some(project) = project {
                query.insert("project".to_string(), Some(project));
            }
            if let Some(filter) = filter {
                query.insert("filter".to_string(), Some(filter));
            }

            if navigator.route_name().as_deref() == Some(ISSUES_ROUTE) {
                debug!("Pushing query {:?}", query);
                navigator.push_query(query);
            }
        }

        Effect::Navigate { path } => {
            debug!("Navigating to {}", path);
            app.navigator().navigate(&path);
        }

        Effect::SetApiToken(token) => {
            app.api().set_token(token);
        }
    }

    Ok(())
}
