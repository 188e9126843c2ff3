use crate::{
    actions::Action,
    effect::Effect,
    preferences::{DEVICE_ID, LAST_FILTER, LAST_PROJECT, LAST_SORT, TOKEN},
    state::*,
};

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

/// Root reducer that delegates to sub-reducers based on action type
/// Pure function: takes state and action, returns (new state, effects to perform)
pub fn reduce(mut state: AppState, action: &Action) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();

    let (tt_state, tt_effects) = tt_reducer(state.tt, action);
    state.tt = tt_state;
    effects.extend(tt_effects);

    let (auth_state, auth_effects) = auth_reducer(state.auth, action);
    state.auth = auth_state;
    effects.extend(auth_effects);

    (state, effects)
}

/// Issue browsing reducer
///
/// Any change to the selection triple yields exactly one synchronization
/// pass, see [`sync_effects`].
fn tt_reducer(mut state: TtState, action: &Action) -> (TtState, Vec<Effect>) {
    let previous = state.selection.clone();

    match action {
        Action::CatalogLoaded(catalog) => {
            state.catalog = Some(catalog.clone());
        }
        Action::SetProject(project) => {
            state.selection.project = project.clone();
        }
        Action::SetFilter(filter) => {
            state.selection.filter = filter.clone();
        }
        Action::SetSort(sort) => {
            state.selection.sort = sort.clone();
        }
        Action::SetSelection(selection) => {
            state.selection = selection.clone();
        }
        Action::SelectFromUrl { project, filter } => {
            if let Some(project) = project {
                state.selection.project = Some(project.clone());
            }
            if let Some(filter) = filter {
                state.selection.filter = Some(filter.clone());
            }
        }
        Action::IssueLoaded(issue) => {
            state.issue = Some(issue.clone());
        }
        _ => {}
    }

    let effects = sync_effects(&previous, &state.selection);
    (state, effects)
}

/// Mirror a selection change to the URL query and to preferences
///
/// Project and filter are compared by natural key and only merged/persisted
/// when the new value is set. Sort is compared by its JSON text and never
/// reaches the URL. The query sync is emitted once per change; the executor
/// decides whether the current route gets a navigation push.
pub fn sync_effects(previous: &Selection, next: &Selection) -> Vec<Effect> {
    if previous == next {
        return vec![];
    }

    let mut effects = Vec::new();

    let project = next
        .acronym()
        .filter(|acronym| !acronym.is_empty() && previous.acronym() != Some(*acronym))
        .map(str::to_string);
    if let Some(acronym) = &project {
        effects.push(Effect::Persist {
            key: LAST_PROJECT,
            value: acronym.clone(),
        });
    }

    let filter = next
        .filter_id()
        .filter(|id| !id.is_empty() && previous.filter_id() != Some(*id))
        .map(str::to_string);
    if let Some(id) = &filter {
        effects.push(Effect::Persist {
            key: LAST_FILTER,
            value: id.clone(),
        });
    }

    let next_sort = sort_json(next.sort.as_ref());
    if next_sort != sort_json(previous.sort.as_ref()) {
        effects.push(Effect::Persist {
            key: LAST_SORT,
            value: next_sort,
        });
    }

    effects.push(Effect::SyncQuery { project, filter });
    effects
}

/// JSON text of a sort, `null` when absent
pub fn sort_json(sort: Option<&SortSpec>) -> String {
    serde_json::to_string(&sort).unwrap_or_default()
}

/// Authentication reducer
fn auth_reducer(mut state: AuthState, action: &Action) -> (AuthState, Vec<Effect>) {
    match action {
        Action::LoginStarted => {
            state.loading = true;
            state.error = None;
        }
        Action::LoginSucceeded { token } => {
            state.token = Some(token.clone());
            return (
                state,
                vec![
                    Effect::Persist {
                        key: TOKEN,
                        value: token.clone(),
                    },
                    Effect::SetApiToken(Some(token.clone())),
                    Effect::Navigate {
                        path: HOME_PATH.to_string(),
                    },
                ],
            );
        }
        Action::LoginFailed(message) => {
            state.error = Some(if message.is_empty() {
                "Login failed".to_string()
            } else {
                message.clone()
            });
        }
        Action::UserLoaded(user) => {
            state.user = Some(user.clone());
        }
        Action::SetAuthLoading(loading) => {
            state.loading = *loading;
        }
        Action::LoggedOut => {
            state.user = None;
            state.token = None;
            return (
                state,
                vec![
                    Effect::RemovePersisted { key: TOKEN },
                    Effect::SetApiToken(None),
                    Effect::Navigate {
                        path: LOGIN_PATH.to_string(),
                    },
                ],
            );
        }
        Action::TokenRestored(token) => {
            state.token = Some(token.clone());
            state.loading = true;
            return (state, vec![Effect::SetApiToken(Some(token.clone()))]);
        }
        Action::DeviceIdRestored(did) => {
            state.did = Some(did.clone());
        }
        Action::DeviceIdGenerated(did) => {
            state.did = Some(did.clone());
            return (
                state,
                vec![Effect::Persist {
                    key: DEVICE_ID,
                    value: did.clone(),
                }],
            );
        }
        _ => {}
    }

    (state, vec![])
}
