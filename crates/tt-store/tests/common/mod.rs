#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tt_api::{ApiClient, ApiError, Params};
use tt_store::{App, MemoryNavigator, Preferences, Query, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: &'static str,
    pub path: String,
    pub params: Params,
    pub body: Option<Value>,
}

/// Scripted API client recording every request
#[derive(Default)]
pub struct FakeApi {
    responses: Mutex<HashMap<(&'static str, String), Result<Value, ApiError>>>,
    requests: Mutex<Vec<Request>>,
    token: Mutex<Option<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &'static str, path: &str, response: Result<Value, ApiError>) {
        self.responses
            .lock()
            .unwrap()
            .insert((method, path.to_string()), response);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn call(&self, method: &'static str, path: &str, params: Params, body: Option<Value>) -> Result<Value, ApiError> {
        self.requests.lock().unwrap().push(Request {
            method,
            path: path.to_string(),
            params,
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .get(&(method, path.to_string()))
            .cloned()
            .unwrap_or_else(|| {
                Err(ApiError::Status {
                    status: 404,
                    message: format!("no route for {} {}", method, path),
                })
            })
    }
}

#[async_trait]
impl ApiClient for FakeApi {
    async fn get(&self, path: &str, params: &Params) -> Result<Value, ApiError> {
        self.call("GET", path, params.clone(), None)
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        self.call("POST", path, Params::new(), body)
    }

    async fn put(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        self.call("PUT", path, Params::new(), body)
    }

    async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.call("DELETE", path, Params::new(), None)
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.lock().unwrap() = token;
    }
}

/// Preferences recording reads and writes; a read of a held key returns the
/// value seen at call time, but only once released
#[derive(Default)]
pub struct RecordingPreferences {
    values: Mutex<BTreeMap<String, String>>,
    reads: Mutex<Vec<String>>,
    writes: Mutex<Vec<(String, Option<String>)>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl RecordingPreferences {
    pub fn with_values(values: &[(&str, &str)]) -> Self {
        let prefs = Self::default();
        prefs.values.lock().unwrap().extend(
            values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        prefs
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    /// `(key, Some(value))` for a set, `(key, None)` for a remove
    pub fn writes(&self) -> Vec<(String, Option<String>)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn writes_to(&self, key: &str) -> Vec<Option<String>> {
        self.writes()
            .into_iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v)
            .collect()
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// Make reads of `key` wait until the returned handle is notified
    pub fn hold(&self, key: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), gate.clone());
        gate
    }
}

#[async_trait]
impl Preferences for RecordingPreferences {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.reads.lock().unwrap().push(key.to_string());
        let value = self.values.lock().unwrap().get(key).cloned();
        let gate = self.gates.lock().unwrap().get(key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), Some(value.to_string())));
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.writes.lock().unwrap().push((key.to_string(), None));
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

pub fn catalog_body() -> Value {
    json!({
        "meta": {
            "projects": [
                {
                    "acronym": "ENG",
                    "filters": [
                        { "filter": "open" },
                        { "filter": "closed" }
                    ]
                },
                {
                    "acronym": "OPS",
                    "filters": [{ "filter": "open" }, { "filter": "oncall" }]
                }
            ],
            "filters": { "open": "Open issues", "closed": "Closed issues" }
        },
        "project": null
    })
}

pub fn query(pairs: &[(&str, &str)]) -> Query {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Some(v.to_string())))
        .collect()
}

pub struct Harness {
    pub app: App,
    pub api: Arc<FakeApi>,
    pub prefs: Arc<RecordingPreferences>,
    pub nav: Arc<MemoryNavigator>,
}

/// App at `path` with `query` in the URL, the catalog endpoint scripted
pub fn harness(path: &str, url_query: Query, prefs: RecordingPreferences) -> Harness {
    let api = Arc::new(FakeApi::new());
    api.respond("GET", "tt/tt", Ok(catalog_body()));
    let prefs = Arc::new(prefs);
    let nav = Arc::new(MemoryNavigator::new(path, url_query));
    let app = App::new(api.clone(), prefs.clone(), nav.clone());
    Harness {
        app,
        api,
        prefs,
        nav,
    }
}
