use crate::{ApiClient, ApiError, Params};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::sync::{PoisonError, RwLock};

/// reqwest-backed [`ApiClient`] talking JSON to the backend
#[derive(Debug)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: RwLock::new(None),
        }
    }

    pub fn with_token(self, token: Option<String>) -> Self {
        self.set_token(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn send(&self, method: &str, path: &str, request: RequestBuilder) -> Result<Value, ApiError> {
        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        debug!("API {} {}", method, path);

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
            debug!("API {} {} failed with {}: {}", method, path, status, message);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        parse_body(&body)
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn get(&self, path: &str, params: &Params) -> Result<Value, ApiError> {
        let request = self.client.get(self.url(path)).query(params);
        self.send("GET", path, request).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let mut request = self.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.send("POST", path, request).await
    }

    async fn put(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let mut request = self.client.put(self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.send("PUT", path, request).await
    }

    async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        let request = self.client.delete(self.url(path));
        self.send("DELETE", path, request).await
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Pull the backend's error text out of a failed response body
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_string)
}

fn parse_body(body: &str) -> Result<Value, ApiError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}
