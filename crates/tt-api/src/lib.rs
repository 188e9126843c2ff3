//! Remote API client for the tasks/tickets backend
//!
//! The stores never talk HTTP directly. They go through the [`ApiClient`]
//! trait so the transport can be swapped for a fake in tests. [`HttpApiClient`]
//! is the reqwest-backed implementation used by the binary.

mod error;
mod http;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

pub use error::ApiError;
pub use http::HttpApiClient;

/// Request parameters for a GET, already normalized to plain strings
pub type Params = BTreeMap<String, String>;

/// Backend operations used by the stores
///
/// Every call resolves to the parsed JSON body or rejects with an
/// [`ApiError`] carrying a human-readable message.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn get(&self, path: &str, params: &Params) -> Result<Value, ApiError>;

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError>;

    async fn put(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError>;

    async fn delete(&self, path: &str) -> Result<Value, ApiError>;

    /// Replace the bearer token sent with subsequent requests
    fn set_token(&self, token: Option<String>);
}
