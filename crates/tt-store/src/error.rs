use thiserror::Error;
use tt_api::ApiError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unresolvable project acronym or filter identifier
    #[error("{0}")]
    NotFound(String),
    /// Required selection missing before a request
    #[error("{0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("preferences: {0}")]
    Preferences(String),
    #[error("malformed data: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("background task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub(crate) fn project_not_found() -> Self {
        StoreError::NotFound("Project not found".into())
    }

    pub(crate) fn filter_not_found() -> Self {
        StoreError::NotFound("Filter not found".into())
    }

    pub(crate) fn issue_not_selected() -> Self {
        StoreError::InvalidRequest("Issue not selected".into())
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
