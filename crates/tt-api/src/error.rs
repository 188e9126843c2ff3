use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Backend answered with a non-success status
    #[error("{message}")]
    Status { status: u16, message: String },
    /// Request never produced a response (DNS, TLS, connection reset...)
    #[error("{0}")]
    Transport(String),
    /// Response body was not the JSON we expected
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Human-readable message, as shown to the user
    pub fn message(&self) -> &str {
        match self {
            ApiError::Status { message, .. } => message,
            ApiError::Transport(message) | ApiError::Decode(message) => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
