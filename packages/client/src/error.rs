// ABOUTME: Error types for the client library
// ABOUTME: Maps transport failures and API error bodies onto one taxonomy

use flowcraft_config::ConfigError;
use flowcraft_core::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    pub fn issue_not_found(issue_id: &str) -> Self {
        ClientError::NotFound(format!("Issue not found: {}", issue_id))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    /// Build the error for a non-2xx response from its status and `error` message
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => ClientError::BadRequest(message),
            401 | 403 => ClientError::Unauthorized(message),
            404 => ClientError::NotFound(message),
            409 => ClientError::Conflict(message),
            _ => ClientError::Server { status, message },
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
