// ABOUTME: Error types for the store of record

use flowcraft_core::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Referenced {entity} does not exist: {id}")]
    InvalidReference { entity: &'static str, id: String },
    #[error("Invalid stored data: {0}")]
    InvalidData(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl StorageError {
    pub fn issue_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Issue",
            id: id.into(),
        }
    }

    pub fn sprint_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Sprint",
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
