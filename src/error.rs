//! Error types shared by repositories, the search aggregator and transports

use thiserror::Error;

/// Failure inside a data-access component
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Stored record is malformed: {0}")]
    Corrupt(String),

    #[error("{0} query timed out")]
    Timeout(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Corrupt(err.to_string())
    }
}

impl From<tokio::task::JoinError> for RepositoryError {
    fn from(err: tokio::task::JoinError) -> Self {
        RepositoryError::Task(err.to_string())
    }
}

/// Failure of a search or lookup request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// Bad input shape or bounds, reported to the caller
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Underlying data access failed
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SearchError {
    pub fn validation(message: impl Into<String>) -> Self {
        SearchError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        SearchError::NotFound(message.into())
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;
