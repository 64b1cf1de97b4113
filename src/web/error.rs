//! HTTP error responses

use crate::error::{RepositoryError, SearchError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error returned by handlers, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError(pub SearchError);

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self(SearchError::validation(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self(SearchError::not_found(message))
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            SearchError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SearchError::NotFound(_) => StatusCode::NOT_FOUND,
            SearchError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        Self(err)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self(SearchError::Repository(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self.0 {
            SearchError::Repository(err) => {
                tracing::error!("Repository failure: {}", err);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
