//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use policy::PolicyError;
use serde_json::json;
use thiserror::Error;

use crate::repositories::search::SearchRepoError;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Record missing or not owned by the caller; the two are
    /// indistinguishable on purpose
    #[error("Saved search not found")]
    NotFound,

    /// Tier-rule violation; the message names the limit that was hit
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Storage or other unexpected fault; details go to the log only
    #[error("Internal server error")]
    InternalServerError,
}

impl From<SearchRepoError> for ApiError {
    fn from(err: SearchRepoError) -> Self {
        match err {
            SearchRepoError::Policy(policy) => ApiError::Policy(policy),
            SearchRepoError::Storage(e) => {
                tracing::error!("Saved-search storage fault: {:#}", e);
                ApiError::InternalServerError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Saved search not found".to_string()),
            ApiError::Policy(policy) => (StatusCode::BAD_REQUEST, policy.to_string()),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
