//! API error responses.
//!
//! # Responsibilities
//! - Map validation, auth, store and upload failures to status codes
//! - Render every failure as `{"error": "<message>"}`
//! - Keep internal diagnostics in the logs, not in the response body
//!
//! # Design Decisions
//! - 404 only for a missing record; every other store failure is a 500
//! - Messages for 500s name the operation ("Failed to fetch projects")

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::content::ValidationError;
use crate::store::StoreError;
use crate::http::upload::UploadError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Too many requests")]
    RateLimited,

    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Unexpected failure; the message is what the client sees.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Map a store failure for `what`, logging the original error.
    pub fn from_store(err: StoreError, what: &'static str, failure_message: impl Into<String>) -> Self {
        if err.is_not_found() {
            return ApiError::NotFound(what);
        }
        let failure_message = failure_message.into();
        tracing::error!(error = %err, "{}", failure_message);
        ApiError::Internal(failure_message)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upload(err) => err.status(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
