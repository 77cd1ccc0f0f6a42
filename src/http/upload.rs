//! Image upload endpoint.
//!
//! # Responsibilities
//! - Accept one multipart `file` field from an authenticated admin
//! - Reject non-images and files over the configured size
//! - Hand the bytes to the blob store and return its public URL

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::auth::AdminSession;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file provided")]
    NoFile,

    #[error("File must be an image")]
    NotAnImage,

    #[error("File too large (max {max_bytes} bytes)")]
    TooLarge { max_bytes: usize },

    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Failed to upload file")]
    Storage(#[source] std::io::Error),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::NoFile | UploadError::NotAnImage => StatusCode::BAD_REQUEST,
            UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Multipart(err) => err.status(),
            UploadError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Check the declared content type and the received size.
pub fn check_image(content_type: &str, len: usize, max_bytes: usize) -> Result<(), UploadError> {
    if !content_type.starts_with("image/") {
        return Err(UploadError::NotAnImage);
    }
    if len > max_bytes {
        return Err(UploadError::TooLarge { max_bytes });
    }
    Ok(())
}

/// `POST /api/upload`
pub async fn upload(
    State(state): State<AppState>,
    _admin: AdminSession,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    match store_upload(&state, multipart).await {
        Ok(url) => {
            metrics::record_upload("stored");
            Ok(Json(json!({ "url": url })))
        }
        Err(err) => {
            let outcome = if err.status().is_server_error() { "failed" } else { "rejected" };
            metrics::record_upload(outcome);
            match &err {
                UploadError::Storage(source) => tracing::error!(error = %source, "Upload failed"),
                other => tracing::debug!(error = %other, "Upload rejected"),
            }
            Err(err.into())
        }
    }
}

async fn store_upload(state: &AppState, mut multipart: Multipart) -> Result<String, UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        check_image(&content_type, data.len(), state.uploads.max_bytes)?;

        return state
            .blobs
            .put(&file_name, data)
            .await
            .map_err(UploadError::Storage);
    }
    Err(UploadError::NoFile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_image() {
        assert!(check_image("image/png", 10, 100).is_ok());
        assert!(check_image("image/png", 100, 100).is_ok());
        assert!(matches!(check_image("text/plain", 10, 100), Err(UploadError::NotAnImage)));
        assert!(matches!(check_image("", 10, 100), Err(UploadError::NotAnImage)));
        assert!(matches!(
            check_image("image/jpeg", 101, 100),
            Err(UploadError::TooLarge { max_bytes: 100 })
        ));
    }

    #[test]
    fn test_statuses() {
        assert_eq!(UploadError::NoFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(UploadError::NotAnImage.status(), StatusCode::BAD_REQUEST);
        assert_eq!(UploadError::TooLarge { max_bytes: 1 }.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            UploadError::Storage(std::io::Error::other("disk full")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
