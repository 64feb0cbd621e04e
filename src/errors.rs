use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::services::{blob_store::BlobError, tote_service::ServiceError};

/// A lightweight wrapper for handler errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 401 Unauthorized
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

/// Map service failures onto the HTTP error taxonomy: validation problems
/// become 400, missing rows or blobs 404, everything else 500 with the
/// underlying message passed through.
impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::ToteNotFound(_)
            | ServiceError::ItemNotFound(_)
            | ServiceError::ImageNotFound(_)
            | ServiceError::Blob(BlobError::NotFound(_)) => AppError::not_found(message),
            ServiceError::EmptyUpdate | ServiceError::Blob(BlobError::InvalidPath) => {
                AppError::bad_request(message)
            }
            ServiceError::Blob(BlobError::Io(_)) | ServiceError::Sqlx(_) => {
                AppError::internal(message)
            }
        }
    }
}

/// Malformed multipart payloads are a client problem.
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::bad_request(err.to_string())
    }
}
