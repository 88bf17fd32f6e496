//! API error taxonomy and HTTP mapping
//!
//! Credential mismatch on manual login is deliberately NOT here: the legacy
//! contract answers it with 200 `{success:false}`, so the login handler
//! builds that response itself.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repositories::StudentStoreError;

/// Errors a handler can surface to the client
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing client input
    #[error("{0}")]
    Validation(String),

    /// Unique-constraint conflict
    #[error("{0}")]
    Conflict(String),

    /// No such resource
    #[error("{0}")]
    NotFound(String),

    /// Missing, invalid, or revoked session token
    #[error("Unauthorized")]
    Unauthorized,

    /// Valid session, insufficient role
    #[error("Forbidden")]
    Forbidden,

    /// Login attempts throttled
    #[error("Too many login attempts. Please try again later.")]
    TooManyRequests,

    /// Unexpected store or provider failure
    #[error("Server error")]
    Internal,
}

impl From<StudentStoreError> for ApiError {
    fn from(err: StudentStoreError) -> Self {
        match err {
            StudentStoreError::DuplicateNumber => {
                ApiError::Conflict("Student number already exists.".to_string())
            }
            StudentStoreError::NotFound => ApiError::NotFound("Student not found".to_string()),
            StudentStoreError::Database(e) => {
                tracing::error!("Student store error: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
