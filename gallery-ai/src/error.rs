//! Error envelope for HTTP-facing consumers
//!
//! Pipeline errors already carry a machine-readable kind, so the response
//! status and code come straight from `gallery_common::Error` and no message
//! inspection is needed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gallery_common::Error;
use serde_json::{json, Value};
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Pipeline error of a known kind
    #[error(transparent)]
    Common(#[from] Error),

    /// Anything else (500)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Common(err) => err.status_code(),
            ApiError::Other(_) => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Common(err) => err.code(),
            ApiError::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// `{ "success": false, "error": { "message", "code", "statusCode" } }`
    pub fn envelope(&self) -> Value {
        let message = match self {
            ApiError::Common(err) => err.message().to_string(),
            ApiError::Other(err) => err.to_string(),
        };

        json!({
            "success": false,
            "error": {
                "message": message,
                "code": self.code(),
                "statusCode": self.status_code(),
            }
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.envelope())).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
