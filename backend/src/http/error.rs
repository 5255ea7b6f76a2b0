//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::imagery::ImageryError;
use crate::models::ParamError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Imagery service error
    Imagery(ImageryError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Imagery(e) => match e {
                ImageryError::NotFound { .. } | ImageryError::Unsupported { .. } => {
                    StatusCode::NOT_FOUND
                }
                ImageryError::Configuration { .. } | ImageryError::Internal { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                // Failures of the upstream imagery service
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Internal(msg) => {
                msg.clone()
            }
            AppError::Imagery(e) => e.to_string(),
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        match self {
            AppError::NotFound(msg) => ApiError::new("NOT_FOUND", msg.as_str()),
            AppError::BadRequest(msg) => ApiError::new("BAD_REQUEST", msg.as_str()),
            AppError::Internal(msg) => ApiError::new("INTERNAL_ERROR", msg.as_str()),
            AppError::Imagery(e) => {
                let error = ApiError::new(e.code(), e.to_string());
                match &e.context().details {
                    Some(details) => error.with_details(details.as_str()),
                    None => error,
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("request failed with {}: {}", status, self.message());
        }
        (status, Json(self.to_api_error())).into_response()
    }
}

impl From<ImageryError> for AppError {
    fn from(err: ImageryError) -> Self {
        AppError::Imagery(err)
    }
}

impl From<ParamError> for AppError {
    fn from(err: ParamError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(ImageryError::quota("limit")).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(ImageryError::authentication("denied")).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(ImageryError::not_found("map")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(ImageryError::configuration("bad")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_body() {
        let err = AppError::from(ImageryError::remote("status 500").with_details("backend down"));
        let body = err.to_api_error();
        assert_eq!(body.code, "REMOTE_ERROR");
        assert_eq!(body.details.as_deref(), Some("backend down"));

        let err = AppError::from(ParamError::UnknownBandMode("swir".into()));
        assert_eq!(err.to_api_error().code, "BAD_REQUEST");
    }
}
