//! HTTP response types and utilities
//!
//! Standardized JSON envelopes for the health and error responses. The
//! resize endpoint answers with a bare result array and the image endpoint
//! with raw JPEG bytes, so neither goes through `ApiResponse` on success.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, ResizeError};
use crate::services::ServiceStats;

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Request timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create an error response
    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Health check payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cached_entries: usize,
    pub in_flight_jobs: usize,
    pub available_job_permits: usize,
}

impl HealthResponse {
    pub fn healthy(stats: ServiceStats) -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            cached_entries: stats.cached_entries,
            in_flight_jobs: stats.in_flight_jobs,
            available_job_permits: stats.available_job_permits,
        }
    }
}

/// Convert AppError to appropriate HTTP response
pub fn handle_error(error: AppError) -> Response {
    let (status, message) = match &error {
        AppError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
        AppError::Resize(ResizeError::CallerCancelled { key }) => (
            StatusCode::REQUEST_TIMEOUT,
            format!("Timed out waiting for image {key}"),
        ),
        AppError::Resize(ResizeError::RegistryInconsistency { key, .. }) => {
            (StatusCode::NOT_FOUND, format!("Image {key} not found"))
        }
        AppError::Resize(resize_error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Resize error: {resize_error}"),
        ),
        AppError::Configuration { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Configuration error: {message}"),
        ),
        AppError::Internal { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal error: {message}"),
        ),
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    } else {
        tracing::debug!("Request rejected: {}", error);
    }

    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

/// Success response helpers
pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

/// Error response helpers
pub fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, message.to_string()).into_response()
}

pub fn not_found(resource: &str, id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error(format!(
            "{resource} with id '{id}' not found"
        ))),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (AppError::validation("bad wait"), StatusCode::BAD_REQUEST),
            (
                AppError::from(ResizeError::CallerCancelled { key: "k".into() }),
                StatusCode::REQUEST_TIMEOUT,
            ),
            (
                AppError::from(ResizeError::RegistryInconsistency {
                    key: "k".into(),
                    message: "empty".into(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(ResizeError::TaskFailed {
                    message: "panicked".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(handle_error(error).status(), expected);
        }
    }
}
