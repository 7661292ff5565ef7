//! Serving resized images

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::time::Duration;

use crate::errors::AppError;
use crate::utils::cache_key_from_image_id;
use crate::web::{
    AppState,
    responses::{handle_error, not_found},
};

#[derive(Debug, Default, Deserialize)]
pub struct ImageQuery {
    /// Shorter wait than the configured maximum, e.g. `2s`
    pub wait: Option<String>,
}

/// `GET /v1/image/{image_id}`
///
/// Waits for an in-flight resize of this image, bounded by the wait deadline.
pub async fn get_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Response {
    let max_wait = state.config.web.image_wait_timeout;
    let wait = match resolve_wait(query.wait.as_deref(), max_wait) {
        Ok(wait) => wait,
        Err(e) => return handle_error(e),
    };

    let key = cache_key_from_image_id(&image_id);
    match state.resize_service.get_image_with_timeout(&key, wait).await {
        Ok(Some(bytes)) => ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response(),
        Ok(None) => not_found("Image", &image_id),
        Err(e) => handle_error(AppError::from(e)),
    }
}

/// Requested wait, capped at the configured maximum
fn resolve_wait(requested: Option<&str>, max_wait: Duration) -> Result<Duration, AppError> {
    match requested {
        None => Ok(max_wait),
        Some(value) => humantime::parse_duration(value)
            .map(|wait| wait.min(max_wait))
            .map_err(|e| AppError::validation(format!("Invalid wait '{value}': {e}"))),
    }
}
