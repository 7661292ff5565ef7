//! Resize batch submission

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;

use crate::models::{ResizeRequest, parse_async_flag};
use crate::web::{AppState, responses::bad_request};

#[derive(Debug, Default, Deserialize)]
pub struct ResizeQuery {
    #[serde(rename = "async")]
    pub is_async: Option<String>,
}

/// `POST /v1/resize`
///
/// Answers `201 Created` with one result per URL, in request order. Per-URL
/// failures are reported inside the array.
pub async fn resize_images(
    State(state): State<AppState>,
    Query(query): Query<ResizeQuery>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            debug!("Rejected resize body: {}", e);
            return bad_request("Failed to parse request");
        }
    };

    let mut request: ResizeRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("Failed to parse resize request: {}", e);
            return bad_request("Failed to parse request");
        }
    };

    if let Some(flag) = query.is_async.as_deref() {
        request.is_async = parse_async_flag(flag).unwrap_or_else(|| {
            debug!("Invalid async flag '{}', resizing synchronously", flag);
            false
        });
    }

    let results = state.resize_service.process_resizes(&request).await;
    (StatusCode::CREATED, Json(results)).into_response()
}
