//! Web layer for the image resizer
//!
//! Routes:
//! - `POST /v1/resize` submits a batch of source URLs
//! - `GET /v1/image/{image_id}` serves a resized image
//! - `GET /health` reports service status

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::services::ResizeService;

pub mod handlers;
pub mod responses;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub resize_service: Arc<ResizeService>,
    pub config: Arc<Config>,
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let max_request_size = state.config.web.max_request_size;

    Router::new()
        .route(
            "/v1/resize",
            post(handlers::resize::resize_images).layer(DefaultBodyLimit::max(max_request_size)),
        )
        .route("/v1/image/{image_id}", get(handlers::images::get_image))
        .route("/health", get(handlers::health::health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct WebServer {
    app: Router,
    addr: String,
}

impl WebServer {
    pub fn new(config: Arc<Config>, resize_service: Arc<ResizeService>) -> Self {
        let addr = format!("{}:{}", config.web.host, config.web.port);
        let app = create_router(AppState {
            resize_service,
            config,
        });
        Self { app, addr }
    }

    /// Serve until the token is cancelled, reporting bind success or failure on `ready_signal`
    pub async fn serve_with_cancellation(
        self,
        ready_signal: tokio::sync::oneshot::Sender<Result<()>>,
        cancellation_token: CancellationToken,
    ) -> Result<()> {
        match tokio::net::TcpListener::bind(&self.addr).await {
            Ok(listener) => {
                info!("Web server listening on {}", self.addr);
                let _ = ready_signal.send(Ok(()));

                let shutdown_signal = async move {
                    cancellation_token.cancelled().await;
                    info!("Web server received cancellation signal, shutting down gracefully");
                };

                axum::serve(listener, self.app)
                    .with_graceful_shutdown(shutdown_signal)
                    .await?;
                Ok(())
            }
            Err(bind_error) => {
                let bind_err_msg = format!("Failed to bind to {}: {}", self.addr, bind_error);
                let _ = ready_signal.send(Err(anyhow::anyhow!("{}", bind_err_msg)));
                Err(anyhow::anyhow!("{}", bind_err_msg))
            }
        }
    }
}
