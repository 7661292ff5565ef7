use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Use the library instead of redeclaring modules
use image_resizer::{config::Config, services::ResizeService, web::WebServer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "image-resizer")]
#[command(version)]
#[command(about = "Fetches remote images, resizes them, and serves the results from a TTL cache")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", env = "CONFIG_FILE")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Public base URL used in returned image links
    #[arg(short = 'b', long, value_name = "URL")]
    base_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("image_resizer={},tower_http=trace", cli.log_level)
    } else {
        format!("image_resizer={},tower_http={}", cli.log_level, cli.log_level)
    };
    let (text_layer, json_layer) = match cli.log_format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(text_layer)
        .with(json_layer)
        .init();

    info!("Starting image resizer v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(base_url) = cli.base_url {
        config.web.base_url = base_url;
    }
    config.validate()?;

    info!(
        "Cache: capacity {}, ttl {:?}, sweep every {:?}; jobs: max {} concurrent",
        config.cache.capacity,
        config.cache.ttl,
        config.cache.sweep_interval,
        config.jobs.max_concurrent_jobs
    );

    let config = Arc::new(config);
    let shutdown = CancellationToken::new();

    let resize_service = Arc::new(ResizeService::from_config(&config, shutdown.clone())?);
    let background_tasks = resize_service.start()?;

    let web_server = WebServer::new(config.clone(), resize_service);
    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
    let server_token = shutdown.clone();
    let server = tokio::spawn(web_server.serve_with_cancellation(ready_tx, server_token));

    match ready_rx.await {
        Ok(Ok(())) => info!("Image resizer ready"),
        Ok(Err(e)) => {
            shutdown.cancel();
            background_tasks.join().await;
            return Err(e);
        }
        Err(_) => warn!("Web server exited before reporting readiness"),
    }

    tokio::select! {
        _ = wait_for_shutdown_signal() => {}
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Web server error: {}", e),
        Err(e) => error!("Web server task failed: {}", e),
    }
    background_tasks.join().await;

    info!("Image resizer stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
                    _ = tokio::signal::ctrl_c() => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
                }
                return;
            }
            Err(e) => warn!("Failed to install SIGTERM handler: {}", e),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down gracefully"),
        Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
    }
}
