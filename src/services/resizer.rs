//! Resize orchestration
//!
//! `ResizeService` ties the cache, the job registry, and the background
//! workers together:
//!
//! - synchronous batches resize inline and never touch the registry
//! - asynchronous batches register (or join) one job per key and return
//!   immediately with `in-progress`
//! - `get_image` waits on an in-flight job, bounded by the caller's own
//!   cancellation, then reads the cache
//!
//! Per-key lifecycle: unknown -> in progress -> cached or absent.

use super::fetcher::{HttpImageFetcher, ImageFetcher};
use super::image_cache::ImageCache;
use super::resize_pipeline::ResizePipeline;
use super::transformer::{ImageTransformer, JpegTransformer};
use crate::config::Config;
use crate::errors::{AppError, AppResult, PipelineResult, ResizeError};
use crate::job_scheduling::{
    CleanupConsumer, CompletionBridge, CompletionStream, JobRegistry, Registration, ResizeWorker,
    completion_bridge,
};
use crate::models::{ResizeData, ResizeRequest, ResizeResult};
use crate::utils::{generate_cache_key, servable_url};
use bytes::Bytes;
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Snapshot for the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    pub cached_entries: usize,
    pub in_flight_jobs: usize,
    pub available_job_permits: usize,
}

/// Handles of the long-lived tasks spawned by [`ResizeService::start`]
pub struct BackgroundTasks {
    pub cleanup: JoinHandle<()>,
    pub expiry_sweep: JoinHandle<()>,
}

impl BackgroundTasks {
    /// Wait for both tasks to finish after the shutdown token is cancelled
    pub async fn join(self) {
        if let Err(e) = self.cleanup.await {
            warn!("Job cleanup task ended abnormally: {}", e);
        }
        if let Err(e) = self.expiry_sweep.await {
            warn!("Cache expiry sweep ended abnormally: {}", e);
        }
    }
}

pub struct ResizeService {
    base_url: String,
    cache: Arc<ImageCache>,
    registry: Arc<JobRegistry>,
    pipeline: Arc<ResizePipeline>,
    bridge: CompletionBridge,
    completion_stream: Mutex<Option<CompletionStream>>,
    permits: Arc<Semaphore>,
    shutdown: CancellationToken,
}

impl ResizeService {
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn ImageFetcher>,
        transformer: Arc<dyn ImageTransformer>,
        shutdown: CancellationToken,
    ) -> Self {
        let cache = Arc::new(ImageCache::from_config(&config.cache));
        let pipeline = Arc::new(ResizePipeline::new(fetcher, transformer, cache.clone()));
        let (bridge, completion_stream) = completion_bridge(config.jobs.completion_queue_capacity);

        Self {
            base_url: config.web.base_url.clone(),
            cache,
            registry: Arc::new(JobRegistry::new()),
            pipeline,
            bridge,
            completion_stream: Mutex::new(Some(completion_stream)),
            permits: Arc::new(Semaphore::new(config.jobs.max_concurrent_jobs)),
            shutdown,
        }
    }

    /// Build the service with the HTTP fetcher and JPEG transformer
    pub fn from_config(config: &Config, shutdown: CancellationToken) -> AppResult<Self> {
        let fetcher = Arc::new(HttpImageFetcher::new(&config.fetch)?);
        let transformer = Arc::new(JpegTransformer::new(
            config.resize.jpeg_quality,
            config.resize.max_dimension,
        ));
        Ok(Self::new(config, fetcher, transformer, shutdown))
    }

    /// Spawn the cleanup consumer and the expiry sweep. Only valid once.
    pub fn start(&self) -> AppResult<BackgroundTasks> {
        let stream = self
            .completion_stream
            .lock()
            .map_err(|_| AppError::internal("Completion stream lock poisoned"))?
            .take()
            .ok_or_else(|| AppError::internal("Resize service already started"))?;

        let consumer = CleanupConsumer::new(self.registry.clone(), stream);
        let cleanup = tokio::spawn(consumer.run(self.shutdown.clone()));
        let expiry_sweep = tokio::spawn(self.cache.clone().run_expiry_sweep(self.shutdown.clone()));

        info!("Resize service started");
        Ok(BackgroundTasks {
            cleanup,
            expiry_sweep,
        })
    }

    /// Resize every URL in the request. Results keep the input order.
    pub async fn process_resizes(&self, request: &ResizeRequest) -> Vec<ResizeResult> {
        debug!(
            "Processing {} urls ({}x{}, async: {})",
            request.urls.len(),
            request.width,
            request.height,
            request.is_async
        );

        let mut results = Vec::with_capacity(request.urls.len());
        for url in &request.urls {
            let data = ResizeData {
                key: generate_cache_key(url),
                url: url.clone(),
                width: request.width,
                height: request.height,
            };
            let result = if request.is_async {
                self.resize_in_background(data).await
            } else {
                self.resize_inline(data).await
            };
            results.push(result);
        }
        results
    }

    async fn resize_inline(&self, data: ResizeData) -> ResizeResult {
        let image_url = servable_url(&self.base_url, &data.key);
        if self.cache.contains(&data.key).await {
            return ResizeResult::success(image_url, true);
        }

        match self.pipeline.resize_and_cache(&data).await {
            Ok(()) => ResizeResult::success(image_url, false),
            Err(e) => {
                warn!("Failed to resize {}: {}", data.url, e);
                ResizeResult::failure()
            }
        }
    }

    async fn resize_in_background(&self, data: ResizeData) -> ResizeResult {
        let image_url = servable_url(&self.base_url, &data.key);
        if self.cache.contains(&data.key).await {
            return ResizeResult::success(image_url, true);
        }

        match self.registry.register(&data.key).await {
            Registration::InFlight => {
                debug!("Resize of {} already in progress", data.url);
            }
            Registration::Started { job_id, completer } => {
                // Nothing may await between register and spawn; the completer must reach the worker
                debug!("Dispatching job {} for {}", job_id, data.url);
                ResizeWorker {
                    job_id,
                    data,
                    completer,
                    pipeline: self.pipeline.clone(),
                    bridge: self.bridge.clone(),
                    permits: self.permits.clone(),
                    shutdown: self.shutdown.clone(),
                }
                .spawn();
            }
        }

        ResizeResult::in_progress(image_url)
    }

    /// Return the cached image for `key`, waiting for an in-flight job first.
    ///
    /// `cancelled` resolving before the job finishes yields
    /// [`ResizeError::CallerCancelled`]. `Ok(None)` means no image exists.
    pub async fn get_image<F>(&self, key: &str, cancelled: F) -> PipelineResult<Option<Bytes>>
    where
        F: Future<Output = ()>,
    {
        let pending = self
            .registry
            .lookup(key)
            .await
            .filter(|signal| !signal.is_fired());

        if let Some(signal) = pending {
            debug!("Waiting on in-flight job for {}", key);
            tokio::select! {
                biased;
                _ = signal.wait() => {}
                _ = cancelled => {
                    return Err(ResizeError::CallerCancelled {
                        key: key.to_string(),
                    });
                }
            }
        }

        match self.cache.get(key).await {
            None => Ok(None),
            Some(bytes) if bytes.is_empty() => {
                let inconsistency = ResizeError::RegistryInconsistency {
                    key: key.to_string(),
                    message: "cached payload is empty".to_string(),
                };
                warn!("{}", inconsistency);
                Ok(None)
            }
            Some(bytes) => Ok(Some(bytes)),
        }
    }

    /// [`get_image`](Self::get_image) with a deadline as the cancellation
    pub async fn get_image_with_timeout(
        &self,
        key: &str,
        timeout: Duration,
    ) -> PipelineResult<Option<Bytes>> {
        self.get_image(key, tokio::time::sleep(timeout)).await
    }

    pub async fn stats(&self) -> ServiceStats {
        ServiceStats {
            cached_entries: self.cache.len().await,
            in_flight_jobs: self.registry.len().await,
            available_job_permits: self.permits.available_permits(),
        }
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }
}
