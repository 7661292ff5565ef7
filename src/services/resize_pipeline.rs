//! Fetch, transform, and cache one image

use super::fetcher::ImageFetcher;
use super::image_cache::ImageCache;
use super::transformer::ImageTransformer;
use crate::errors::{PipelineResult, ResizeError};
use crate::models::ResizeData;
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

/// Shared by the synchronous path and every background worker
pub struct ResizePipeline {
    fetcher: Arc<dyn ImageFetcher>,
    transformer: Arc<dyn ImageTransformer>,
    cache: Arc<ImageCache>,
}

impl ResizePipeline {
    pub fn new(
        fetcher: Arc<dyn ImageFetcher>,
        transformer: Arc<dyn ImageTransformer>,
        cache: Arc<ImageCache>,
    ) -> Self {
        Self {
            fetcher,
            transformer,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    /// Produce the resized bytes without caching them
    pub async fn fetch_and_resize(&self, data: &ResizeData) -> PipelineResult<Bytes> {
        let source = self.fetcher.fetch(&data.url).await?;

        let transformer = self.transformer.clone();
        let (width, height) = (data.width, data.height);
        let resized = tokio::task::spawn_blocking(move || {
            transformer.transform(&source, width, height)
        })
        .await
        .map_err(|e| ResizeError::TaskFailed {
            message: e.to_string(),
        })??;

        debug!(
            "Resized {} to {} bytes ({}x{} requested)",
            data.url,
            resized.len(),
            data.width,
            data.height
        );
        Ok(Bytes::from(resized))
    }

    /// Resize and store under `data.key`; nothing is cached on failure
    pub async fn resize_and_cache(&self, data: &ResizeData) -> PipelineResult<()> {
        let resized = self.fetch_and_resize(data).await?;
        self.cache.add(data.key.clone(), resized).await;
        Ok(())
    }
}
