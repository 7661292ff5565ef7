//! Source image download

use crate::config::FetchConfig;
use crate::errors::{AppError, AppResult, ResizeError};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use tracing::debug;

/// Fetches the raw bytes of a source image
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, ResizeError>;
}

/// `reqwest`-backed fetcher with a timeout and a download size limit
pub struct HttpImageFetcher {
    client: Client,
    max_body_size: usize,
}

impl HttpImageFetcher {
    pub fn new(config: &FetchConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_body_size: config.max_body_size,
        })
    }

    fn too_large(&self, url: &str) -> ResizeError {
        ResizeError::BodyTooLarge {
            url: url.to_string(),
            max_bytes: self.max_body_size,
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, ResizeError> {
        debug!("Fetching source image: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ResizeError::fetch(url, e))?;

        if response.status() != StatusCode::OK {
            return Err(ResizeError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        if response
            .content_length()
            .is_some_and(|length| length > self.max_body_size as u64)
        {
            return Err(self.too_large(url));
        }

        // Content-Length can be absent or wrong, so the limit is enforced while streaming
        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ResizeError::fetch(url, e))?;
            if body.len() + chunk.len() > self.max_body_size {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.freeze())
    }
}
