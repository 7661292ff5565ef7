//! Shared fakes for service and API tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use image_resizer::config::Config;
use image_resizer::errors::ResizeError;
use image_resizer::services::{ImageFetcher, ImageTransformer, ResizeService};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

pub const BASE_URL: &str = "http://resizer.test";

/// In-memory fetcher that counts calls and can hold every fetch until released
#[derive(Default)]
pub struct FakeFetcher {
    sources: HashMap<String, Bytes>,
    gate: Option<Arc<Notify>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, url: &str, body: &'static [u8]) -> Self {
        self.sources.insert(url.to_string(), Bytes::from_static(body));
        self
    }

    pub fn with_source_bytes(mut self, url: &str, body: Vec<u8>) -> Self {
        self.sources.insert(url.to_string(), Bytes::from(body));
        self
    }

    /// Every fetch waits for one `notify_one` on the returned handle
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, ResizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.sources
            .get(url)
            .cloned()
            .ok_or_else(|| ResizeError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Tags the source bytes with the requested size instead of decoding anything
pub struct FakeTransformer;

impl FakeTransformer {
    pub fn expected(source: &[u8], width: u32, height: u32) -> Vec<u8> {
        let mut out = format!("{width}x{height}:").into_bytes();
        out.extend_from_slice(source);
        out
    }
}

impl ImageTransformer for FakeTransformer {
    fn transform(&self, source: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ResizeError> {
        if source == b"corrupt" {
            return Err(ResizeError::decode("unrecognized image format"));
        }
        Ok(Self::expected(source, width, height))
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.web.base_url = BASE_URL.to_string();
    config.cache.ttl = Duration::from_secs(60);
    config.cache.sweep_interval = Duration::from_millis(20);
    config
}

pub fn service_with(
    config: &Config,
    fetcher: Arc<FakeFetcher>,
) -> (Arc<ResizeService>, CancellationToken) {
    service_with_transformer(config, fetcher, Arc::new(FakeTransformer))
}

pub fn service_with_transformer(
    config: &Config,
    fetcher: Arc<FakeFetcher>,
    transformer: Arc<dyn ImageTransformer>,
) -> (Arc<ResizeService>, CancellationToken) {
    let token = CancellationToken::new();
    let service = ResizeService::new(config, fetcher, transformer, token.clone());
    (Arc::new(service), token)
}

/// A small real PNG for tests that run the JPEG transformer
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 80, 40]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// Poll `condition` until it holds, failing the test after one second
pub async fn eventually<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(1), async {
        while !condition().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached within one second");
}
