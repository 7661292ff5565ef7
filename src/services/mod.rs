//! Service layer for the image resizer
//!
//! - `ResizeService`: orchestrates synchronous and background resizes and
//!   serves finished images
//! - `ResizePipeline`: fetch, transform, and cache for a single image
//! - `ImageCache`: capacity-bounded cache with absolute expiry
//! - `ImageFetcher` / `ImageTransformer`: pluggable collaborators with
//!   `reqwest` and `image` backed defaults

pub mod fetcher;
pub mod image_cache;
pub mod resize_pipeline;
pub mod resizer;
pub mod transformer;

pub use fetcher::{HttpImageFetcher, ImageFetcher};
pub use image_cache::{CacheStore, ExpiryPolicy, ImageCache, LruStore};
pub use resize_pipeline::ResizePipeline;
pub use resizer::{BackgroundTasks, ResizeService, ServiceStats};
pub use transformer::{ImageTransformer, JpegTransformer, check_dimensions, target_dimensions};
