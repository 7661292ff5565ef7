//! Utility functions for the image resizer
//!
//! - `utils::cache_key` for deriving cache keys and servable URLs from source URLs

pub mod cache_key;

pub use cache_key::{cache_key_from_image_id, generate_cache_key, servable_url};
