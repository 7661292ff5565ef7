//! Resized image cache
//!
//! A capacity-bounded recency store plus absolute-age expiry. The store and
//! the insertion timestamps share one lock, so a capacity eviction and its
//! timestamp removal can never be observed apart.

pub mod expiry;
pub mod service;
pub mod store;

pub use expiry::ExpiryPolicy;
pub use service::ImageCache;
pub use store::{CacheStore, LruStore};
