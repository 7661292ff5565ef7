/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 8 * 1024; // 8KB of JSON is plenty for a URL batch
pub const DEFAULT_IMAGE_WAIT_TIMEOUT: &str = "30s";

// Cache defaults
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;
pub const DEFAULT_CACHE_TTL: &str = "5s";
pub const DEFAULT_SWEEP_INTERVAL: &str = "2s";

// Job defaults
pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 64;
pub const DEFAULT_COMPLETION_QUEUE_CAPACITY: usize = 1024;

// Fetch defaults
pub const DEFAULT_FETCH_TIMEOUT: &str = "30s";
pub const DEFAULT_MAX_FETCH_BODY_SIZE: usize = 15 * 1024 * 1024; // 15MB
pub const DEFAULT_USER_AGENT: &str = concat!("image-resizer/", env!("CARGO_PKG_VERSION"));

// Resize defaults
pub const DEFAULT_JPEG_QUALITY: u8 = 75;
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;
