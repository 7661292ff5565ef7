use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use defaults::*;
use duration_serde::{duration, parse_default};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub resize: ResizeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Prefix for the servable image URLs handed back to clients
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Maximum accepted resize request body, in bytes
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
    /// Longest a get-image caller waits on an in-flight job
    #[serde(default = "default_image_wait_timeout", with = "duration")]
    pub image_wait_timeout: Duration,
}

/// Resized image cache: capacity-bounded with absolute expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached images before least-recently-used eviction
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    /// Age after which an entry expires regardless of access
    #[serde(default = "default_cache_ttl", with = "duration")]
    pub ttl: Duration,
    /// How often the expiry sweep runs
    #[serde(default = "default_sweep_interval", with = "duration")]
    pub sweep_interval: Duration,
}

/// Background resize job dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Upper bound on resize jobs executing at once
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
    /// Buffered completion notifications before workers apply backpressure
    #[serde(default = "default_completion_queue_capacity")]
    pub completion_queue_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout", with = "duration")]
    pub timeout: Duration,
    /// Source images larger than this are rejected
    #[serde(default = "default_max_fetch_body_size")]
    pub max_body_size: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeConfig {
    /// JPEG encoder quality, 1-100
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Largest accepted output width or height, in pixels
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

// Web defaults
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_request_size() -> usize {
    DEFAULT_MAX_REQUEST_SIZE
}

fn default_image_wait_timeout() -> Duration {
    parse_default(DEFAULT_IMAGE_WAIT_TIMEOUT)
}

// Cache defaults
fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_cache_ttl() -> Duration {
    parse_default(DEFAULT_CACHE_TTL)
}

fn default_sweep_interval() -> Duration {
    parse_default(DEFAULT_SWEEP_INTERVAL)
}

// Job defaults
fn default_max_concurrent_jobs() -> usize {
    DEFAULT_MAX_CONCURRENT_JOBS
}

fn default_completion_queue_capacity() -> usize {
    DEFAULT_COMPLETION_QUEUE_CAPACITY
}

// Fetch defaults
fn default_fetch_timeout() -> Duration {
    parse_default(DEFAULT_FETCH_TIMEOUT)
}

fn default_max_fetch_body_size() -> usize {
    DEFAULT_MAX_FETCH_BODY_SIZE
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_max_dimension() -> u32 {
    DEFAULT_MAX_DIMENSION
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: default_base_url(),
            max_request_size: default_max_request_size(),
            image_wait_timeout: default_image_wait_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl: default_cache_ttl(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            completion_queue_capacity: default_completion_queue_capacity(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            max_body_size: default_max_fetch_body_size(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
            max_dimension: default_max_dimension(),
        }
    }
}

impl Config {
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let config = if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str::<Self>(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            default_config
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would leave the service unable to make progress
    pub fn validate(&self) -> Result<()> {
        if self.cache.capacity == 0 {
            bail!("cache.capacity must be greater than zero");
        }
        if self.cache.ttl.is_zero() {
            bail!("cache.ttl must be greater than zero");
        }
        if self.cache.sweep_interval.is_zero() {
            bail!("cache.sweep_interval must be greater than zero");
        }
        if self.jobs.max_concurrent_jobs == 0 {
            bail!("jobs.max_concurrent_jobs must be greater than zero");
        }
        if self.jobs.completion_queue_capacity == 0 {
            bail!("jobs.completion_queue_capacity must be greater than zero");
        }
        if !(1..=100).contains(&self.resize.jpeg_quality) {
            bail!(
                "resize.jpeg_quality must be between 1 and 100, got {}",
                self.resize.jpeg_quality
            );
        }
        if self.resize.max_dimension == 0 {
            bail!("resize.max_dimension must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.cache.capacity, 1024);
        assert_eq!(config.cache.ttl, Duration::from_secs(5));
        assert_eq!(config.cache.sweep_interval, Duration::from_secs(2));
        assert_eq!(config.jobs.max_concurrent_jobs, 64);
        assert_eq!(config.web.max_request_size, 8 * 1024);
        assert_eq!(config.fetch.max_body_size, 15 * 1024 * 1024);
        assert_eq!(config.resize.max_dimension, 8192);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [cache]
            ttl = "10m"

            [web]
            port = 9090
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.ttl, Duration::from_secs(600));
        assert_eq!(config.cache.capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(config.web.port, 9090);
        assert_eq!(config.web.host, DEFAULT_HOST);
        assert_eq!(config.resize.jpeg_quality, DEFAULT_JPEG_QUALITY);
    }

    #[test]
    fn test_validation_rejects_degenerate_settings() {
        let mut config = Config::default();
        config.cache.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.jobs.max_concurrent_jobs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.resize.jpeg_quality = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cache.sweep_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.resize.max_dimension = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path_str = path.to_str().unwrap();

        let config = Config::load_from_file(path_str).unwrap();
        assert!(path.exists());
        assert_eq!(config.web.port, DEFAULT_PORT);

        // Reloading the written file must round-trip the durations
        let reloaded = Config::load_from_file(path_str).unwrap();
        assert_eq!(reloaded.cache.ttl, config.cache.ttl);
        assert_eq!(reloaded.web.image_wait_timeout, config.web.image_wait_timeout);
    }
}
