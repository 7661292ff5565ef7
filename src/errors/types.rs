//! Error type definitions for the image resizer
//!
//! This module defines the error hierarchy used throughout the service.
//! `ResizeError` covers everything that can go wrong for a single image,
//! while `AppError` is what the web layer maps to HTTP responses.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Resize pipeline errors
    #[error("Resize error: {0}")]
    Resize(#[from] ResizeError),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors produced while fetching, transforming, or waiting on an image
#[derive(Error, Debug)]
pub enum ResizeError {
    /// Network failure talking to the source host
    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Source host answered with something other than 200
    #[error("Non-200 status fetching {url}: {status}")]
    HttpStatus { url: String, status: u16 },

    /// Source image exceeded the configured download limit
    #[error("Source image from {url} exceeds {max_bytes} bytes")]
    BodyTooLarge { url: String, max_bytes: usize },

    /// Bytes could not be decoded as a supported image
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// Requested output exceeds the configured dimension limit
    #[error("Output size {width}x{height} exceeds the {max_dimension}px limit")]
    DimensionsTooLarge {
        width: u32,
        height: u32,
        max_dimension: u32,
    },

    /// Resized image could not be encoded
    #[error("Failed to encode resized image: {message}")]
    Encode { message: String },

    /// The waiting caller's own deadline or cancellation fired first
    #[error("Caller cancelled while waiting for image {key}")]
    CallerCancelled { key: String },

    /// Cache or registry held something it should never hold
    #[error("Inconsistent state for {key}: {message}")]
    RegistryInconsistency { key: String, message: String },

    /// A blocking task died before producing a result
    #[error("Resize task failed: {message}")]
    TaskFailed { message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl ResizeError {
    pub fn fetch<U: Into<String>, M: ToString>(url: U, message: M) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn decode<M: ToString>(message: M) -> Self {
        Self::Decode {
            message: message.to_string(),
        }
    }

    pub fn encode<M: ToString>(message: M) -> Self {
        Self::Encode {
            message: message.to_string(),
        }
    }
}
