//! Centralized error handling for the image resizer
//!
//! # Error Categories
//!
//! - **Resize Errors**: fetching, decoding, encoding, and waiting on resize jobs
//! - **Configuration Errors**: invalid startup settings
//! - **Validation Errors**: malformed client input
//!
//! Per-URL failures during a resize batch are reported inside the batch
//! results, never as an error for the whole request.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for resize pipeline Results
pub type PipelineResult<T> = Result<T, ResizeError>;
