//! Web handlers module
//!
//! HTTP request handlers organized by endpoint. Each handler parses its
//! input and delegates to `ResizeService`.

pub mod health;
pub mod images;
pub mod resize;

pub use crate::web::responses::*;
