//! Background resize job orchestration
//!
//! This module provides the machinery behind fire-and-forget resizes:
//! - `ResultSignal`: one-shot completion broadcast observed by any number of waiters
//! - `JobRegistry`: per-key deduplication of in-flight jobs
//! - `ResizeWorker`: executes exactly one job, bounded by a shared permit pool
//! - `CompletionBridge`: funnels finished jobs to the single `CleanupConsumer`,
//!   which is the only party that removes registry entries

pub mod completion_bridge;
pub mod job_registry;
pub mod result_signal;
pub mod types;
pub mod worker;

pub use completion_bridge::{CleanupConsumer, CompletionBridge, CompletionStream, completion_bridge};
pub use job_registry::{JobRegistry, Registration};
pub use result_signal::{ResultSignal, SignalCompleter, result_signal};
pub use types::*;
pub use worker::ResizeWorker;
