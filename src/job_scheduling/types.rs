//! Shared job types

use uuid::Uuid;

/// How a worker's job ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Resized image is in the cache
    Cached,
    /// Fetch or transform failed; nothing was cached
    Failed,
    /// Service shut down before the job got to run
    Skipped,
}

/// Notification sent by a worker once its signal has fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCompletion {
    pub key: String,
    pub job_id: Uuid,
    pub outcome: JobOutcome,
}
