//! In-flight job registry with per-key deduplication

use super::result_signal::{ResultSignal, SignalCompleter, result_signal};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// A registered, not yet deregistered job
#[derive(Debug, Clone)]
struct InFlightJob {
    id: Uuid,
    signal: ResultSignal,
}

/// Result of [`JobRegistry::register`]
#[derive(Debug)]
pub enum Registration {
    /// No live job existed; the caller owns the new job and must run it
    Started {
        job_id: Uuid,
        completer: SignalCompleter,
    },
    /// A live job already exists for this key; do not start another.
    /// Waiters find its signal through [`JobRegistry::lookup`].
    InFlight,
}

impl Registration {
    pub fn already_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }
}

/// Thread-safe mapping from cache key to the job producing it
#[derive(Debug, Default, Clone)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<String, InFlightJob>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically join the live job for `key` or register a new one.
    ///
    /// An entry whose signal already fired is waiting for cleanup and no
    /// longer counts as live, so it is replaced.
    pub async fn register(&self, key: &str) -> Registration {
        let mut jobs = self.jobs.write().await;

        if let Some(existing) = jobs.get(key) {
            if !existing.signal.is_fired() {
                debug!("Joining in-flight job {} for key {}", existing.id, key);
                return Registration::InFlight;
            }
            debug!(
                "Replacing finished job {} awaiting cleanup for key {}",
                existing.id, key
            );
        }

        let (completer, signal) = result_signal();
        let job_id = Uuid::new_v4();
        jobs.insert(
            key.to_string(),
            InFlightJob {
                id: job_id,
                signal,
            },
        );
        debug!("Registered job {} for key {}", job_id, key);

        Registration::Started { job_id, completer }
    }

    /// Signal of the job registered for `key`, if any
    pub async fn lookup(&self, key: &str) -> Option<ResultSignal> {
        self.jobs
            .read()
            .await
            .get(key)
            .map(|job| job.signal.clone())
    }

    /// Remove the entry for `key` if it still belongs to `job_id`.
    ///
    /// Returns false when the entry is gone or was replaced by a newer job.
    pub async fn deregister(&self, key: &str, job_id: Uuid) -> bool {
        let mut jobs = self.jobs.write().await;
        match jobs.get(key) {
            Some(job) if job.id == job_id => {
                jobs.remove(key);
                debug!("Deregistered job {} for key {}", job_id, key);
                true
            }
            Some(job) => {
                debug!(
                    "Skipping deregistration of {} for key {}: replaced by {}",
                    job_id, key, job.id
                );
                false
            }
            None => {
                warn!(
                    "Attempted to deregister unknown job {} for key {}",
                    job_id, key
                );
                false
            }
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.jobs.read().await.contains_key(key)
    }

    /// Number of registered entries, including finished ones awaiting cleanup
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}
