//! Fan-in of finished jobs to the single cleanup consumer

use super::job_registry::JobRegistry;
use super::types::JobCompletion;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Create the shared producer handle and the consumer end of the bridge
pub fn completion_bridge(capacity: usize) -> (CompletionBridge, CompletionStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (CompletionBridge { tx }, CompletionStream { rx })
}

/// Producer handle cloned into every worker
#[derive(Debug, Clone)]
pub struct CompletionBridge {
    tx: mpsc::Sender<JobCompletion>,
}

impl CompletionBridge {
    /// Queue a completion, waiting for room when the consumer is behind
    pub async fn notify(&self, completion: JobCompletion) {
        if let Err(e) = self.tx.send(completion).await {
            // Consumer is gone during shutdown; the entry dies with the registry
            warn!(
                "Cleanup consumer stopped, dropping completion for key {}",
                e.0.key
            );
        }
    }
}

/// Receiving end, owned by the cleanup consumer
#[derive(Debug)]
pub struct CompletionStream {
    rx: mpsc::Receiver<JobCompletion>,
}

impl CompletionStream {
    pub async fn recv(&mut self) -> Option<JobCompletion> {
        self.rx.recv().await
    }
}

/// Sole owner of registry deregistration
pub struct CleanupConsumer {
    registry: Arc<JobRegistry>,
    stream: CompletionStream,
}

impl CleanupConsumer {
    pub fn new(registry: Arc<JobRegistry>, stream: CompletionStream) -> Self {
        Self { registry, stream }
    }

    /// Deregister finished jobs until cancelled or every producer is dropped
    pub async fn run(mut self, cancellation_token: CancellationToken) {
        info!("Starting job cleanup consumer");

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("Job cleanup consumer received cancellation signal");
                    break;
                }
                completion = self.stream.recv() => {
                    let Some(completion) = completion else {
                        debug!("All completion producers dropped");
                        break;
                    };
                    debug!(
                        "Job {} for key {} finished: {:?}",
                        completion.job_id, completion.key, completion.outcome
                    );
                    self.registry
                        .deregister(&completion.key, completion.job_id)
                        .await;
                }
            }
        }

        info!("Job cleanup consumer stopped");
    }
}
