//! Background execution of a single resize job

use super::completion_bridge::CompletionBridge;
use super::result_signal::SignalCompleter;
use super::types::{JobCompletion, JobOutcome};
use crate::models::ResizeData;
use crate::services::ResizePipeline;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use uuid::Uuid;

/// Owns the completing half of one job's signal
pub struct ResizeWorker {
    pub job_id: Uuid,
    pub data: ResizeData,
    pub completer: SignalCompleter,
    pub pipeline: Arc<ResizePipeline>,
    pub bridge: CompletionBridge,
    pub permits: Arc<Semaphore>,
    pub shutdown: CancellationToken,
}

impl ResizeWorker {
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let Self {
            job_id,
            data,
            completer,
            pipeline,
            bridge,
            permits,
            shutdown,
        } = self;

        let outcome = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                debug!("Skipping job {} for {}: shutting down", job_id, data.url);
                JobOutcome::Skipped
            }
            permit = permits.acquire_owned() => match permit {
                Ok(_permit) => {
                    // An earlier job or a synchronous resize may have produced it meanwhile
                    if pipeline.cache().contains(&data.key).await {
                        debug!("Job {} found {} already cached", job_id, data.key);
                        JobOutcome::Cached
                    } else {
                        match pipeline.resize_and_cache(&data).await {
                            Ok(()) => {
                                debug!("Job {} cached {}", job_id, data.key);
                                JobOutcome::Cached
                            }
                            Err(e) => {
                                error!("Job {} failed to resize {}: {}", job_id, data.url, e);
                                JobOutcome::Failed
                            }
                        }
                    }
                }
                Err(_) => {
                    debug!("Job permit pool closed, skipping {}", data.url);
                    JobOutcome::Skipped
                }
            },
        };

        completer.complete();
        bridge
            .notify(JobCompletion {
                key: data.key,
                job_id,
                outcome,
            })
            .await;
    }
}
