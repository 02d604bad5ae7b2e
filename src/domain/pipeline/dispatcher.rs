use super::error::PipelineStage;
use super::service::{PipelineOutcome, PipelineServiceApi};
use super::submission::{Submission, ValidationError};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use uuid::Uuid;

/// Handle to a run started in the background. Dropping it detaches the run.
pub struct PipelineTask {
    pub run_id: Uuid,
    pub submission: Submission,
    handle: JoinHandle<PipelineOutcome>,
}

impl PipelineTask {
    /// Wait for the run to reach a terminal state. Errors only when the
    /// task panicked or was aborted.
    pub async fn outcome(self) -> Result<PipelineOutcome, JoinError> {
        self.handle.await.map_err(|e| {
            tracing::error!(run_id = %self.run_id, error = %e, "Pipeline task did not finish");
            e
        })
    }
}

/// Starts pipeline runs without making callers wait on them.
///
/// Input is validated on the caller's side so rejections are reported
/// synchronously. Accepted runs execute on their own task; at most
/// `max_in_flight` of them do work at once, the rest wait for a permit.
pub struct PipelineDispatcher {
    service: Arc<dyn PipelineServiceApi>,
    permits: Arc<Semaphore>,
}

impl PipelineDispatcher {
    pub fn new(service: Arc<dyn PipelineServiceApi>, max_in_flight: usize) -> Self {
        Self {
            service,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    pub fn submit(&self, url: &str, phone: &str) -> Result<PipelineTask, ValidationError> {
        let submission = Submission::parse(url, phone).map_err(|err| {
            tracing::info!(stage = %PipelineStage::Validating, error = %err, "Submission rejected");
            err
        })?;
        let run_id = Uuid::new_v4();

        let service = self.service.clone();
        let permits = self.permits.clone();
        let task_submission = submission.clone();

        let handle = tokio::spawn(async move {
            // Hold the permit until the run ends; the semaphore is never closed
            let _permit = permits.acquire_owned().await;
            service.run(run_id, task_submission).await
        });

        tracing::info!(
            run_id = %run_id,
            url = %submission.canonical_url,
            phone = %submission.phone,
            "Pipeline run dispatched"
        );

        Ok(PipelineTask {
            run_id,
            submission,
            handle,
        })
    }

    /// Runs currently allowed to start before new ones have to wait
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}
