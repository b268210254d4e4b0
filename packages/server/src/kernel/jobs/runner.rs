//! Job runner - the deferred-execution worker.
//!
//! A background tokio task, decoupled from the request/response cycle,
//! that polls the queue for due jobs, executes them via the registry and
//! records the outcome. Per job the observable order is always
//! `pending → succeeded|failed`; retries are handled by the queue's
//! `mark_failed`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::job::ErrorKind;
use super::queue::JobQueue;
use super::registry::SharedJobRegistry;
use crate::kernel::ServerDeps;

/// Configuration for the job runner.
#[derive(Debug, Clone)]
pub struct JobRunnerConfig {
    /// Maximum number of jobs to claim at once
    pub batch_size: i64,
    /// How long to wait when no jobs are due
    pub poll_interval: Duration,
    /// Worker ID for this instance
    pub worker_id: String,
}

impl Default for JobRunnerConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            poll_interval: Duration::from_secs(1),
            worker_id: format!("runner-{}", Uuid::new_v4()),
        }
    }
}

/// Background service that processes jobs from the queue.
pub struct JobRunner {
    job_queue: Arc<dyn JobQueue>,
    registry: SharedJobRegistry,
    deps: Arc<ServerDeps>,
    config: JobRunnerConfig,
    shutdown: Arc<AtomicBool>,
}

impl JobRunner {
    pub fn new(
        job_queue: Arc<dyn JobQueue>,
        registry: SharedJobRegistry,
        deps: Arc<ServerDeps>,
    ) -> Self {
        Self::with_config(job_queue, registry, deps, JobRunnerConfig::default())
    }

    pub fn with_config(
        job_queue: Arc<dyn JobQueue>,
        registry: SharedJobRegistry,
        deps: Arc<ServerDeps>,
        config: JobRunnerConfig,
    ) -> Self {
        Self {
            job_queue,
            registry,
            deps,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for signalling graceful shutdown.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Main loop: claim due jobs, execute, record outcome.
    pub async fn run(self) -> Result<()> {
        info!(
            worker_id = %self.config.worker_id,
            batch_size = self.config.batch_size,
            "job runner starting"
        );

        loop {
            if self.is_shutdown_requested() {
                break;
            }

            let jobs = match self
                .job_queue
                .claim(&self.config.worker_id, self.config.batch_size)
                .await
            {
                Ok(jobs) => jobs,
                Err(e) => {
                    error!(error = %e, "failed to claim jobs");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };

            if jobs.is_empty() {
                tokio::time::sleep(self.config.poll_interval).await;
                continue;
            }

            debug!(count = jobs.len(), "claimed jobs");

            for job in jobs {
                if self.is_shutdown_requested() {
                    break;
                }

                let job_id = job.id;
                let job_type = job.command_type().to_string();

                match self.registry.execute(&job, self.deps.clone()).await {
                    Ok(()) => {
                        info!(job_id = %job_id, job_type = %job_type, "job succeeded");
                        if let Err(e) = self.job_queue.mark_succeeded(job_id).await {
                            error!(job_id = %job_id, error = %e, "failed to mark job as succeeded");
                        }
                    }
                    Err(e) => {
                        warn!(job_id = %job_id, job_type = %job_type, error = %e, "job failed");

                        let kind = classify_error(&e);
                        if let Err(mark_err) = self
                            .job_queue
                            .mark_failed(job_id, &e.to_string(), kind)
                            .await
                        {
                            error!(job_id = %job_id, error = %mark_err, "failed to mark job as failed");
                        }
                    }
                }
            }
        }

        info!(worker_id = %self.config.worker_id, "job runner stopped");
        Ok(())
    }
}

/// Classify an error to decide retry behavior.
///
/// Permanent conditions (missing entities, bad payloads) fail immediately;
/// anything else is assumed transient.
pub fn classify_error(error: &anyhow::Error) -> ErrorKind {
    let message = error.to_string().to_lowercase();

    if message.contains("not found")
        || message.contains("invalid")
        || message.contains("deserialize")
        || message.contains("parse")
    {
        return ErrorKind::NonRetryable;
    }

    ErrorKind::Retryable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = JobRunnerConfig::default();
        assert_eq!(config.batch_size, 10);
        assert!(config.worker_id.starts_with("runner-"));
    }

    #[test]
    fn transient_errors_are_retryable() {
        let error = anyhow::anyhow!("connection timeout");
        assert_eq!(classify_error(&error), ErrorKind::Retryable);
    }

    #[test]
    fn missing_author_is_not_retryable() {
        let error = anyhow::anyhow!("author profile 0192 not found");
        assert_eq!(classify_error(&error), ErrorKind::NonRetryable);
    }

    #[test]
    fn bad_payload_is_not_retryable() {
        let error = anyhow::anyhow!("failed to deserialize publish_scheduled_post");
        assert_eq!(classify_error(&error), ErrorKind::NonRetryable);
    }
}
