//! PostgreSQL-backed job queue.
//!
//! Commands are serialized to JSON and stored as `jobs` rows; the runner
//! claims due rows and dispatches them through the registry. Scheduling a
//! command with a future `run_at` is the deferred-execution hand-off: the
//! enqueueing request returns immediately and the command fires at or after
//! its target time.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::job::{ErrorKind, Job};

/// Result of an enqueue that handles idempotency.
#[derive(Debug, Clone)]
pub enum EnqueueResult {
    /// Command was enqueued, returns new job ID
    Created(Uuid),
    /// Command already exists (idempotency hit), returns existing job ID
    Duplicate(Uuid),
}

impl EnqueueResult {
    /// Get the job ID regardless of whether it was created or duplicate
    pub fn job_id(&self) -> Uuid {
        match self {
            EnqueueResult::Created(id) | EnqueueResult::Duplicate(id) => *id,
        }
    }

    /// Returns true if this was a newly created job
    pub fn is_created(&self) -> bool {
        matches!(self, EnqueueResult::Created(_))
    }
}

/// A claimed job ready for execution.
#[derive(Debug)]
pub struct ClaimedJob {
    pub id: Uuid,
    pub job: Job,
}

impl ClaimedJob {
    /// Deserialize the command payload.
    pub fn deserialize<C: DeserializeOwned>(&self) -> Result<C> {
        let args = self
            .job
            .args
            .as_ref()
            .ok_or_else(|| anyhow!("job {} has no args", self.id))?;
        serde_json::from_value(args.clone())
            .map_err(|e| anyhow!("failed to deserialize command: {}", e))
    }

    /// The command type (job_type)
    pub fn command_type(&self) -> &str {
        &self.job.job_type
    }
}

/// Metadata for command serialization.
pub trait CommandMeta {
    /// The command type name (used as job_type).
    fn command_type(&self) -> &'static str;

    /// Optional idempotency key.
    ///
    /// If provided, at most one pending/running job exists with this key.
    fn idempotency_key(&self) -> Option<String> {
        None
    }

    /// Maximum retries for this command.
    fn max_retries(&self) -> i32 {
        3
    }
}

/// Job queue operations.
///
/// The trait takes pre-serialized payloads so it stays object-safe; typed
/// enqueueing goes through the `enqueue`/`schedule` helpers on
/// `dyn JobQueue`.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a serialized command, optionally due at `run_at`.
    async fn enqueue_raw(
        &self,
        job_type: &str,
        args: serde_json::Value,
        run_at: Option<DateTime<Utc>>,
        idempotency_key: Option<String>,
        max_retries: i32,
    ) -> Result<EnqueueResult>;

    /// Claim up to `limit` due jobs for processing.
    async fn claim(&self, worker_id: &str, limit: i64) -> Result<Vec<ClaimedJob>>;

    /// Mark a job as successfully completed.
    async fn mark_succeeded(&self, job_id: Uuid) -> Result<()>;

    /// Mark a job as failed.
    ///
    /// Retryable failures re-enter `pending` with exponential backoff while
    /// retries remain; anything else is terminal.
    async fn mark_failed(&self, job_id: Uuid, error: &str, kind: ErrorKind) -> Result<()>;

    /// Earliest pending run time (for sleep optimization).
    async fn next_run_time(&self) -> Result<Option<DateTime<Utc>>>;
}

impl dyn JobQueue {
    /// Enqueue a typed command for immediate execution.
    pub async fn enqueue<C>(&self, command: C) -> Result<EnqueueResult>
    where
        C: Serialize + CommandMeta + Send + Sync,
    {
        let args = serde_json::to_value(&command)?;
        self.enqueue_raw(
            command.command_type(),
            args,
            None,
            command.idempotency_key(),
            command.max_retries(),
        )
        .await
    }

    /// Schedule a typed command for execution at or after `run_at`.
    pub async fn schedule<C>(&self, command: C, run_at: DateTime<Utc>) -> Result<EnqueueResult>
    where
        C: Serialize + CommandMeta + Send + Sync,
    {
        let args = serde_json::to_value(&command)?;
        self.enqueue_raw(
            command.command_type(),
            args,
            Some(run_at),
            command.idempotency_key(),
            command.max_retries(),
        )
        .await
    }
}

/// PostgreSQL-backed implementation.
pub struct PostgresJobQueue {
    pool: PgPool,
    default_lease_ms: i64,
}

impl PostgresJobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            default_lease_ms: 60_000, // 1 minute
        }
    }

    pub fn with_lease_duration(pool: PgPool, lease_ms: i64) -> Self {
        Self {
            pool,
            default_lease_ms: lease_ms,
        }
    }
}

#[async_trait]
impl JobQueue for PostgresJobQueue {
    async fn enqueue_raw(
        &self,
        job_type: &str,
        args: serde_json::Value,
        run_at: Option<DateTime<Utc>>,
        idempotency_key: Option<String>,
        max_retries: i32,
    ) -> Result<EnqueueResult> {
        if let Some(key) = &idempotency_key {
            if let Some(existing) = Job::find_by_idempotency_key(key, &self.pool).await? {
                return Ok(EnqueueResult::Duplicate(existing.id));
            }
        }

        let job = Job::new(job_type, args, run_at, idempotency_key, max_retries);
        let inserted = job.insert(&self.pool).await?;

        tracing::debug!(
            job_id = %inserted.id,
            job_type = %job_type,
            run_at = ?run_at,
            "job enqueued"
        );
        Ok(EnqueueResult::Created(inserted.id))
    }

    async fn claim(&self, worker_id: &str, limit: i64) -> Result<Vec<ClaimedJob>> {
        let jobs = Job::claim_jobs(limit, worker_id, self.default_lease_ms, &self.pool).await?;

        Ok(jobs
            .into_iter()
            .map(|job| ClaimedJob { id: job.id, job })
            .collect())
    }

    async fn mark_succeeded(&self, job_id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE jobs
             SET status = 'succeeded',
                 lease_expires_at = NULL,
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(job_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str, kind: ErrorKind) -> Result<()> {
        let job = Job::find_by_id(job_id, &self.pool).await?;

        if kind.should_retry() && job.retry_count < job.max_retries {
            // Exponential backoff, capped at an hour
            let delay_secs = 2i64.pow(job.retry_count as u32).min(3600);
            let retry_at = Utc::now() + chrono::Duration::seconds(delay_secs);

            sqlx::query(
                "UPDATE jobs
                 SET status = 'pending',
                     retry_count = retry_count + 1,
                     run_at = $2,
                     worker_id = NULL,
                     lease_expires_at = NULL,
                     error_message = $3,
                     error_kind = $4,
                     updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(job_id)
            .bind(retry_at)
            .bind(error)
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?;

            tracing::warn!(
                job_id = %job_id,
                retry_at = %retry_at,
                error = %error,
                "job failed, retry scheduled"
            );
        } else {
            sqlx::query(
                "UPDATE jobs
                 SET status = 'failed',
                     worker_id = NULL,
                     lease_expires_at = NULL,
                     error_message = $2,
                     error_kind = $3,
                     updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(job_id)
            .bind(error)
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?;

            tracing::error!(job_id = %job_id, error = %error, "job failed permanently");
        }

        Ok(())
    }

    async fn next_run_time(&self) -> Result<Option<DateTime<Utc>>> {
        Job::find_next_run_time(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_result_helpers() {
        let created = EnqueueResult::Created(Uuid::new_v4());
        assert!(created.is_created());

        let duplicate = EnqueueResult::Duplicate(Uuid::new_v4());
        assert!(!duplicate.is_created());
        assert_eq!(duplicate.job_id(), duplicate.job_id());
    }
}
