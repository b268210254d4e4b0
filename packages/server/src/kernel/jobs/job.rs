//! The persisted job record.
//!
//! One row per enqueued command. Lifecycle: `pending` → `running` →
//! `succeeded` | `failed`; a retryable failure re-enters `pending` with a
//! backoff until `max_retries` is exhausted. Claiming uses
//! `FOR UPDATE SKIP LOCKED` and a lease so a crashed worker's jobs are
//! recovered by the next claim (at-least-once execution).

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Whether a failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Retryable,
    NonRetryable,
}

impl ErrorKind {
    pub fn should_retry(&self) -> bool {
        matches!(self, ErrorKind::Retryable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Retryable => "retryable",
            ErrorKind::NonRetryable => "non_retryable",
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub job_type: String,
    pub status: String,
    pub args: Option<JsonValue>,
    /// When the job becomes due; NULL means immediately
    pub run_at: Option<DateTime<Utc>>,
    pub retry_count: i32,
    pub max_retries: i32,
    pub idempotency_key: Option<String>,
    pub worker_id: Option<String>,
    pub lease_expires_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub error_kind: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Build a new pending job record.
    pub fn new(
        job_type: &str,
        args: JsonValue,
        run_at: Option<DateTime<Utc>>,
        idempotency_key: Option<String>,
        max_retries: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            job_type: job_type.to_string(),
            status: "pending".to_string(),
            args: Some(args),
            run_at,
            retry_count: 0,
            max_retries,
            idempotency_key,
            worker_id: None,
            lease_expires_at: None,
            error_message: None,
            error_kind: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Insert the record
    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO jobs (id, job_type, status, args, run_at, retry_count, max_retries, idempotency_key)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(self.id)
        .bind(&self.job_type)
        .bind(&self.status)
        .bind(&self.args)
        .bind(self.run_at)
        .bind(self.retry_count)
        .bind(self.max_retries)
        .bind(&self.idempotency_key)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Find job by ID
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// Find a live (pending/running) job carrying an idempotency key
    pub async fn find_by_idempotency_key(key: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM jobs
             WHERE idempotency_key = $1 AND status IN ('pending', 'running')
             LIMIT 1",
        )
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Claim due jobs atomically using FOR UPDATE SKIP LOCKED.
    ///
    /// Also recovers running jobs whose lease has expired.
    pub async fn claim_jobs(
        limit: i64,
        worker_id: &str,
        lease_duration_ms: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "WITH due_jobs AS (
                 SELECT id
                 FROM jobs
                 WHERE (status = 'pending' AND (run_at IS NULL OR run_at <= NOW()))
                    OR (status = 'running' AND lease_expires_at < NOW())
                 ORDER BY COALESCE(run_at, created_at)
                 LIMIT $1
                 FOR UPDATE SKIP LOCKED
             )
             UPDATE jobs
             SET status = 'running',
                 worker_id = $3,
                 lease_expires_at = NOW() + ($2 || ' milliseconds')::INTERVAL,
                 updated_at = NOW()
             WHERE id IN (SELECT id FROM due_jobs)
             RETURNING *",
        )
        .bind(limit)
        .bind(lease_duration_ms.to_string())
        .bind(worker_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Earliest pending run time (for sleep optimization)
    pub async fn find_next_run_time(pool: &PgPool) -> Result<Option<DateTime<Utc>>> {
        let row: (Option<DateTime<Utc>>,) = sqlx::query_as(
            "SELECT MIN(COALESCE(run_at, created_at)) FROM jobs WHERE status = 'pending'",
        )
        .fetch_one(pool)
        .await?;

        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_jobs_start_pending() {
        let job = Job::new("publish_scheduled_post", json!({"k": "v"}), None, None, 3);
        assert_eq!(job.status, "pending");
        assert_eq!(job.retry_count, 0);
        assert!(job.lease_expires_at.is_none());
    }

    #[test]
    fn error_kind_retry_policy() {
        assert!(ErrorKind::Retryable.should_retry());
        assert!(!ErrorKind::NonRetryable.should_retry());
    }
}
