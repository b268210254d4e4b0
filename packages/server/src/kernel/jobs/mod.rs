//! Deferred execution facility.
//!
//! Commands serialize into Postgres-backed job rows; a background runner
//! claims due rows and dispatches them through a type registry. This is the
//! hand-off point for scheduled post publication.

pub mod job;
pub mod queue;
pub mod registry;
pub mod runner;

pub use job::{ErrorKind, Job};
pub use queue::{ClaimedJob, CommandMeta, EnqueueResult, JobQueue, PostgresJobQueue};
pub use registry::{JobRegistry, SharedJobRegistry};
pub use runner::{JobRunner, JobRunnerConfig};
