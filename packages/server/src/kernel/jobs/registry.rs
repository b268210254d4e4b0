//! Job registry - maps job type strings to typed handlers.
//!
//! Domains register their command handlers at startup; the runner uses the
//! registry to deserialize a claimed job's payload and execute it without
//! knowing the concrete command type.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;

use super::queue::{ClaimedJob, CommandMeta};
use crate::kernel::ServerDeps;

type BoxedHandler = Box<
    dyn Fn(serde_json::Value, Arc<ServerDeps>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>
        + Send
        + Sync,
>;

#[derive(Default)]
pub struct JobRegistry {
    handlers: HashMap<&'static str, BoxedHandler>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a command type with its async handler.
    pub fn register<C, F, Fut>(&mut self, job_type: &'static str, handler: F)
    where
        C: CommandMeta + DeserializeOwned + Send + Sync + 'static,
        F: Fn(C, Arc<ServerDeps>) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let boxed: BoxedHandler = Box::new(move |value, deps| {
            let handler = handler.clone();
            Box::pin(async move {
                let command: C = serde_json::from_value(value)
                    .map_err(|e| anyhow!("failed to deserialize {}: {}", job_type, e))?;
                handler(command, deps).await
            })
        });

        self.handlers.insert(job_type, boxed);
    }

    /// Execute a claimed job through its registered handler.
    pub async fn execute(&self, job: &ClaimedJob, deps: Arc<ServerDeps>) -> Result<()> {
        let job_type = job.command_type();
        let handler = self
            .handlers
            .get(job_type)
            .ok_or_else(|| anyhow!("unknown job type: {}", job_type))?;

        let args = job
            .job
            .args
            .clone()
            .ok_or_else(|| anyhow!("job {} has no args", job.id))?;

        handler(args, deps).await
    }

    pub fn is_registered(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }

    pub fn registered_types(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }
}

/// Thread-safe registry wrapped in Arc.
pub type SharedJobRegistry = Arc<JobRegistry>;
