//! Job executor: dispatches a named job to its registered handler.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;

use vaultbox_core::error::AppError;

/// Trait for job handler implementations
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Get the job type this handler processes
    fn job_type(&self) -> &str;

    /// Run the job once, returning a summary of what it did
    async fn execute(&self) -> Result<Value, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure: do not retry
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure: the next scheduled run may succeed
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Dispatches jobs to the appropriate handler based on job type
#[derive(Debug, Default)]
pub struct JobExecutor {
    /// Registered job handlers by type
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobExecutor {
    /// Create a new job executor
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job handler
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let job_type = handler.job_type().to_string();
        tracing::info!("Registered job handler for type '{}'", job_type);
        self.handlers.insert(job_type, handler);
    }

    /// Run a job by dispatching to the correct handler
    pub async fn execute(&self, job_type: &str) -> Result<Value, JobExecutionError> {
        let handler = self.handlers.get(job_type).ok_or_else(|| {
            JobExecutionError::Permanent(format!(
                "No handler registered for job type '{}'",
                job_type
            ))
        })?;

        let started = Instant::now();
        tracing::info!(job_type, "Executing job");
        let result = handler.execute().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(summary) => tracing::info!(job_type, elapsed_ms, %summary, "Job completed"),
            Err(e) => tracing::error!(job_type, elapsed_ms, error = %e, "Job failed"),
        }
        result
    }

    /// Check if a handler is registered for a job type
    pub fn has_handler(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }

    /// Get the list of registered job types
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }
}
