//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use vaultbox_core::config::WorkerConfig;
use vaultbox_core::error::AppError;

use crate::executor::JobExecutor;
use crate::jobs::cleanup::{LINK_SWEEP, ORPHAN_RECONCILE};

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Executor the scheduled runs dispatch to
    executor: Arc<JobExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("executor", &self.executor)
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(executor: Arc<JobExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Register the maintenance tasks on their configured schedules
    pub async fn register_default_tasks(&self, config: &WorkerConfig) -> Result<(), AppError> {
        self.register(LINK_SWEEP, &config.link_sweep_cron).await?;
        self.register(ORPHAN_RECONCILE, &config.orphan_reconcile_cron)
            .await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Run `job_type` on the cron expression `schedule` (with seconds)
    pub async fn register(&self, job_type: &str, schedule: &str) -> Result<(), AppError> {
        if !self.executor.has_handler(job_type) {
            return Err(AppError::configuration(format!(
                "No handler registered for scheduled job '{}'",
                job_type
            )));
        }

        let executor = Arc::clone(&self.executor);
        let name = job_type.to_string();
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            let name = name.clone();
            Box::pin(async move {
                tracing::debug!(job_type = %name, "Running scheduled job");
                // Failures are logged by the executor; the next tick retries.
                let _ = executor.execute(&name).await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid schedule '{}' for {}: {}",
                schedule, job_type, e
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add {} schedule: {}", job_type, e))
        })?;

        tracing::info!(job_type, schedule, "Registered scheduled job");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
