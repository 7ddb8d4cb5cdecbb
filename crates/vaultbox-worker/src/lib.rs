//! Scheduled maintenance for Vaultbox.
//!
//! This crate provides:
//! - A job executor that dispatches a named job to its handler
//! - A cron scheduler that runs jobs on their configured schedules
//! - The expired-link sweep and orphaned-record reconciliation jobs

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use scheduler::CronScheduler;
