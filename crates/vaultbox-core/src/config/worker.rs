//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Scheduled maintenance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler is started.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression (with seconds) for the expired-link sweep.
    #[serde(default = "default_link_sweep_cron")]
    pub link_sweep_cron: String,
    /// Cron expression (with seconds) for orphaned-record reconciliation.
    #[serde(default = "default_orphan_cron")]
    pub orphan_reconcile_cron: String,
    /// File records inspected per reconciliation batch.
    #[serde(default = "default_batch_size")]
    pub reconcile_batch_size: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            link_sweep_cron: default_link_sweep_cron(),
            orphan_reconcile_cron: default_orphan_cron(),
            reconcile_batch_size: default_batch_size(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_link_sweep_cron() -> String {
    "0 */15 * * * *".to_string()
}

fn default_orphan_cron() -> String {
    "0 30 3 * * *".to_string()
}

fn default_batch_size() -> u32 {
    200
}
