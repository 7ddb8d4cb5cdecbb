//! Expired-link sweep and orphaned-record reconciliation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use vaultbox_core::retry::read_retrying_once;
use vaultbox_core::traits::ObjectStore;
use vaultbox_database::{FileStore, ShareLinkStore, UserShareStore};
use vaultbox_entity::file::File;
use vaultbox_service::LinkService;

use crate::executor::{JobExecutionError, JobHandler};

/// Job type of the expired-link sweep.
pub const LINK_SWEEP: &str = "link_sweep";
/// Job type of orphaned-record reconciliation.
pub const ORPHAN_RECONCILE: &str = "orphan_reconcile";

/// Runs the maintenance tasks
pub struct CleanupJobHandler {
    /// Link lifecycle, for the sweep
    links: LinkService,
    /// File records
    files: Arc<dyn FileStore>,
    /// Share links, removed with an orphaned record
    link_store: Arc<dyn ShareLinkStore>,
    /// User shares, removed with an orphaned record
    user_shares: Arc<dyn UserShareStore>,
    /// Object store probed for each record
    objects: Arc<dyn ObjectStore>,
    /// Records per scan batch
    batch_size: u32,
}

impl std::fmt::Debug for CleanupJobHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupJobHandler")
            .field("objects", &self.objects.provider_type())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl CleanupJobHandler {
    /// Create a new cleanup job handler
    pub fn new(
        links: LinkService,
        files: Arc<dyn FileStore>,
        link_store: Arc<dyn ShareLinkStore>,
        user_shares: Arc<dyn UserShareStore>,
        objects: Arc<dyn ObjectStore>,
        batch_size: u32,
    ) -> Self {
        Self {
            links,
            files,
            link_store,
            user_shares,
            objects,
            batch_size: batch_size.max(1),
        }
    }

    /// Physically delete expired share links
    pub async fn sweep_expired_links(&self) -> Result<Value, JobExecutionError> {
        let removed = self
            .links
            .sweep_expired()
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Link sweep failed: {}", e)))?;

        Ok(serde_json::json!({
            "task": LINK_SWEEP,
            "expired_links_removed": removed,
        }))
    }

    /// Delete file records whose object no longer exists
    ///
    /// Records are scanned in id order. A record whose probe or deletion
    /// fails is skipped and counted.
    pub async fn reconcile_orphans(&self) -> Result<Value, JobExecutionError> {
        let mut cursor = None;
        let mut scanned = 0u64;
        let mut removed = 0u64;
        let mut skipped = 0u64;

        loop {
            let batch = read_retrying_once("scan_files", || {
                self.files.scan_after(cursor, self.batch_size)
            })
            .await
            .map_err(|e| JobExecutionError::Transient(format!("File scan failed: {}", e)))?;
            let Some(last) = batch.last() else {
                break;
            };
            cursor = Some(last.id);
            let full_batch = batch.len() as u32 >= self.batch_size;

            for file in &batch {
                scanned += 1;
                match self.objects.exists(&file.object_ref).await {
                    Ok(true) => {}
                    Ok(false) => {
                        if self.remove_orphan(file).await {
                            removed += 1;
                        } else {
                            skipped += 1;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(file_id = %file.id, error = %e, "Object probe failed, record skipped");
                        skipped += 1;
                    }
                }
            }

            if !full_batch {
                break;
            }
        }

        if removed > 0 {
            tracing::info!(removed, "Orphaned file records removed");
        }
        Ok(serde_json::json!({
            "task": ORPHAN_RECONCILE,
            "records_scanned": scanned,
            "orphans_removed": removed,
            "skipped": skipped,
        }))
    }

    async fn remove_orphan(&self, file: &File) -> bool {
        match self.files.delete(file.id).await {
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(file_id = %file.id, error = %e, "Failed to delete orphaned record");
                return false;
            }
        }
        tracing::info!(
            file_id = %file.id,
            object_ref = %file.object_ref,
            "Removed file record without object"
        );
        if let Err(e) = self.link_store.delete_by_file(file.id).await {
            tracing::warn!(file_id = %file.id, error = %e, "Failed to delete links of orphaned record");
        }
        if let Err(e) = self.user_shares.delete_by_file(file.id).await {
            tracing::warn!(file_id = %file.id, error = %e, "Failed to delete shares of orphaned record");
        }
        true
    }
}

/// Handler for the link_sweep job type
#[derive(Debug)]
pub struct LinkSweepHandler {
    /// Inner cleanup handler
    inner: Arc<CleanupJobHandler>,
}

impl LinkSweepHandler {
    /// Create a new link sweep handler
    pub fn new(inner: Arc<CleanupJobHandler>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl JobHandler for LinkSweepHandler {
    fn job_type(&self) -> &str {
        LINK_SWEEP
    }

    async fn execute(&self) -> Result<Value, JobExecutionError> {
        self.inner.sweep_expired_links().await
    }
}

/// Handler for the orphan_reconcile job type
#[derive(Debug)]
pub struct OrphanReconcileHandler {
    /// Inner cleanup handler
    inner: Arc<CleanupJobHandler>,
}

impl OrphanReconcileHandler {
    /// Create a new reconciliation handler
    pub fn new(inner: Arc<CleanupJobHandler>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl JobHandler for OrphanReconcileHandler {
    fn job_type(&self) -> &str {
        ORPHAN_RECONCILE
    }

    async fn execute(&self) -> Result<Value, JobExecutionError> {
        self.inner.reconcile_orphans().await
    }
}
