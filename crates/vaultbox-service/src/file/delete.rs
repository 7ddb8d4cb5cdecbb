//! Paired deletion of a file's object and its record.

use std::sync::Arc;

use tracing::{error, info, warn};

use vaultbox_core::result::AppResult;
use vaultbox_core::traits::ObjectStore;
use vaultbox_database::{FileStore, ShareLinkStore, UserShareStore};
use vaultbox_entity::file::File;

/// Deletes a file's object, then its record, then its grants.
///
/// An interrupted deletion leaves a record whose object is gone; the
/// orphan reconciliation job removes those.
#[derive(Clone)]
pub struct FileDeleter {
    files: Arc<dyn FileStore>,
    links: Arc<dyn ShareLinkStore>,
    user_shares: Arc<dyn UserShareStore>,
    objects: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for FileDeleter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDeleter")
            .field("objects", &self.objects.provider_type())
            .finish()
    }
}

impl FileDeleter {
    /// Creates a new deleter.
    pub fn new(
        files: Arc<dyn FileStore>,
        links: Arc<dyn ShareLinkStore>,
        user_shares: Arc<dyn UserShareStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            files,
            links,
            user_shares,
            objects,
        }
    }

    /// Delete one file.
    ///
    /// An object deletion failure aborts with the record intact. A record
    /// deletion failure after the object is gone is logged as an
    /// inconsistency and returned. Grant cleanup is best-effort.
    pub async fn delete(&self, file: &File) -> AppResult<()> {
        if let Err(e) = self.objects.delete(&file.object_ref).await {
            warn!(
                file_id = %file.id,
                object_ref = %file.object_ref,
                error = %e,
                "Object deletion failed, file record kept"
            );
            return Err(e);
        }

        if let Err(e) = self.files.delete(file.id).await {
            error!(
                file_id = %file.id,
                object_ref = %file.object_ref,
                error = %e,
                "Object deleted but file record remains, left for reconciliation"
            );
            return Err(e);
        }

        if let Err(e) = self.links.delete_by_file(file.id).await {
            warn!(file_id = %file.id, error = %e, "Failed to delete share links of deleted file");
        }
        if let Err(e) = self.user_shares.delete_by_file(file.id).await {
            warn!(file_id = %file.id, error = %e, "Failed to delete user shares of deleted file");
        }

        info!(file_id = %file.id, name = %file.name, "File deleted");
        Ok(())
    }
}
