//! File upload service: store the binary, then record it.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};

use vaultbox_core::error::AppError;
use vaultbox_core::result::AppResult;
use vaultbox_core::traits::ObjectStore;
use vaultbox_core::types::FolderId;
use vaultbox_entity::file::File;

use super::service::{FileService, RecordUpload};
use crate::context::RequestContext;

/// MIME type assumed when the client sends none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Single-request upload parameters.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// File name.
    pub name: String,
    /// File content.
    pub data: Bytes,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Target folder (None for the root).
    pub folder_id: Option<FolderId>,
}

/// Handles single-request file uploads.
#[derive(Clone)]
pub struct UploadService {
    /// Binary store.
    objects: Arc<dyn ObjectStore>,
    /// Record service.
    files: FileService,
    /// Upload size limit.
    max_upload_bytes: u64,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("objects", &self.objects.provider_type())
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(objects: Arc<dyn ObjectStore>, files: FileService, max_upload_bytes: u64) -> Self {
        Self {
            objects,
            files,
            max_upload_bytes,
        }
    }

    /// Stores `req.data` and records the file.
    ///
    /// If the record cannot be written the stored object is removed again.
    pub async fn upload(&self, ctx: &RequestContext, req: UploadRequest) -> AppResult<File> {
        if req.data.is_empty() {
            return Err(AppError::validation("File is empty"));
        }
        if req.data.len() as u64 > self.max_upload_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.max_upload_bytes
            )));
        }
        if req.name.trim().is_empty() {
            return Err(AppError::validation("File name must not be empty"));
        }
        if let Some(folder_id) = req.folder_id {
            self.files.check_upload_folder(ctx, folder_id).await?;
        }

        let mime_type = req
            .mime_type
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
        let size_bytes = req.data.len() as i64;

        let object_ref = self.objects.put(req.data, &mime_type).await?;

        let record = RecordUpload {
            name: req.name,
            size_bytes,
            mime_type,
            folder_id: req.folder_id,
            object_ref: object_ref.clone(),
        };
        match self.files.record_upload(ctx, record).await {
            Ok(file) => {
                info!(
                    user_id = %ctx.user_id,
                    file_id = %file.id,
                    object_ref = %file.object_ref,
                    "Upload completed"
                );
                Ok(file)
            }
            Err(e) => {
                if let Err(cleanup) = self.objects.delete(&object_ref).await {
                    warn!(
                        object_ref = %object_ref,
                        error = %cleanup,
                        "Failed to remove object after record write failed"
                    );
                }
                Err(e)
            }
        }
    }
}
