//! File record CRUD, tagging, and bulk operations.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use vaultbox_core::error::{AppError, ErrorKind};
use vaultbox_core::result::AppResult;
use vaultbox_core::retry::read_retrying_once;
use vaultbox_core::types::{FileId, FileOrdering, FolderId, ObjectRef, PageRequest, PageResponse};
use vaultbox_database::{FileFilter, FileStore, FolderScope, FolderStore};
use vaultbox_entity::activity::{ActivityAction, ResourceType};
use vaultbox_entity::file::tag::{merge_tags, remove_tags};
use vaultbox_entity::file::{CreateFile, File};

use super::delete::FileDeleter;
use crate::activity::ActivityLogger;
use crate::context::RequestContext;

/// Most files one bulk request may name.
pub const MAX_BULK_ITEMS: usize = 100;

/// Metadata for a binary already written to the object store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordUpload {
    /// Display name.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: String,
    /// Containing folder (None for the root).
    pub folder_id: Option<FolderId>,
    /// Handle returned by the object store.
    pub object_ref: ObjectRef,
}

/// One failed item of a bulk operation.
#[derive(Debug, Clone, Serialize)]
pub struct BulkFailure {
    /// The file.
    pub file_id: FileId,
    /// Error kind.
    pub kind: ErrorKind,
    /// Error message.
    pub message: String,
}

/// Per-item result of a bulk operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkOutcome {
    /// Files the operation applied to.
    pub succeeded: Vec<FileId>,
    /// Files it did not, with the reason.
    pub failed: Vec<BulkFailure>,
}

/// Manages file records.
#[derive(Clone)]
pub struct FileService {
    /// File store.
    files: Arc<dyn FileStore>,
    /// Folder store, for ownership of target folders.
    folders: Arc<dyn FolderStore>,
    /// Paired object/record deletion.
    deleter: FileDeleter,
    /// Audit trail.
    activity: ActivityLogger,
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService").finish()
    }
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        files: Arc<dyn FileStore>,
        folders: Arc<dyn FolderStore>,
        deleter: FileDeleter,
        activity: ActivityLogger,
    ) -> Self {
        Self {
            files,
            folders,
            deleter,
            activity,
        }
    }

    /// Gets a file by ID. Files of other users are not found.
    pub async fn get_file(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<File> {
        self.find(file_id)
            .await?
            .filter(|f| f.is_owned_by(ctx.user_id))
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_id}")))
    }

    /// Records a binary the caller already stored.
    ///
    /// A target folder must exist and belong to the caller.
    pub async fn record_upload(&self, ctx: &RequestContext, req: RecordUpload) -> AppResult<File> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("File name must not be empty"));
        }
        if req.size_bytes <= 0 {
            return Err(AppError::validation("File size must be positive"));
        }
        if let Some(folder_id) = req.folder_id {
            self.check_upload_folder(ctx, folder_id).await?;
        }

        let file = self
            .files
            .create(&CreateFile {
                owner_id: ctx.user_id,
                name: name.to_string(),
                size_bytes: req.size_bytes,
                mime_type: req.mime_type,
                folder_id: req.folder_id,
                object_ref: req.object_ref,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file.id,
            size = file.size_bytes,
            "File recorded"
        );
        self.activity
            .record(
                ctx,
                ActivityAction::FileUpload,
                ResourceType::File,
                file.id.into_uuid(),
                &file.name,
                serde_json::json!({ "size": file.size_bytes, "mime_type": file.mime_type }),
            )
            .await;

        Ok(file)
    }

    /// Lists the caller's files in `scope`.
    pub async fn list_files(
        &self,
        ctx: &RequestContext,
        scope: FolderScope,
        page: PageRequest,
        ordering: FileOrdering,
    ) -> AppResult<PageResponse<File>> {
        self.check_scope(ctx, scope).await?;
        let filter = FileFilter::default();
        read_retrying_once("list_files", || {
            self.files.list(ctx.user_id, scope, &filter, page, ordering)
        })
        .await
    }

    /// Moves a file into `folder_id` (or to the root when `None`).
    pub async fn move_file(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        folder_id: Option<FolderId>,
    ) -> AppResult<File> {
        if let Some(folder_id) = folder_id {
            self.check_target_folder(ctx, folder_id).await?;
        }
        let (file, from) = self.move_one(ctx, file_id, folder_id).await?;

        self.activity
            .record(
                ctx,
                ActivityAction::FileMove,
                ResourceType::File,
                file.id.into_uuid(),
                &file.name,
                serde_json::json!({ "from": from, "to": folder_id }),
            )
            .await;
        Ok(file)
    }

    /// Deletes a file's object and record.
    pub async fn delete_file(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<()> {
        let file = self.delete_one(ctx, file_id).await?;
        self.activity
            .record(
                ctx,
                ActivityAction::FileDelete,
                ResourceType::File,
                file.id.into_uuid(),
                &file.name,
                serde_json::json!({ "size": file.size_bytes }),
            )
            .await;
        Ok(())
    }

    /// Adds tags to a file.
    pub async fn tag<S: AsRef<str>>(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        tags: &[S],
    ) -> AppResult<File> {
        let file = self.load_owned(ctx, file_id).await?;
        let merged = merge_tags(&file.tags, tags)?;
        self.store_tags(ctx, file, merged, "added", tags).await
    }

    /// Removes tags from a file.
    pub async fn untag<S: AsRef<str>>(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        tags: &[S],
    ) -> AppResult<File> {
        let file = self.load_owned(ctx, file_id).await?;
        let remaining = remove_tags(&file.tags, tags)?;
        self.store_tags(ctx, file, remaining, "removed", tags).await
    }

    /// Deletes several files, one at a time, reporting each outcome.
    pub async fn bulk_delete(&self, ctx: &RequestContext, file_ids: &[FileId]) -> AppResult<BulkOutcome> {
        let ids = dedupe_bulk_ids(file_ids)?;
        let mut outcome = BulkOutcome::default();

        for id in ids {
            match self.delete_one(ctx, id).await {
                Ok(_) => outcome.succeeded.push(id),
                Err(e) => outcome.failed.push(BulkFailure {
                    file_id: id,
                    kind: e.kind,
                    message: e.message,
                }),
            }
        }

        info!(
            user_id = %ctx.user_id,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Bulk delete finished"
        );
        self.record_bulk(ctx, ActivityAction::BulkDelete, &outcome, None)
            .await;
        Ok(outcome)
    }

    /// Moves several files into one folder, reporting each outcome.
    pub async fn bulk_move(
        &self,
        ctx: &RequestContext,
        file_ids: &[FileId],
        folder_id: Option<FolderId>,
    ) -> AppResult<BulkOutcome> {
        let ids = dedupe_bulk_ids(file_ids)?;
        if let Some(folder_id) = folder_id {
            self.check_target_folder(ctx, folder_id).await?;
        }
        let mut outcome = BulkOutcome::default();

        for id in ids {
            match self.move_one(ctx, id, folder_id).await {
                Ok(_) => outcome.succeeded.push(id),
                Err(e) => outcome.failed.push(BulkFailure {
                    file_id: id,
                    kind: e.kind,
                    message: e.message,
                }),
            }
        }

        info!(
            user_id = %ctx.user_id,
            folder_id = ?folder_id,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Bulk move finished"
        );
        self.record_bulk(ctx, ActivityAction::BulkMove, &outcome, folder_id)
            .await;
        Ok(outcome)
    }

    /// Check a folder can receive an upload: it must exist and be the caller's.
    pub(crate) async fn check_upload_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
    ) -> AppResult<()> {
        let folder = read_retrying_once("find_folder", || self.folders.find_by_id(folder_id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder not found: {folder_id}")))?;
        if !folder.is_owned_by(ctx.user_id) {
            return Err(AppError::unauthorized("You do not own the target folder"));
        }
        Ok(())
    }

    /// Check a listing scope names one of the caller's folders.
    pub(crate) async fn check_scope(&self, ctx: &RequestContext, scope: FolderScope) -> AppResult<()> {
        match scope {
            FolderScope::Folder(folder_id) => self.check_target_folder(ctx, folder_id).await,
            FolderScope::All | FolderScope::Root => Ok(()),
        }
    }

    async fn check_target_folder(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<()> {
        read_retrying_once("find_folder", || self.folders.find_by_id(folder_id))
            .await?
            .filter(|f| f.is_owned_by(ctx.user_id))
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Folder not found: {folder_id}")))
    }

    async fn find(&self, file_id: FileId) -> AppResult<Option<File>> {
        read_retrying_once("find_file", || self.files.find_by_id(file_id)).await
    }

    /// Loads a file the actor must own.
    async fn load_owned(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<File> {
        let file = self
            .find(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_id}")))?;
        if !file.is_owned_by(ctx.user_id) {
            return Err(AppError::unauthorized("You do not own this file"));
        }
        Ok(file)
    }

    async fn move_one(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        folder_id: Option<FolderId>,
    ) -> AppResult<(File, Option<FolderId>)> {
        let file = self.load_owned(ctx, file_id).await?;
        let from = file.folder_id;
        if from == folder_id {
            return Ok((file, from));
        }
        let moved = self
            .files
            .update_folder(file_id, folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_id}")))?;
        info!(user_id = %ctx.user_id, file_id = %file_id, to = ?folder_id, "File moved");
        Ok((moved, from))
    }

    async fn delete_one(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<File> {
        let file = self.load_owned(ctx, file_id).await?;
        self.deleter.delete(&file).await?;
        Ok(file)
    }

    async fn store_tags<S: AsRef<str>>(
        &self,
        ctx: &RequestContext,
        file: File,
        tags: Vec<String>,
        change: &str,
        requested: &[S],
    ) -> AppResult<File> {
        if tags == file.tags {
            return Ok(file);
        }
        let updated = self
            .files
            .update_tags(file.id, &tags)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File not found: {}", file.id)))?;

        let requested: Vec<&str> = requested.iter().map(AsRef::as_ref).collect();
        self.activity
            .record(
                ctx,
                ActivityAction::FileTag,
                ResourceType::File,
                updated.id.into_uuid(),
                &updated.name,
                serde_json::json!({ change: requested, "tags": updated.tags }),
            )
            .await;
        Ok(updated)
    }

    async fn record_bulk(
        &self,
        ctx: &RequestContext,
        action: ActivityAction,
        outcome: &BulkOutcome,
        folder_id: Option<FolderId>,
    ) {
        if outcome.succeeded.is_empty() {
            warn!(user_id = %ctx.user_id, action = ?action, "Bulk operation applied to no files");
            return;
        }
        self.activity
            .record(
                ctx,
                action,
                ResourceType::File,
                Uuid::nil(),
                "",
                serde_json::json!({
                    "count": outcome.succeeded.len(),
                    "file_ids": outcome.succeeded,
                    "failed": outcome.failed.len(),
                    "folder_id": folder_id,
                }),
            )
            .await;
    }
}

/// Order-preserving de-duplication with size limits.
fn dedupe_bulk_ids(file_ids: &[FileId]) -> AppResult<Vec<FileId>> {
    if file_ids.is_empty() {
        return Err(AppError::validation("No files given"));
    }
    let mut seen = HashSet::new();
    let ids: Vec<FileId> = file_ids.iter().copied().filter(|id| seen.insert(*id)).collect();
    if ids.len() > MAX_BULK_ITEMS {
        return Err(AppError::validation(format!(
            "At most {MAX_BULK_ITEMS} files per bulk request"
        )));
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use vaultbox_core::types::UserId;
    use vaultbox_database::MemoryStore;
    use vaultbox_entity::folder::CreateFolder;
    use vaultbox_storage::MemoryObjectStore;

    use super::*;

    fn service(store: &Arc<MemoryStore>) -> FileService {
        let deleter = FileDeleter::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(MemoryObjectStore::new()),
        );
        FileService::new(
            store.clone(),
            store.clone(),
            deleter,
            ActivityLogger::new(store.clone()),
        )
    }

    fn upload(name: &str, folder_id: Option<FolderId>) -> RecordUpload {
        RecordUpload {
            name: name.to_string(),
            size_bytes: 10,
            mime_type: "text/plain".to_string(),
            folder_id,
            object_ref: ObjectRef::new(format!("ab/{name}")),
        }
    }

    async fn folder(store: &MemoryStore, owner: UserId, name: &str) -> FolderId {
        FolderStore::create(
            store,
            &CreateFolder {
                name: name.to_string(),
                parent_id: None,
                owner_id: owner,
                path: "/".to_string(),
                color: None,
                icon: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_record_upload_checks_size_and_folder_owner() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let ctx = RequestContext::new(UserId::new());
        let foreign = folder(&store, UserId::new(), "Theirs").await;

        let mut empty = upload("a.txt", None);
        empty.size_bytes = 0;
        assert_eq!(
            svc.record_upload(&ctx, empty).await.unwrap_err().kind,
            ErrorKind::Validation
        );
        assert_eq!(
            svc.record_upload(&ctx, upload("a.txt", Some(foreign)))
                .await
                .unwrap_err()
                .kind,
            ErrorKind::Unauthorized
        );
        assert!(svc.record_upload(&ctx, upload("a.txt", None)).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_scopes() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let ctx = RequestContext::new(UserId::new());
        let docs = folder(&store, ctx.user_id, "Docs").await;

        svc.record_upload(&ctx, upload("root.txt", None)).await.unwrap();
        svc.record_upload(&ctx, upload("inner.txt", Some(docs))).await.unwrap();

        let all = svc
            .list_files(&ctx, FolderScope::All, PageRequest::default(), FileOrdering::default())
            .await
            .unwrap();
        let root = svc
            .list_files(&ctx, FolderScope::Root, PageRequest::default(), FileOrdering::default())
            .await
            .unwrap();
        let inner = svc
            .list_files(&ctx, FolderScope::Folder(docs), PageRequest::default(), FileOrdering::default())
            .await
            .unwrap();

        assert_eq!(all.total, 2);
        assert_eq!(root.total, 1);
        assert_eq!(root.items[0].name, "root.txt");
        assert_eq!(inner.items[0].name, "inner.txt");
    }

    #[tokio::test]
    async fn test_tag_normalization_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let ctx = RequestContext::new(UserId::new());
        let file = svc.record_upload(&ctx, upload("a.txt", None)).await.unwrap();

        svc.tag(&ctx, file.id, &["Work", "work", "WORK"]).await.unwrap();
        let tagged = svc.tag(&ctx, file.id, &["Work", "work", "WORK"]).await.unwrap();
        assert_eq!(tagged.tags, vec!["work".to_string()]);

        let untagged = svc.untag(&ctx, file.id, &["WORK"]).await.unwrap();
        assert!(untagged.tags.is_empty());
    }

    #[tokio::test]
    async fn test_move_file_ownership() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let ctx = RequestContext::new(UserId::new());
        let intruder = RequestContext::new(UserId::new());
        let docs = folder(&store, ctx.user_id, "Docs").await;
        let theirs = folder(&store, intruder.user_id, "Theirs").await;
        let file = svc.record_upload(&ctx, upload("a.txt", None)).await.unwrap();

        let err = svc.move_file(&intruder, file.id, Some(theirs)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        let err = svc.move_file(&intruder, file.id, Some(docs)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        let err = svc.move_file(&intruder, file.id, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        let err = svc.move_file(&ctx, file.id, Some(theirs)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let moved = svc.move_file(&ctx, file.id, Some(docs)).await.unwrap();
        assert_eq!(moved.folder_id, Some(docs));
    }

    #[tokio::test]
    async fn test_bulk_delete_reports_each_item() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let ctx = RequestContext::new(UserId::new());
        let a = svc.record_upload(&ctx, upload("a.txt", None)).await.unwrap();
        let b = svc.record_upload(&ctx, upload("b.txt", None)).await.unwrap();
        let missing = FileId::new();

        let outcome = svc
            .bulk_delete(&ctx, &[a.id, b.id, a.id, missing])
            .await
            .unwrap();
        assert_eq!(outcome.succeeded, vec![a.id, b.id]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].kind, ErrorKind::NotFound);

        assert!(svc.bulk_delete(&ctx, &[]).await.is_err());
        assert_eq!(store.activity_count().await, 3);
    }
}
