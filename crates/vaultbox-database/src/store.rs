//! Structured-store contracts consumed by the service layer.
//!
//! Each trait has a PostgreSQL implementation in [`crate::repositories`]
//! and an in-memory one in [`crate::memory`]. Every failure of the
//! underlying store surfaces as `ErrorKind::ExternalStore`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vaultbox_core::result::AppResult;
use vaultbox_core::types::{
    FileId, FileOrdering, FolderId, PageRequest, PageResponse, ShareLinkId, UserId, UserShareId,
};
use vaultbox_entity::activity::{Activity, CreateActivity, ResourceType};
use vaultbox_entity::file::{CreateFile, File, MediaCategory, TagCount};
use vaultbox_entity::folder::{CreateFolder, Folder};
use vaultbox_entity::share::{CreateShareLink, LinkUse, ShareLink, UpsertUserShare, UserShare};
use vaultbox_entity::user::{UpsertUser, User};

/// Which folders a file listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "folder_id")]
pub enum FolderScope {
    /// Every folder, root included.
    #[default]
    All,
    /// Only files with no folder.
    Root,
    /// Only files whose folder is exactly this one.
    Folder(FolderId),
}

/// Optional narrowing of a file listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileFilter {
    /// Case-insensitive substring of the name.
    pub name_contains: Option<String>,
    /// Media category.
    pub category: Option<MediaCategory>,
    /// Tags that must all be present (already normalized).
    pub tags: Vec<String>,
    /// Lower bound on creation time, inclusive.
    pub created_after: Option<DateTime<Utc>>,
    /// Upper bound on creation time, inclusive.
    pub created_before: Option<DateTime<Utc>>,
}

impl FileFilter {
    /// Whether a file passes every criterion.
    pub fn matches(&self, file: &File) -> bool {
        if let Some(needle) = &self.name_contains {
            if !file.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if file.category() != category {
                return false;
            }
        }
        if !self.tags.iter().all(|t| file.tags.contains(t)) {
            return false;
        }
        if self.created_after.is_some_and(|after| file.created_at < after) {
            return false;
        }
        if self.created_before.is_some_and(|before| file.created_at > before) {
            return false;
        }
        true
    }
}

/// Folder persistence.
#[async_trait]
pub trait FolderStore: Send + Sync + 'static {
    /// Find a folder by ID.
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>>;

    /// Direct children of `parent` (root-level folders when `None`), ordered by name.
    async fn find_children(&self, owner: UserId, parent: Option<FolderId>) -> AppResult<Vec<Folder>>;

    /// Every folder the user owns.
    async fn find_by_owner(&self, owner: UserId) -> AppResult<Vec<Folder>>;

    /// Case-insensitive name search over the user's folders.
    async fn search(&self, owner: UserId, name_contains: &str) -> AppResult<Vec<Folder>>;

    /// Number of direct child folders.
    async fn count_children(&self, id: FolderId) -> AppResult<u64>;

    /// Insert a folder.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Persist name, parent and path of `folder` if its revision is still
    /// current. Returns the stored folder with the bumped revision, or
    /// `None` when the row changed or vanished in the meantime.
    async fn update_if_current(&self, folder: &Folder) -> AppResult<Option<Folder>>;

    /// Overwrite the materialized path of one folder.
    async fn update_path(&self, id: FolderId, path: &str) -> AppResult<bool>;

    /// Delete one folder row.
    async fn delete(&self, id: FolderId) -> AppResult<bool>;
}

/// File record persistence.
#[async_trait]
pub trait FileStore: Send + Sync + 'static {
    /// Find a file by ID.
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>>;

    /// Insert a file record.
    async fn create(&self, data: &CreateFile) -> AppResult<File>;

    /// One ordered window of the owner's files plus the total match count.
    async fn list(
        &self,
        owner: UserId,
        scope: FolderScope,
        filter: &FileFilter,
        page: PageRequest,
        ordering: FileOrdering,
    ) -> AppResult<PageResponse<File>>;

    /// Files whose folder is exactly `folder`.
    async fn find_in_folder(&self, folder: FolderId) -> AppResult<Vec<File>>;

    /// Number of files whose folder is exactly `folder`.
    async fn count_in_folder(&self, folder: FolderId) -> AppResult<u64>;

    /// Change the containing folder.
    async fn update_folder(&self, id: FileId, folder: Option<FolderId>) -> AppResult<Option<File>>;

    /// Replace the tag set.
    async fn update_tags(&self, id: FileId, tags: &[String]) -> AppResult<Option<File>>;

    /// Delete one record.
    async fn delete(&self, id: FileId) -> AppResult<bool>;

    /// Tag usage across the owner's files, most used first.
    async fn tag_counts(&self, owner: UserId) -> AppResult<Vec<TagCount>>;

    /// Records ordered by id, strictly after `cursor`.
    async fn scan_after(&self, cursor: Option<FileId>, limit: u32) -> AppResult<Vec<File>>;
}

/// Share link persistence.
#[async_trait]
pub trait ShareLinkStore: Send + Sync + 'static {
    /// Find a link by ID.
    async fn find_by_id(&self, id: ShareLinkId) -> AppResult<Option<ShareLink>>;

    /// Find a link by token, expired or not.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>>;

    /// Whether any row carries `token`.
    async fn token_exists(&self, token: &str) -> AppResult<bool>;

    /// Insert a link.
    async fn create(&self, data: &CreateShareLink) -> AppResult<ShareLink>;

    /// The owner's links, optionally for one file, newest first.
    async fn list_by_owner(&self, owner: UserId, file: Option<FileId>) -> AppResult<Vec<ShareLink>>;

    /// Bump a usage counter.
    async fn record_use(&self, id: ShareLinkId, usage: LinkUse) -> AppResult<()>;

    /// Physically delete one link.
    async fn delete(&self, id: ShareLinkId) -> AppResult<bool>;

    /// Physically delete every link of a file.
    async fn delete_by_file(&self, file: FileId) -> AppResult<u64>;

    /// Physically delete links whose expiry is at or before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// User share persistence.
#[async_trait]
pub trait UserShareStore: Send + Sync + 'static {
    /// Find a share by ID.
    async fn find_by_id(&self, id: UserShareId) -> AppResult<Option<UserShare>>;

    /// The share of `file` with `user`, if any.
    async fn find_for(&self, file: FileId, user: UserId) -> AppResult<Option<UserShare>>;

    /// Create the share, or refresh permissions and `shared_at` of the existing one.
    async fn upsert(&self, data: &UpsertUserShare) -> AppResult<UserShare>;

    /// All shares of one file.
    async fn list_by_file(&self, file: FileId) -> AppResult<Vec<UserShare>>;

    /// All shares naming `user` as recipient, newest first.
    async fn list_shared_with(&self, user: UserId) -> AppResult<Vec<UserShare>>;

    /// Delete one share.
    async fn delete(&self, id: UserShareId) -> AppResult<bool>;

    /// Delete every share of a file.
    async fn delete_by_file(&self, file: FileId) -> AppResult<u64>;
}

/// Append-only activity persistence.
#[async_trait]
pub trait ActivityStore: Send + Sync + 'static {
    /// Append one entry.
    async fn append(&self, data: &CreateActivity) -> AppResult<Activity>;

    /// The user's entries, newest first.
    async fn list_by_user(&self, user: UserId, page: PageRequest) -> AppResult<PageResponse<Activity>>;

    /// The user's entries about one resource, newest first.
    async fn list_by_resource(
        &self,
        user: UserId,
        resource_type: ResourceType,
        resource_id: Uuid,
        limit: u32,
    ) -> AppResult<Vec<Activity>>;

    /// The user's entries at or after `since`, newest first.
    async fn list_since(&self, user: UserId, since: DateTime<Utc>, limit: u32) -> AppResult<Vec<Activity>>;
}

/// User directory persistence.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Insert or refresh a user.
    async fn upsert(&self, data: &UpsertUser) -> AppResult<User>;

    /// Find a user by ID.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find a user by email, case-insensitively.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

/// Every store the services need, behind trait objects.
#[derive(Clone)]
pub struct Stores {
    /// Folders.
    pub folders: Arc<dyn FolderStore>,
    /// File records.
    pub files: Arc<dyn FileStore>,
    /// Share links.
    pub links: Arc<dyn ShareLinkStore>,
    /// User shares.
    pub user_shares: Arc<dyn UserShareStore>,
    /// Activity log.
    pub activities: Arc<dyn ActivityStore>,
    /// User directory.
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    /// Stores backed by PostgreSQL.
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        use crate::repositories::*;
        Self {
            folders: Arc::new(FolderRepository::new(pool.clone())),
            files: Arc::new(FileRepository::new(pool.clone())),
            links: Arc::new(ShareLinkRepository::new(pool.clone())),
            user_shares: Arc::new(UserShareRepository::new(pool.clone())),
            activities: Arc::new(ActivityRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool)),
        }
    }

    /// Stores backed by one shared in-memory database.
    pub fn memory() -> Self {
        Self::from_memory(Arc::new(crate::memory::MemoryStore::new()))
    }

    /// Stores backed by an existing in-memory database.
    pub fn from_memory(store: Arc<crate::memory::MemoryStore>) -> Self {
        Self {
            folders: store.clone(),
            files: store.clone(),
            links: store.clone(),
            user_shares: store.clone(),
            activities: store.clone(),
            users: store,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
