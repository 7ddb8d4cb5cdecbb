//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use vaultbox_core::types::{FileId, FolderId, UrlMode, UserId};
use vaultbox_database::FolderScope;
use vaultbox_entity::activity::ResourceType;
use vaultbox_entity::file::MediaCategory;
use vaultbox_service::file::search::SearchQuery;
use vaultbox_service::folder::service::CreateFolderRequest as SvcCreateFolder;
use vaultbox_service::share::CreateLinkRequest as SvcCreateLink;

/// Create folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Parent folder ID; root-level when absent.
    pub parent_id: Option<FolderId>,
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "Folder name must be 1 to 255 characters"))]
    pub name: String,
    /// Display color.
    #[validate(length(max = 32))]
    pub color: Option<String>,
    /// Display icon.
    #[validate(length(max = 64))]
    pub icon: Option<String>,
}

impl From<CreateFolderRequest> for SvcCreateFolder {
    fn from(req: CreateFolderRequest) -> Self {
        Self {
            name: req.name,
            parent_id: req.parent_id,
            color: req.color,
            icon: req.icon,
        }
    }
}

/// Rename folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameFolderRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "Folder name must be 1 to 255 characters"))]
    pub name: String,
}

/// Move folder request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveFolderRequest {
    /// New parent; the root when absent.
    pub parent_id: Option<FolderId>,
}

/// Query of `GET /api/folders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderListParams {
    /// Parent folder; root-level folders when absent.
    pub parent_id: Option<FolderId>,
}

/// Query of `DELETE /api/folders/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteFolderParams {
    /// Remove the whole subtree with its files.
    #[serde(default)]
    pub cascade: bool,
}

/// Query of folder search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderSearchParams {
    /// Name substring.
    #[serde(default)]
    pub q: String,
}

/// Query of `GET /api/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuickSearchParams {
    /// Text matched against file and folder names.
    #[serde(default)]
    pub q: String,
}

/// Query of `GET /api/files`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileListParams {
    /// Only files directly in this folder.
    pub folder_id: Option<FolderId>,
    /// Only files with no folder. Ignored when `folder_id` is set.
    #[serde(default)]
    pub root: bool,
}

impl FileListParams {
    /// The folder scope these parameters select.
    pub fn scope(&self) -> FolderScope {
        match (self.folder_id, self.root) {
            (Some(id), _) => FolderScope::Folder(id),
            (None, true) => FolderScope::Root,
            (None, false) => FolderScope::All,
        }
    }
}

/// Query of `GET /api/files/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSearchParams {
    /// Case-insensitive name substring.
    pub name: Option<String>,
    /// Media category.
    pub category: Option<MediaCategory>,
    /// Comma-separated tags the file must all carry.
    pub tags: Option<String>,
    /// Created at or after.
    pub created_after: Option<DateTime<Utc>>,
    /// Created at or before.
    pub created_before: Option<DateTime<Utc>>,
    /// Restrict to one folder.
    pub folder_id: Option<FolderId>,
    /// Restrict to files with no folder.
    #[serde(default)]
    pub root: bool,
}

impl From<FileSearchParams> for SearchQuery {
    fn from(params: FileSearchParams) -> Self {
        let scope = match (params.folder_id, params.root) {
            (Some(id), _) => Some(FolderScope::Folder(id)),
            (None, true) => Some(FolderScope::Root),
            (None, false) => None,
        };
        let tags = params
            .tags
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: params.name,
            category: params.category,
            tags,
            created_after: params.created_after,
            created_before: params.created_before,
            scope,
        }
    }
}

/// Move file request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveFileRequest {
    /// Target folder; the root when absent.
    pub folder_id: Option<FolderId>,
}

/// Tag or untag request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TagsRequest {
    /// Tags to add or remove.
    #[validate(length(min = 1, message = "At least one tag is required"))]
    pub tags: Vec<String>,
}

/// Bulk delete request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkDeleteRequest {
    /// Files to delete.
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 files per request"))]
    pub file_ids: Vec<FileId>,
}

/// Bulk move request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkMoveRequest {
    /// Files to move.
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 files per request"))]
    pub file_ids: Vec<FileId>,
    /// Target folder; the root when absent.
    pub folder_id: Option<FolderId>,
}

/// Query of the URL and content endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentParams {
    /// View (default) or download.
    #[serde(default)]
    pub mode: UrlMode,
    /// Share link token when accessing through a link.
    pub token: Option<String>,
}

/// Query of `GET /api/files/tags/suggest`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagSuggestParams {
    /// Tag prefix.
    #[serde(default)]
    pub prefix: String,
}

/// Create share link request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Optional password.
    #[validate(length(max = 128))]
    pub password: Option<String>,
    /// Days until the link expires.
    #[validate(range(min = 1, max = 365, message = "Expiry must be between 1 and 365 days"))]
    pub expires_in_days: Option<u32>,
    /// Granted permissions: `view` and/or `download`.
    pub permissions: Option<Vec<String>>,
}

impl From<CreateLinkRequest> for SvcCreateLink {
    fn from(req: CreateLinkRequest) -> Self {
        Self {
            password: req.password,
            expires_in_days: req.expires_in_days,
            permissions: req.permissions,
        }
    }
}

/// Query of `GET /api/links`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkListParams {
    /// Only links of this file.
    pub file_id: Option<FileId>,
}

/// Body of a public link request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkAccessRequest {
    /// Link password.
    pub password: Option<String>,
}

/// Share a file with a user, by id or by email.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShareRequest {
    /// Recipient id.
    pub user_id: Option<UserId>,
    /// Recipient email, used when `user_id` is absent.
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// Granted permissions: `view` and/or `download`.
    #[validate(length(min = 1, message = "At least one permission is required"))]
    pub permissions: Vec<String>,
}

/// Query of `GET /api/activities`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentActivityParams {
    /// Look-back window in hours.
    #[serde(default = "default_recent_hours")]
    pub hours: i64,
}

fn default_recent_hours() -> i64 {
    24
}

/// Path of `GET /api/activities/{resource_type}/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceActivityPath {
    /// Resource kind.
    pub resource_type: ResourceType,
    /// Resource id.
    pub id: uuid::Uuid,
}

/// Query of resource activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceActivityParams {
    /// Most entries returned.
    #[serde(default = "default_resource_limit")]
    pub limit: u32,
}

fn default_resource_limit() -> u32 {
    50
}
