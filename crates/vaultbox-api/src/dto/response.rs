//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vaultbox_core::types::{FileId, ShareLinkId, UserId};
use vaultbox_entity::activity::Activity;
use vaultbox_entity::permission::GrantPermission;
use vaultbox_entity::share::ShareLink;
use vaultbox_entity::user::User;
use vaultbox_service::file::content::FileUrl;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: `ok` or `degraded`.
    pub status: String,
    /// Version.
    pub version: String,
    /// Object store provider.
    pub storage_provider: String,
    /// Whether the object store answered its health probe.
    pub storage_healthy: bool,
}

/// A share link as shown to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkResponse {
    /// Link ID.
    pub id: ShareLinkId,
    /// Shared file.
    pub file_id: FileId,
    /// Bearer token.
    pub token: String,
    /// Whether a password is required.
    pub has_password: bool,
    /// Expiry, if any.
    pub expires_at: Option<DateTime<Utc>>,
    /// Granted permissions.
    pub permissions: Vec<GrantPermission>,
    /// View count.
    pub views: i64,
    /// Download count.
    pub downloads: i64,
    /// Created at.
    pub created_at: DateTime<Utc>,
}

impl From<ShareLink> for LinkResponse {
    fn from(link: ShareLink) -> Self {
        Self {
            has_password: link.has_password(),
            id: link.id,
            file_id: link.file_id,
            token: link.token,
            expires_at: link.expires_at,
            permissions: link.permissions,
            views: link.views,
            downloads: link.downloads,
            created_at: link.created_at,
        }
    }
}

/// What an anonymous link holder learns about the shared file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicLinkResponse {
    /// Shared file.
    pub file_id: FileId,
    /// File name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// URL to view the file at.
    pub url: String,
    /// Granted permissions.
    pub permissions: Vec<GrantPermission>,
    /// Expiry, if any.
    pub expires_at: Option<DateTime<Utc>>,
    /// View count, this view included.
    pub views: i64,
    /// Download count.
    pub downloads: i64,
}

impl PublicLinkResponse {
    /// Combines a validated link with the file URL it resolved to.
    pub fn new(link: ShareLink, file: FileUrl) -> Self {
        Self {
            file_id: file.file_id,
            name: file.name,
            mime_type: file.mime_type,
            url: file.url,
            permissions: link.permissions,
            expires_at: link.expires_at,
            views: link.views + 1,
            downloads: link.downloads,
        }
    }
}

/// An activity entry with its human-readable summary.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    /// The stored entry.
    #[serde(flatten)]
    pub activity: Activity,
    /// E.g. `uploaded "report.pdf"`.
    pub summary: String,
}

impl From<Activity> for ActivityEntry {
    fn from(activity: Activity) -> Self {
        Self {
            summary: activity.summary(),
            activity,
        }
    }
}

/// The caller's identity and directory entry.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    /// User ID.
    pub id: UserId,
    /// Email from the identity token.
    pub email: Option<String>,
    /// Display name from the identity token.
    pub display_name: Option<String>,
    /// Directory entry, once the user has been seen with an email.
    pub directory: Option<User>,
}
