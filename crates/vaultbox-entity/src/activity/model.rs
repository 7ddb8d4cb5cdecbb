//! Activity log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use vaultbox_core::types::{ActivityId, UserId};

/// What a user did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// A file was uploaded.
    FileUpload,
    /// A file was downloaded.
    FileDownload,
    /// A file was deleted.
    FileDelete,
    /// A file was moved to another folder.
    FileMove,
    /// A file's tags changed.
    FileTag,
    /// A file was shared by link or with a user.
    FileShare,
    /// A folder was created.
    FolderCreate,
    /// A folder was renamed.
    FolderRename,
    /// A folder was moved.
    FolderMove,
    /// A folder was deleted.
    FolderDelete,
    /// A share link was used.
    ShareAccess,
    /// A share link or user share was withdrawn.
    ShareRevoke,
    /// Several files were deleted at once.
    BulkDelete,
    /// Several files were moved at once.
    BulkMove,
}

impl ActivityAction {
    /// Past-tense verb used in summaries.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::FileUpload => "uploaded",
            Self::FileDownload => "downloaded",
            Self::FileDelete | Self::FolderDelete | Self::BulkDelete => "deleted",
            Self::FileMove | Self::FolderMove | Self::BulkMove => "moved",
            Self::FileTag => "tagged",
            Self::FileShare => "shared",
            Self::FolderCreate => "created",
            Self::FolderRename => "renamed",
            Self::ShareAccess => "accessed",
            Self::ShareRevoke => "revoked",
        }
    }
}

/// Kind of resource an activity refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resource_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// A file record.
    File,
    /// A folder.
    Folder,
    /// A public share link.
    ShareLink,
    /// A direct user share.
    UserShare,
}

impl ResourceType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
            Self::ShareLink => "share_link",
            Self::UserShare => "user_share",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceType {
    type Err = vaultbox_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "folder" => Ok(Self::Folder),
            "share_link" => Ok(Self::ShareLink),
            "user_share" => Ok(Self::UserShare),
            _ => Err(vaultbox_core::AppError::validation(format!(
                "Invalid resource type: '{s}'"
            ))),
        }
    }
}

/// An immutable activity log entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    /// Unique entry identifier.
    pub id: ActivityId,
    /// The acting user.
    pub user_id: UserId,
    /// What happened.
    pub action: ActivityAction,
    /// Kind of the target.
    pub resource_type: ResourceType,
    /// Target identifier.
    pub resource_id: Uuid,
    /// Target name at the time of the action.
    pub resource_name: String,
    /// Free-form details.
    pub metadata: serde_json::Value,
    /// Client address, when known.
    pub ip_address: Option<String>,
    /// Client user agent, when known.
    pub user_agent: Option<String>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

impl Activity {
    /// A one-line human description, e.g. `uploaded "report.pdf"`.
    pub fn summary(&self) -> String {
        match self.action {
            ActivityAction::BulkDelete | ActivityAction::BulkMove => {
                let count = self
                    .metadata
                    .get("count")
                    .and_then(serde_json::Value::as_u64)
                    .unwrap_or(0);
                format!("{} {count} files", self.action.verb())
            }
            ActivityAction::FolderRename => match self.metadata.get("old_name").and_then(|v| v.as_str()) {
                Some(old) => format!("renamed folder \"{old}\" to \"{}\"", self.resource_name),
                None => format!("renamed folder \"{}\"", self.resource_name),
            },
            ActivityAction::FolderCreate
            | ActivityAction::FolderMove
            | ActivityAction::FolderDelete => {
                format!("{} folder \"{}\"", self.action.verb(), self.resource_name)
            }
            _ => format!("{} \"{}\"", self.action.verb(), self.resource_name),
        }
    }
}

/// Data required to append an activity entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivity {
    /// The acting user.
    pub user_id: UserId,
    /// What happened.
    pub action: ActivityAction,
    /// Kind of the target.
    pub resource_type: ResourceType,
    /// Target identifier.
    pub resource_id: Uuid,
    /// Target name.
    pub resource_name: String,
    /// Free-form details.
    pub metadata: serde_json::Value,
    /// Client address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
}
