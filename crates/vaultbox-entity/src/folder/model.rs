//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vaultbox_core::AppError;
use vaultbox_core::types::{FolderId, UserId};

/// Materialized path of every root-level folder.
pub const ROOT_PATH: &str = "/";

/// Longest accepted folder name.
const MAX_NAME_LENGTH: usize = 255;

/// A folder in the file hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Parent folder ID (null for root folders).
    pub parent_id: Option<FolderId>,
    /// The folder owner.
    pub owner_id: UserId,
    /// Names of all ancestors joined by `/`, always ending in `/`.
    pub path: String,
    /// Display color.
    pub color: Option<String>,
    /// Display icon.
    pub icon: Option<String>,
    /// Bumped on every rename or move, used for compare-and-swap updates.
    pub revision: i64,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Path a direct child of this folder must carry.
    pub fn child_path(&self) -> String {
        format!("{}{}/", self.path, self.name)
    }

    /// Full path of this folder itself, e.g. `/Documents/Reports/`.
    pub fn full_path(&self) -> String {
        self.child_path()
    }

    /// Whether the folder belongs to `user`.
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    /// Trim and check a folder name.
    pub fn normalize_name(raw: &str) -> Result<String, AppError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(AppError::validation("Folder name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(AppError::validation(format!(
                "Folder name exceeds {MAX_NAME_LENGTH} characters"
            )));
        }
        if name.contains('/') {
            return Err(AppError::validation("Folder name must not contain '/'"));
        }
        Ok(name.to_string())
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder name.
    pub name: String,
    /// Parent folder (None for root).
    pub parent_id: Option<FolderId>,
    /// The folder owner.
    pub owner_id: UserId,
    /// Materialized path.
    pub path: String,
    /// Display color.
    pub color: Option<String>,
    /// Display icon.
    pub icon: Option<String>,
}
