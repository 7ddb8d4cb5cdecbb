//! Direct user-to-user share entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vaultbox_core::types::{FileId, UserId, UserShareId};

use crate::file::File;
use crate::permission::{GrantPermission, PermissionSet};

/// A grant from a file owner to one other user.
///
/// At most one row exists per `(file_id, shared_with_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserShare {
    /// Unique share identifier.
    pub id: UserShareId,
    /// The shared file.
    pub file_id: FileId,
    /// The file owner.
    pub owner_id: UserId,
    /// The recipient.
    pub shared_with_id: UserId,
    /// Granted permissions, sorted and non-empty.
    pub permissions: Vec<GrantPermission>,
    /// When the grant was last (re)issued.
    pub shared_at: DateTime<Utc>,
    /// When the row was first created.
    pub created_at: DateTime<Utc>,
}

impl UserShare {
    /// The permissions the recipient receives.
    pub fn permission_set(&self) -> PermissionSet {
        PermissionSet::from_grants(&self.permissions)
    }
}

/// Data required to create or refresh a user share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertUserShare {
    /// The shared file.
    pub file_id: FileId,
    /// The file owner.
    pub owner_id: UserId,
    /// The recipient.
    pub shared_with_id: UserId,
    /// Normalized permissions.
    pub permissions: Vec<GrantPermission>,
}

/// A file as seen by a share recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedFile {
    /// The file.
    pub file: File,
    /// The share granting access.
    pub share: UserShare,
    /// Owner display name or email, when known.
    pub owner_name: Option<String>,
}
