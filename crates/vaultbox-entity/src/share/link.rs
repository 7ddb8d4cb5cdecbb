//! Public share link entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vaultbox_core::types::{FileId, ShareLinkId, UserId};

use crate::permission::{GrantPermission, PermissionSet};

/// A tokenized, anonymous grant on one file.
///
/// There is no expired flag: expiry is computed on read. Revocation deletes
/// the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ShareLink {
    /// Unique link identifier.
    pub id: ShareLinkId,
    /// The shared file.
    pub file_id: FileId,
    /// Owner of the file, and of the link.
    pub owner_id: UserId,
    /// Bearer token, alphanumeric and globally unique.
    pub token: String,
    /// Argon2 PHC string when the link is password protected.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// When the link stops working.
    pub expires_at: Option<DateTime<Utc>>,
    /// Granted permissions, sorted and non-empty.
    pub permissions: Vec<GrantPermission>,
    /// Successful view accesses.
    pub views: i64,
    /// Successful download accesses.
    pub downloads: i64,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
}

impl ShareLink {
    /// Whether `now` is at or past the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Whether the link is expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether a password must be presented.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// The permissions a holder receives.
    pub fn permission_set(&self) -> PermissionSet {
        PermissionSet::from_grants(&self.permissions)
    }
}

/// Data required to create a share link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShareLink {
    /// The shared file.
    pub file_id: FileId,
    /// The file owner.
    pub owner_id: UserId,
    /// Pre-checked unique token.
    pub token: String,
    /// Hashed password.
    pub password_hash: Option<String>,
    /// Expiry instant.
    pub expires_at: Option<DateTime<Utc>>,
    /// Normalized permissions.
    pub permissions: Vec<GrantPermission>,
}

/// Kind of successful link access, for usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkUse {
    /// The file was viewed.
    View,
    /// The file was downloaded.
    Download,
}

impl LinkUse {
    /// Counter column incremented by this use.
    pub fn column(&self) -> &'static str {
        match self {
            Self::View => "views",
            Self::Download => "downloads",
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn link(expires_at: Option<DateTime<Utc>>) -> ShareLink {
        ShareLink {
            id: ShareLinkId::new(),
            file_id: FileId::new(),
            owner_id: UserId::new(),
            token: "a".repeat(32),
            password_hash: None,
            expires_at,
            permissions: vec![GrantPermission::View],
            views: 0,
            downloads: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_expiry_is_computed() {
        let now = Utc::now();
        assert!(!link(None).is_expired_at(now));
        assert!(!link(Some(now + Duration::days(1))).is_expired_at(now));
        assert!(link(Some(now - Duration::seconds(1))).is_expired_at(now));
        assert!(link(Some(now)).is_expired_at(now));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let mut l = link(None);
        l.password_hash = Some("$argon2id$secret".into());
        let json = serde_json::to_value(&l).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
