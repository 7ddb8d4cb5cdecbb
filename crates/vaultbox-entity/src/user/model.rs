//! User directory entry.
//!
//! Identities are issued by an external provider; this table only mirrors
//! what is needed to resolve an email to an id and to show owner names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vaultbox_core::types::UserId;

/// A known user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Identity provider user id.
    pub id: UserId,
    /// Lower-cased email address.
    pub email: String,
    /// Display name.
    pub display_name: Option<String>,
    /// First time the user was seen.
    pub created_at: DateTime<Utc>,
    /// Last time the profile changed.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name, falling back to the email.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// Identity data mirrored into the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertUser {
    /// Identity provider user id.
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: Option<String>,
}
