//! Permissions granted on files.
//!
//! [`GrantPermission`] is what a share link or user share may carry.
//! [`Permission`] is what an access decision may contain; only ownership
//! yields `delete` and `share`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use vaultbox_core::AppError;

/// A permission that can be delegated through a share.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "grant_permission", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GrantPermission {
    /// Inline viewing.
    View,
    /// Downloading the binary.
    Download,
}

impl GrantPermission {
    /// Return the permission as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Download => "download",
        }
    }

    /// Parse, sort and de-duplicate a grant set.
    ///
    /// An empty set, or one naming a permission that cannot be delegated,
    /// is an invalid operation.
    pub fn parse_set<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Self>, AppError> {
        let parsed = raw
            .iter()
            .map(|s| s.as_ref().parse::<Self>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::normalize(&parsed)
    }

    /// Sort and de-duplicate a grant set, rejecting an empty one.
    pub fn normalize(grants: &[Self]) -> Result<Vec<Self>, AppError> {
        let set: BTreeSet<Self> = grants.iter().copied().collect();
        if set.is_empty() {
            return Err(AppError::invalid_operation(
                "A share must grant at least one permission",
            ));
        }
        Ok(set.into_iter().collect())
    }
}

impl fmt::Display for GrantPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantPermission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "view" => Ok(Self::View),
            "download" => Ok(Self::Download),
            "delete" | "share" => Err(AppError::invalid_operation(format!(
                "Permission '{s}' cannot be granted through a share"
            ))),
            _ => Err(AppError::validation(format!("Unknown permission: '{s}'"))),
        }
    }
}

/// A permission in an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Inline viewing.
    View,
    /// Downloading the binary.
    Download,
    /// Deleting the file.
    Delete,
    /// Creating shares for the file.
    Share,
}

impl From<GrantPermission> for Permission {
    fn from(grant: GrantPermission) -> Self {
        match grant {
            GrantPermission::View => Self::View,
            GrantPermission::Download => Self::Download,
        }
    }
}

/// An ordered set of permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// The empty set.
    pub fn none() -> Self {
        Self::default()
    }

    /// Everything an owner may do.
    pub fn full() -> Self {
        Self(
            [
                Permission::View,
                Permission::Download,
                Permission::Delete,
                Permission::Share,
            ]
            .into_iter()
            .collect(),
        )
    }

    /// Exactly the permissions carried by a share.
    pub fn from_grants(grants: &[GrantPermission]) -> Self {
        Self(grants.iter().copied().map(Permission::from).collect())
    }

    /// Whether the set contains `permission`.
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
