//! Object store handle types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle to a binary held by the object store.
///
/// Immutable once assigned to a file record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct ObjectRef(String);

impl ObjectRef {
    /// Wrap a provider key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Return the provider key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a generated object URL will be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlMode {
    /// Inline display.
    #[default]
    View,
    /// Attachment download.
    Download,
}
