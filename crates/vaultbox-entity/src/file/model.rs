//! File record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vaultbox_core::types::{FileId, FolderId, ObjectRef, UserId};

/// Metadata for a binary held by the object store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// The file owner.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Size in bytes, always positive.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: String,
    /// Containing folder (None means the root).
    pub folder_id: Option<FolderId>,
    /// Handle into the object store. Never changes after creation.
    pub object_ref: ObjectRef,
    /// Normalized tags, sorted.
    pub tags: Vec<String>,
    /// When the file was recorded.
    pub created_at: DateTime<Utc>,
    /// When the record was last changed.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Whether the file belongs to `user`.
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    /// Media category derived from the MIME type.
    pub fn category(&self) -> MediaCategory {
        MediaCategory::from_mime(&self.mime_type)
    }
}

/// Data required to record a new file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// The file owner.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: String,
    /// Containing folder.
    pub folder_id: Option<FolderId>,
    /// Handle into the object store.
    pub object_ref: ObjectRef,
}

/// Coarse media category used by search filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    /// `image/*`.
    Image,
    /// `video/*`.
    Video,
    /// `audio/*`.
    Audio,
    /// PDFs, office formats and text.
    Document,
    /// Anything else.
    Other,
}

/// MIME types classified as documents besides `text/*`.
const DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/rtf",
];

impl MediaCategory {
    /// Classify a MIME type.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_lowercase();
        if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("video/") {
            Self::Video
        } else if mime.starts_with("audio/") {
            Self::Audio
        } else if mime.starts_with("text/") || DOCUMENT_TYPES.contains(&mime.as_str()) {
            Self::Document
        } else {
            Self::Other
        }
    }

    /// SQL predicate on `mime_type` matching this category.
    pub fn sql_predicate(&self) -> String {
        match self {
            Self::Image => "mime_type LIKE 'image/%'".to_string(),
            Self::Video => "mime_type LIKE 'video/%'".to_string(),
            Self::Audio => "mime_type LIKE 'audio/%'".to_string(),
            Self::Document => format!(
                "(mime_type LIKE 'text/%' OR mime_type IN ({}))",
                DOCUMENT_TYPES
                    .iter()
                    .map(|t| format!("'{t}'"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::Other => format!(
                "NOT (mime_type LIKE 'image/%' OR mime_type LIKE 'video/%' OR mime_type LIKE 'audio/%' OR {})",
                Self::Document.sql_predicate()
            ),
        }
    }
}
