//! Tag normalization.
//!
//! Tags are lower-cased and limited to `[a-z0-9-]`. A file's tag list is a
//! sorted set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use vaultbox_core::AppError;

/// Longest accepted tag.
pub const MAX_TAG_LENGTH: usize = 32;

/// Number of tags a client should suggest at most.
pub const SUGGESTED_TAG_LIMIT: usize = 10;

/// A tag and how many of a user's files carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TagCount {
    /// The tag.
    pub tag: String,
    /// Number of files carrying it.
    pub count: i64,
}

/// Normalize one raw tag. Blank input yields `None`.
pub fn normalize_tag(raw: &str) -> Result<Option<String>, AppError> {
    let tag = raw.trim().to_lowercase();
    if tag.is_empty() {
        return Ok(None);
    }
    if tag.len() > MAX_TAG_LENGTH {
        return Err(AppError::validation(format!(
            "Tag '{tag}' exceeds {MAX_TAG_LENGTH} characters"
        )));
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(AppError::validation(format!(
            "Tag '{raw}' may only contain letters, digits and '-'"
        )));
    }
    Ok(Some(tag))
}

/// Normalize a batch of raw tags into a sorted, de-duplicated set.
pub fn normalize_tags<S: AsRef<str>>(raw: &[S]) -> Result<BTreeSet<String>, AppError> {
    let mut set = BTreeSet::new();
    for tag in raw {
        if let Some(tag) = normalize_tag(tag.as_ref())? {
            set.insert(tag);
        }
    }
    Ok(set)
}

/// Union of existing tags and new raw tags.
pub fn merge_tags<S: AsRef<str>>(existing: &[String], added: &[S]) -> Result<Vec<String>, AppError> {
    let mut set: BTreeSet<String> = existing.iter().cloned().collect();
    set.extend(normalize_tags(added)?);
    Ok(set.into_iter().collect())
}

/// Existing tags minus the normalized removals.
pub fn remove_tags<S: AsRef<str>>(existing: &[String], removed: &[S]) -> Result<Vec<String>, AppError> {
    let removed = normalize_tags(removed)?;
    Ok(existing
        .iter()
        .filter(|t| !removed.contains(*t))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect())
}
