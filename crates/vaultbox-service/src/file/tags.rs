//! Tag vocabulary of a user.

use std::sync::Arc;

use vaultbox_core::result::AppResult;
use vaultbox_core::retry::read_retrying_once;
use vaultbox_database::FileStore;
use vaultbox_entity::file::TagCount;
use vaultbox_entity::file::tag::SUGGESTED_TAG_LIMIT;

use crate::context::RequestContext;

/// Lists and suggests the caller's tags.
#[derive(Clone)]
pub struct TagService {
    files: Arc<dyn FileStore>,
}

impl std::fmt::Debug for TagService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagService").finish()
    }
}

impl TagService {
    /// Creates a new tag service.
    pub fn new(files: Arc<dyn FileStore>) -> Self {
        Self { files }
    }

    /// Every tag the caller uses, most used first.
    pub async fn user_tags(&self, ctx: &RequestContext) -> AppResult<Vec<TagCount>> {
        read_retrying_once("tag_counts", || self.files.tag_counts(ctx.user_id)).await
    }

    /// Up to ten of the caller's tags starting with `prefix`, most used first.
    pub async fn suggest_tags(&self, ctx: &RequestContext, prefix: &str) -> AppResult<Vec<String>> {
        let prefix = prefix.trim().to_lowercase();
        let counts = self.user_tags(ctx).await?;
        Ok(counts
            .into_iter()
            .filter(|c| c.tag.starts_with(&prefix))
            .take(SUGGESTED_TAG_LIMIT)
            .map(|c| c.tag)
            .collect())
    }
}
