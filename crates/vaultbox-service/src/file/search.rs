//! File search with name, category, tag, and date filters, plus a combined
//! quick search over file and folder names.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vaultbox_core::error::AppError;
use vaultbox_core::result::AppResult;
use vaultbox_core::retry::read_retrying_once;
use vaultbox_core::types::{FileOrdering, PageRequest, PageResponse};
use vaultbox_database::{FileFilter, FileStore, FolderScope};
use vaultbox_entity::file::tag::normalize_tags;
use vaultbox_entity::file::{File, MediaCategory};
use vaultbox_entity::folder::Folder;

use super::service::FileService;
use crate::context::RequestContext;
use crate::folder::TreeService;

/// Most files and most folders a quick search returns, each.
const QUICK_SEARCH_LIMIT: usize = 10;

/// Search criteria. Every present criterion must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Case-insensitive name substring.
    pub name: Option<String>,
    /// Media category.
    pub category: Option<MediaCategory>,
    /// Tags the file must all carry.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Created at or after.
    pub created_after: Option<DateTime<Utc>>,
    /// Created at or before.
    pub created_before: Option<DateTime<Utc>>,
    /// Folder restriction.
    #[serde(skip)]
    pub scope: Option<FolderScope>,
}

/// Files and folders whose names match one query.
#[derive(Debug, Clone, Serialize)]
pub struct QuickSearchResult {
    /// Matching files, most recent first.
    pub files: Vec<File>,
    /// Matching folders.
    pub folders: Vec<Folder>,
    /// `files.len() + folders.len()`.
    pub total: usize,
}

/// Searches the caller's files.
#[derive(Clone)]
pub struct SearchService {
    /// File store.
    files: Arc<dyn FileStore>,
    /// Folder ownership checks.
    file_service: FileService,
    /// Folder name search.
    tree: TreeService,
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService").finish()
    }
}

impl SearchService {
    /// Creates a new search service.
    pub fn new(files: Arc<dyn FileStore>, file_service: FileService, tree: TreeService) -> Self {
        Self {
            files,
            file_service,
            tree,
        }
    }

    /// Runs a search over the caller's files.
    pub async fn search(
        &self,
        ctx: &RequestContext,
        query: SearchQuery,
        page: PageRequest,
        ordering: FileOrdering,
    ) -> AppResult<PageResponse<File>> {
        if let (Some(after), Some(before)) = (query.created_after, query.created_before) {
            if after > before {
                return Err(AppError::validation(
                    "created_after must not be later than created_before",
                ));
            }
        }
        let scope = query.scope.unwrap_or(FolderScope::All);
        self.file_service.check_scope(ctx, scope).await?;

        let filter = FileFilter {
            name_contains: query
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            category: query.category,
            tags: normalize_tags(&query.tags)?.into_iter().collect(),
            created_after: query.created_after,
            created_before: query.created_before,
        };

        read_retrying_once("search_files", || {
            self.files.list(ctx.user_id, scope, &filter, page, ordering)
        })
        .await
    }

    /// Matches `text` against file and folder names in one call.
    ///
    /// Blank text matches nothing. Either lookup failing fails the whole
    /// search.
    pub async fn quick_search(
        &self,
        ctx: &RequestContext,
        text: &str,
    ) -> AppResult<QuickSearchResult> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(QuickSearchResult {
                files: Vec::new(),
                folders: Vec::new(),
                total: 0,
            });
        }

        let query = SearchQuery {
            name: Some(text.to_string()),
            ..Default::default()
        };
        let page = PageRequest::new(0, QUICK_SEARCH_LIMIT as u64);
        let (files, mut folders) = tokio::try_join!(
            self.search(ctx, query, page, FileOrdering::default()),
            self.tree.search_folders(ctx, text),
        )?;
        folders.truncate(QUICK_SEARCH_LIMIT);

        let total = files.items.len() + folders.len();
        Ok(QuickSearchResult {
            files: files.items,
            folders,
            total,
        })
    }
}
