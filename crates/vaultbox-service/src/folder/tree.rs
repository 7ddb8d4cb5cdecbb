//! Folder tree building, breadcrumbs, and folder search.

use std::collections::HashSet;
use std::sync::Arc;

use vaultbox_core::error::AppError;
use vaultbox_core::result::AppResult;
use vaultbox_core::retry::read_retrying_once;
use vaultbox_core::types::FolderId;
use vaultbox_database::FolderStore;
use vaultbox_entity::folder::{Folder, FolderTree};

use crate::context::RequestContext;

/// Most folders a search returns.
const MAX_SEARCH_RESULTS: usize = 50;

/// Read-only views over the folder hierarchy.
#[derive(Clone)]
pub struct TreeService {
    /// Folder store.
    folders: Arc<dyn FolderStore>,
}

impl std::fmt::Debug for TreeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeService").finish()
    }
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(folders: Arc<dyn FolderStore>) -> Self {
        Self { folders }
    }

    /// Every folder of the user, nested.
    pub async fn folder_tree(&self, ctx: &RequestContext) -> AppResult<FolderTree> {
        let folders = read_retrying_once("list_owner_folders", || {
            self.folders.find_by_owner(ctx.user_id)
        })
        .await?;
        if folders.is_empty() {
            return Ok(FolderTree::empty());
        }
        Ok(FolderTree::build(folders))
    }

    /// Ancestors of a folder from the root down, ending with the folder.
    pub async fn breadcrumbs(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
    ) -> AppResult<Vec<Folder>> {
        let mut trail = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(folder_id);

        while let Some(id) = next {
            if !visited.insert(id) {
                return Err(AppError::internal(format!(
                    "Folder hierarchy above {folder_id} contains a cycle"
                )));
            }
            let folder = read_retrying_once("find_folder", || self.folders.find_by_id(id))
                .await?
                .filter(|f| f.is_owned_by(ctx.user_id))
                .ok_or_else(|| AppError::not_found(format!("Folder not found: {id}")))?;
            next = folder.parent_id;
            trail.push(folder);
        }

        trail.reverse();
        Ok(trail)
    }

    /// Folders whose name contains `query`, case-insensitively.
    pub async fn search_folders(&self, ctx: &RequestContext, query: &str) -> AppResult<Vec<Folder>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let mut found = read_retrying_once("search_folders", || {
            self.folders.search(ctx.user_id, query)
        })
        .await?;
        found.truncate(MAX_SEARCH_RESULTS);
        Ok(found)
    }
}
