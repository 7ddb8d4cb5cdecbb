//! Folder CRUD operations with ownership enforcement.
//!
//! Every folder carries a materialized `path`. Renames and moves rewrite the
//! paths of the whole subtree breadth-first; cascade deletes walk the subtree
//! depth-first. Both use explicit worklists and stop at the first failing
//! step, leaving already applied steps in place.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use vaultbox_core::error::AppError;
use vaultbox_core::result::AppResult;
use vaultbox_core::retry::read_retrying_once;
use vaultbox_core::types::{FolderId, UserId};
use vaultbox_database::{FileStore, FolderStore};
use vaultbox_entity::activity::{ActivityAction, ResourceType};
use vaultbox_entity::folder::{CreateFolder, Folder, ROOT_PATH};

use crate::activity::ActivityLogger;
use crate::context::RequestContext;
use crate::file::delete::FileDeleter;

/// Folders created for a new user: name, icon, color.
const DEFAULT_FOLDERS: [(&str, &str, &str); 4] = [
    ("Documents", "file-text", "#3b82f6"),
    ("Images", "image", "#22c55e"),
    ("Videos", "video", "#ef4444"),
    ("Music", "music", "#a855f7"),
];

/// Request to create a new folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Folder name.
    pub name: String,
    /// Parent folder ID (None for root-level).
    pub parent_id: Option<FolderId>,
    /// Display color.
    pub color: Option<String>,
    /// Display icon.
    pub icon: Option<String>,
}

/// What a folder deletion removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteFolderOutcome {
    /// Folders removed, the target included.
    pub folders_deleted: u64,
    /// Files removed from those folders.
    pub files_deleted: u64,
}

/// Manages folder CRUD operations.
#[derive(Clone)]
pub struct FolderService {
    /// Folder store.
    folders: Arc<dyn FolderStore>,
    /// File store.
    files: Arc<dyn FileStore>,
    /// Paired object/record deletion for cascades.
    deleter: FileDeleter,
    /// Audit trail.
    activity: ActivityLogger,
}

impl std::fmt::Debug for FolderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderService").finish()
    }
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
        deleter: FileDeleter,
        activity: ActivityLogger,
    ) -> Self {
        Self {
            folders,
            files,
            deleter,
            activity,
        }
    }

    /// Gets a folder by ID. Folders of other users are not found.
    pub async fn get_folder(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<Folder> {
        self.find(folder_id)
            .await?
            .filter(|f| f.is_owned_by(ctx.user_id))
            .ok_or_else(|| AppError::not_found(format!("Folder not found: {folder_id}")))
    }

    /// Lists direct children of `parent_id`, or the root-level folders when
    /// `parent_id` is `None`.
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        parent_id: Option<FolderId>,
    ) -> AppResult<Vec<Folder>> {
        if let Some(parent_id) = parent_id {
            self.get_folder(ctx, parent_id).await?;
        }
        read_retrying_once("list_child_folders", || {
            self.folders.find_children(ctx.user_id, parent_id)
        })
        .await
    }

    /// Creates a new folder.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> AppResult<Folder> {
        let name = Folder::normalize_name(&req.name)?;

        let path = match req.parent_id {
            Some(parent_id) => self.get_folder(ctx, parent_id).await?.child_path(),
            None => ROOT_PATH.to_string(),
        };
        self.ensure_name_free(ctx.user_id, req.parent_id, &name, None)
            .await?;

        let folder = self
            .folders
            .create(&CreateFolder {
                name,
                parent_id: req.parent_id,
                owner_id: ctx.user_id,
                path,
                color: req.color,
                icon: req.icon,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            path = %folder.full_path(),
            "Folder created"
        );
        self.activity
            .record(
                ctx,
                ActivityAction::FolderCreate,
                ResourceType::Folder,
                folder.id.into_uuid(),
                &folder.name,
                serde_json::json!({ "parent_id": folder.parent_id }),
            )
            .await;

        Ok(folder)
    }

    /// Renames a folder and rewrites the paths of its descendants.
    pub async fn rename_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        new_name: &str,
    ) -> AppResult<Folder> {
        let folder = self.load_owned(ctx, folder_id).await?;
        let name = Folder::normalize_name(new_name)?;
        if name == folder.name {
            return Ok(folder);
        }
        self.ensure_name_free(ctx.user_id, folder.parent_id, &name, Some(folder.id))
            .await?;

        let old_name = folder.name.clone();
        let mut changed = folder;
        changed.name = name;
        let renamed = self.swap(&changed).await?;
        let rewritten = self.rewrite_descendant_paths(&renamed).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            old_name = %old_name,
            new_name = %renamed.name,
            descendants = rewritten,
            "Folder renamed"
        );
        self.activity
            .record(
                ctx,
                ActivityAction::FolderRename,
                ResourceType::Folder,
                folder_id.into_uuid(),
                &renamed.name,
                serde_json::json!({ "old_name": old_name }),
            )
            .await;

        Ok(renamed)
    }

    /// Moves a folder under `new_parent_id` (or to the root when `None`).
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        new_parent_id: Option<FolderId>,
    ) -> AppResult<Folder> {
        let folder = self.load_owned(ctx, folder_id).await?;

        if new_parent_id == Some(folder_id) {
            return Err(AppError::invalid_operation(
                "Cannot move a folder into itself",
            ));
        }

        let new_path = match new_parent_id {
            Some(parent_id) => {
                let parent = self.get_folder(ctx, parent_id).await?;
                self.ensure_not_within(&folder, &parent).await?;
                parent.child_path()
            }
            None => ROOT_PATH.to_string(),
        };

        if new_parent_id == folder.parent_id && new_path == folder.path {
            return Ok(folder);
        }
        self.ensure_name_free(ctx.user_id, new_parent_id, &folder.name, Some(folder.id))
            .await?;

        let old_parent_id = folder.parent_id;
        let mut changed = folder;
        changed.parent_id = new_parent_id;
        changed.path = new_path;
        let moved = self.swap(&changed).await?;
        let rewritten = self.rewrite_descendant_paths(&moved).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            new_parent = ?new_parent_id,
            descendants = rewritten,
            "Folder moved"
        );
        self.activity
            .record(
                ctx,
                ActivityAction::FolderMove,
                ResourceType::Folder,
                folder_id.into_uuid(),
                &moved.name,
                serde_json::json!({ "from": old_parent_id, "to": new_parent_id }),
            )
            .await;

        Ok(moved)
    }

    /// Deletes a folder.
    ///
    /// Without `cascade` the folder must hold no folders or files. With it,
    /// the subtree is removed depth-first: each folder's files, then the
    /// folder, children before parents.
    pub async fn delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        cascade: bool,
    ) -> AppResult<DeleteFolderOutcome> {
        let folder = self.load_owned(ctx, folder_id).await?;

        let outcome = if cascade {
            self.delete_subtree(&folder).await?
        } else {
            let child_folders = self.folders.count_children(folder_id).await?;
            let child_files = self.files.count_in_folder(folder_id).await?;
            if child_folders + child_files > 0 {
                return Err(AppError::not_empty(format!(
                    "Folder '{}' contains {child_folders} folders and {child_files} files",
                    folder.name
                )));
            }
            self.folders.delete(folder_id).await?;
            DeleteFolderOutcome {
                folders_deleted: 1,
                files_deleted: 0,
            }
        };

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            path = %folder.full_path(),
            cascade,
            folders = outcome.folders_deleted,
            files = outcome.files_deleted,
            "Folder deleted"
        );
        self.activity
            .record(
                ctx,
                ActivityAction::FolderDelete,
                ResourceType::Folder,
                folder_id.into_uuid(),
                &folder.name,
                serde_json::json!({
                    "cascade": cascade,
                    "folders_deleted": outcome.folders_deleted,
                    "files_deleted": outcome.files_deleted,
                }),
            )
            .await;

        Ok(outcome)
    }

    /// Creates the standard root folders the user does not have yet.
    pub async fn create_default_folders(&self, ctx: &RequestContext) -> AppResult<Vec<Folder>> {
        let existing: HashSet<String> = self
            .list_children(ctx, None)
            .await?
            .into_iter()
            .map(|f| f.name)
            .collect();

        let mut created = Vec::new();
        for (name, icon, color) in DEFAULT_FOLDERS {
            if existing.contains(name) {
                continue;
            }
            let folder = self
                .create_folder(
                    ctx,
                    CreateFolderRequest {
                        name: name.to_string(),
                        parent_id: None,
                        color: Some(color.to_string()),
                        icon: Some(icon.to_string()),
                    },
                )
                .await?;
            created.push(folder);
        }
        Ok(created)
    }

    async fn find(&self, folder_id: FolderId) -> AppResult<Option<Folder>> {
        read_retrying_once("find_folder", || self.folders.find_by_id(folder_id)).await
    }

    /// Loads a folder the actor must own.
    async fn load_owned(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<Folder> {
        let folder = self
            .find(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder not found: {folder_id}")))?;
        if !folder.is_owned_by(ctx.user_id) {
            return Err(AppError::unauthorized("You do not own this folder"));
        }
        Ok(folder)
    }

    async fn ensure_name_free(
        &self,
        owner: UserId,
        parent_id: Option<FolderId>,
        name: &str,
        except: Option<FolderId>,
    ) -> AppResult<()> {
        let siblings = read_retrying_once("list_sibling_folders", || {
            self.folders.find_children(owner, parent_id)
        })
        .await?;
        if siblings
            .iter()
            .any(|s| s.name == name && Some(s.id) != except)
        {
            return Err(AppError::conflict(format!(
                "A folder named '{name}' already exists here"
            )));
        }
        Ok(())
    }

    /// Rejects a move of `folder` under `target` when `target` is `folder`
    /// or one of its descendants, by walking up from `target` to the root.
    async fn ensure_not_within(&self, folder: &Folder, target: &Folder) -> AppResult<()> {
        let mut visited = HashSet::new();
        let mut current = Some(target.clone());
        while let Some(node) = current {
            if node.id == folder.id {
                return Err(AppError::invalid_operation(
                    "Cannot move a folder into one of its descendants",
                ));
            }
            if !visited.insert(node.id) {
                return Err(AppError::internal(format!(
                    "Folder hierarchy above {} contains a cycle",
                    target.id
                )));
            }
            current = match node.parent_id {
                Some(parent_id) => self.find(parent_id).await?,
                None => None,
            };
        }
        Ok(())
    }

    /// Compare-and-swap update of name, parent, and path.
    async fn swap(&self, changed: &Folder) -> AppResult<Folder> {
        if let Some(updated) = self.folders.update_if_current(changed).await? {
            return Ok(updated);
        }
        match self.find(changed.id).await? {
            Some(_) => Err(AppError::conflict(
                "Folder was modified concurrently, reload and retry",
            )),
            None => Err(AppError::not_found(format!(
                "Folder not found: {}",
                changed.id
            ))),
        }
    }

    /// Breadth-first rewrite of every descendant's path below `root`.
    ///
    /// Returns the number of folders whose path changed.
    async fn rewrite_descendant_paths(&self, root: &Folder) -> AppResult<u64> {
        let mut rewritten = 0;
        let mut visited = HashSet::from([root.id]);
        let mut queue = VecDeque::from([root.clone()]);

        while let Some(parent) = queue.pop_front() {
            let expected = parent.child_path();
            let children = read_retrying_once("list_child_folders", || {
                self.folders.find_children(parent.owner_id, Some(parent.id))
            })
            .await?;

            for mut child in children {
                if !visited.insert(child.id) {
                    continue;
                }
                if child.path != expected {
                    self.folders.update_path(child.id, &expected).await?;
                    child.path = expected.clone();
                    rewritten += 1;
                }
                queue.push_back(child);
            }
        }
        Ok(rewritten)
    }

    /// The subtree rooted at `root`, children before parents.
    async fn collect_post_order(&self, root: &Folder) -> AppResult<Vec<Folder>> {
        let mut order = Vec::new();
        let mut visited = HashSet::from([root.id]);
        let mut stack = vec![(root.clone(), false)];

        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
                continue;
            }
            let children = read_retrying_once("list_child_folders", || {
                self.folders.find_children(node.owner_id, Some(node.id))
            })
            .await?;
            stack.push((node, true));
            for child in children {
                if visited.insert(child.id) {
                    stack.push((child, false));
                }
            }
        }
        Ok(order)
    }

    async fn delete_subtree(&self, root: &Folder) -> AppResult<DeleteFolderOutcome> {
        let mut outcome = DeleteFolderOutcome {
            folders_deleted: 0,
            files_deleted: 0,
        };

        for folder in self.collect_post_order(root).await? {
            let files = read_retrying_once("list_folder_files", || {
                self.files.find_in_folder(folder.id)
            })
            .await?;
            for file in &files {
                self.deleter.delete(file).await?;
                outcome.files_deleted += 1;
            }
            self.folders.delete(folder.id).await?;
            outcome.folders_deleted += 1;
        }
        Ok(outcome)
    }
}
