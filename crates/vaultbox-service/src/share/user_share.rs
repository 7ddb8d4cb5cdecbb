//! Direct user-to-user file shares.

use std::sync::Arc;

use tracing::{info, warn};

use vaultbox_core::error::AppError;
use vaultbox_core::result::AppResult;
use vaultbox_core::retry::read_retrying_once;
use vaultbox_core::types::{FileId, UserId, UserShareId};
use vaultbox_database::{FileStore, UserShareStore, UserStore};
use vaultbox_entity::activity::{ActivityAction, ResourceType};
use vaultbox_entity::file::File;
use vaultbox_entity::permission::GrantPermission;
use vaultbox_entity::share::{SharedFile, UpsertUserShare, UserShare};

use crate::activity::ActivityLogger;
use crate::context::RequestContext;

/// Manages shares between users.
#[derive(Clone)]
pub struct ShareService {
    files: Arc<dyn FileStore>,
    user_shares: Arc<dyn UserShareStore>,
    users: Arc<dyn UserStore>,
    activity: ActivityLogger,
}

impl std::fmt::Debug for ShareService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareService").finish()
    }
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        files: Arc<dyn FileStore>,
        user_shares: Arc<dyn UserShareStore>,
        users: Arc<dyn UserStore>,
        activity: ActivityLogger,
    ) -> Self {
        Self {
            files,
            user_shares,
            users,
            activity,
        }
    }

    /// Shares a file with another user, or updates the existing share.
    pub async fn share_with_user<S: AsRef<str>>(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        recipient: UserId,
        permissions: &[S],
    ) -> AppResult<UserShare> {
        let file = self.owned_file(ctx, file_id).await?;
        if recipient == ctx.user_id {
            return Err(AppError::invalid_operation("You cannot share a file with yourself"));
        }
        let permissions = GrantPermission::parse_set(permissions)?;

        let share = self
            .user_shares
            .upsert(&UpsertUserShare {
                file_id,
                owner_id: ctx.user_id,
                shared_with_id: recipient,
                permissions,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            shared_with = %recipient,
            "File shared with user"
        );
        self.activity
            .record(
                ctx,
                ActivityAction::FileShare,
                ResourceType::File,
                file.id.into_uuid(),
                &file.name,
                serde_json::json!({
                    "share_id": share.id,
                    "shared_with": recipient,
                    "permissions": share.permissions,
                }),
            )
            .await;

        Ok(share)
    }

    /// Shares a file with the user registered under `email`.
    pub async fn share_with_email<S: AsRef<str>>(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        email: &str,
        permissions: &[S],
    ) -> AppResult<UserShare> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::validation("Email must not be empty"));
        }
        let user = read_retrying_once("find_user_by_email", || self.users.find_by_email(&email))
            .await?
            .ok_or_else(|| AppError::not_found(format!("No user with email {email}")))?;
        self.share_with_user(ctx, file_id, user.id, permissions).await
    }

    /// All shares of one of the caller's files.
    pub async fn file_shares(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<Vec<UserShare>> {
        self.owned_file(ctx, file_id).await?;
        read_retrying_once("list_user_shares", || self.user_shares.list_by_file(file_id)).await
    }

    /// Removes a share the caller issued.
    pub async fn remove_share(&self, ctx: &RequestContext, share_id: UserShareId) -> AppResult<()> {
        let share = read_retrying_once("find_user_share", || self.user_shares.find_by_id(share_id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Share not found: {share_id}")))?;
        if share.owner_id != ctx.user_id {
            return Err(AppError::unauthorized("Only the owner can remove this share"));
        }

        self.user_shares.delete(share_id).await?;

        info!(user_id = %ctx.user_id, share_id = %share_id, "User share removed");
        self.activity
            .record(
                ctx,
                ActivityAction::ShareRevoke,
                ResourceType::UserShare,
                share_id.into_uuid(),
                "",
                serde_json::json!({ "file_id": share.file_id, "shared_with": share.shared_with_id }),
            )
            .await;
        Ok(())
    }

    /// Files other users shared with the caller.
    ///
    /// Shares whose file no longer exists are skipped.
    pub async fn shared_with_me(&self, ctx: &RequestContext) -> AppResult<Vec<SharedFile>> {
        let shares = read_retrying_once("list_shared_with", || {
            self.user_shares.list_shared_with(ctx.user_id)
        })
        .await?;

        let mut shared = Vec::with_capacity(shares.len());
        for share in shares {
            let Some(file) =
                read_retrying_once("find_file", || self.files.find_by_id(share.file_id)).await?
            else {
                warn!(share_id = %share.id, file_id = %share.file_id, "Shared file no longer exists");
                continue;
            };
            let owner_name = match self.users.find_by_id(share.owner_id).await {
                Ok(user) => user.map(|u| u.label().to_string()),
                Err(e) => {
                    warn!(user_id = %share.owner_id, error = %e, "Failed to resolve share owner");
                    None
                }
            };
            shared.push(SharedFile {
                file,
                share,
                owner_name,
            });
        }
        Ok(shared)
    }

    async fn owned_file(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<File> {
        let file = read_retrying_once("find_file", || self.files.find_by_id(file_id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_id}")))?;
        if !file.is_owned_by(ctx.user_id) {
            return Err(AppError::unauthorized("Only the owner can manage shares of this file"));
        }
        Ok(file)
    }
}
