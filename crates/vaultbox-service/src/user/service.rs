//! Mirrors authenticated identities into the user directory.

use std::sync::Arc;

use tracing::debug;

use vaultbox_core::result::AppResult;
use vaultbox_core::retry::read_retrying_once;
use vaultbox_database::UserStore;
use vaultbox_entity::user::{UpsertUser, User};

use crate::context::RequestContext;

/// User directory operations.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish()
    }
}

impl UserService {
    /// Creates a new user service.
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Upserts the request's identity. Identities without an email are
    /// not recorded, since the directory is keyed for email lookup.
    pub async fn sync_identity(&self, ctx: &RequestContext) -> AppResult<Option<User>> {
        let Some(email) = ctx.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) else {
            debug!(user_id = %ctx.user_id, "Identity has no email, directory sync skipped");
            return Ok(None);
        };
        let user = self
            .users
            .upsert(&UpsertUser {
                id: ctx.user_id,
                email: email.to_lowercase(),
                display_name: ctx.display_name.clone(),
            })
            .await?;
        Ok(Some(user))
    }

    /// Looks up a user by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        read_retrying_once("find_user_by_email", || self.users.find_by_email(email)).await
    }

    /// The caller's directory entry, if any.
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<Option<User>> {
        read_retrying_once("find_user", || self.users.find_by_id(ctx.user_id)).await
    }
}
