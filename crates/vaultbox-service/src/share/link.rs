//! Share link lifecycle: create, validate, list, revoke, sweep.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vaultbox_auth::{AccessResolver, LinkPasswordHasher};
use vaultbox_core::config::ShareConfig;
use vaultbox_core::error::AppError;
use vaultbox_core::result::AppResult;
use vaultbox_core::retry::read_retrying_once;
use vaultbox_core::types::{FileId, ShareLinkId};
use vaultbox_database::{FileStore, ShareLinkStore};
use vaultbox_entity::activity::{ActivityAction, ResourceType};
use vaultbox_entity::permission::GrantPermission;
use vaultbox_entity::share::{CreateShareLink, ShareLink};

use super::token::TokenGenerator;
use crate::activity::ActivityLogger;
use crate::context::RequestContext;

/// Longest expiry a link may be created with.
pub const MAX_EXPIRY_DAYS: u32 = 365;

/// Request to create a share link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateLinkRequest {
    /// Optional password; blank counts as none.
    pub password: Option<String>,
    /// Days until expiry; `None` never expires.
    pub expires_in_days: Option<u32>,
    /// Granted permissions; `None` uses the configured default.
    pub permissions: Option<Vec<String>>,
}

/// Manages public share links.
#[derive(Clone)]
pub struct LinkService {
    files: Arc<dyn FileStore>,
    links: Arc<dyn ShareLinkStore>,
    resolver: AccessResolver,
    activity: ActivityLogger,
    hasher: LinkPasswordHasher,
    tokens: TokenGenerator,
    max_attempts: u32,
    default_permissions: Vec<GrantPermission>,
}

impl std::fmt::Debug for LinkService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkService")
            .field("token_length", &self.tokens.length())
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// Fails with a configuration error when the default permissions are
    /// not a valid grant set.
    pub fn new(
        files: Arc<dyn FileStore>,
        links: Arc<dyn ShareLinkStore>,
        resolver: AccessResolver,
        activity: ActivityLogger,
        config: &ShareConfig,
    ) -> AppResult<Self> {
        let default_permissions = GrantPermission::parse_set(&config.default_permissions)
            .map_err(|e| {
                AppError::configuration(format!("Invalid share.default_permissions: {}", e.message))
            })?;
        Ok(Self {
            files,
            links,
            resolver,
            activity,
            hasher: LinkPasswordHasher::new(),
            tokens: TokenGenerator::new(config.effective_token_length()),
            max_attempts: config.token_max_attempts.max(1),
            default_permissions,
        })
    }

    /// Replace the token generator.
    pub fn with_token_generator(mut self, tokens: TokenGenerator) -> Self {
        self.tokens = tokens;
        self
    }

    /// Creates a link on one of the caller's files.
    pub async fn create_link(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        req: CreateLinkRequest,
    ) -> AppResult<ShareLink> {
        let file = read_retrying_once("find_file", || self.files.find_by_id(file_id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_id}")))?;
        if !file.is_owned_by(ctx.user_id) {
            return Err(AppError::unauthorized("Only the owner can share this file"));
        }

        let permissions = match &req.permissions {
            Some(raw) => GrantPermission::parse_set(raw)?,
            None => self.default_permissions.clone(),
        };
        let expires_at = match req.expires_in_days {
            Some(days) if days == 0 || days > MAX_EXPIRY_DAYS => {
                return Err(AppError::validation(format!(
                    "Expiry must be between 1 and {MAX_EXPIRY_DAYS} days"
                )));
            }
            Some(days) => Some(Utc::now() + Duration::days(i64::from(days))),
            None => None,
        };
        let password_hash = match req.password.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(password) => Some(self.hasher.seal(password)?),
            None => None,
        };
        let token = self.unique_token().await?;

        let link = self
            .links
            .create(&CreateShareLink {
                file_id,
                owner_id: ctx.user_id,
                token,
                password_hash,
                expires_at,
                permissions,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            link_id = %link.id,
            protected = link.has_password(),
            "Share link created"
        );
        self.activity
            .record(
                ctx,
                ActivityAction::FileShare,
                ResourceType::File,
                file.id.into_uuid(),
                &file.name,
                serde_json::json!({
                    "link_id": link.id,
                    "permissions": link.permissions,
                    "expires_at": link.expires_at,
                    "protected": link.has_password(),
                }),
            )
            .await;

        Ok(link)
    }

    /// Validates a token and password, returning the live link.
    pub async fn validate_access(&self, token: &str, password: Option<&str>) -> AppResult<ShareLink> {
        self.resolver.validate_link(token, password).await
    }

    /// Revokes a link by deleting it.
    pub async fn revoke(&self, ctx: &RequestContext, link_id: ShareLinkId) -> AppResult<()> {
        let link = read_retrying_once("find_link", || self.links.find_by_id(link_id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Share link not found: {link_id}")))?;
        if link.owner_id != ctx.user_id {
            return Err(AppError::unauthorized("Only the owner can revoke this link"));
        }

        self.links.delete(link_id).await?;

        info!(user_id = %ctx.user_id, link_id = %link_id, "Share link revoked");
        self.activity
            .record(
                ctx,
                ActivityAction::ShareRevoke,
                ResourceType::ShareLink,
                link_id.into_uuid(),
                "",
                serde_json::json!({ "file_id": link.file_id }),
            )
            .await;
        Ok(())
    }

    /// The caller's unexpired links, optionally for one file.
    pub async fn list_active(
        &self,
        ctx: &RequestContext,
        file_id: Option<FileId>,
    ) -> AppResult<Vec<ShareLink>> {
        let now = Utc::now();
        let links = read_retrying_once("list_links", || {
            self.links.list_by_owner(ctx.user_id, file_id)
        })
        .await?;
        Ok(links.into_iter().filter(|l| !l.is_expired_at(now)).collect())
    }

    /// Physically deletes expired links. Returns the number removed.
    pub async fn sweep_expired(&self) -> AppResult<u64> {
        let removed = self.links.delete_expired(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "Expired share links swept");
        }
        Ok(removed)
    }

    async fn unique_token(&self) -> AppResult<String> {
        for attempt in 1..=self.max_attempts {
            let token = self.tokens.generate();
            let taken =
                read_retrying_once("token_exists", || self.links.token_exists(&token)).await?;
            if !taken {
                return Ok(token);
            }
            warn!(attempt, "Share token collision");
        }
        Err(AppError::token_generation_exhausted(format!(
            "No unique share token after {} attempts",
            self.max_attempts
        )))
    }
}
