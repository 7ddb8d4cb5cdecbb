//! Access-checked file content and URLs.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, warn};

use vaultbox_auth::{AccessDecision, AccessResolver, LinkCredentials};
use vaultbox_core::error::AppError;
use vaultbox_core::result::AppResult;
use vaultbox_core::retry::read_retrying_once;
use vaultbox_core::traits::ObjectStore;
use vaultbox_core::types::{FileId, UrlMode};
use vaultbox_database::ShareLinkStore;
use vaultbox_entity::activity::{ActivityAction, ResourceType};
use vaultbox_entity::file::File;
use vaultbox_entity::permission::Permission;
use vaultbox_entity::share::LinkUse;

use crate::activity::ActivityLogger;
use crate::context::RequestContext;

/// A resolved URL for a file.
#[derive(Debug, Clone, Serialize)]
pub struct FileUrl {
    /// The file.
    pub file_id: FileId,
    /// File name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// View or download.
    pub mode: UrlMode,
    /// URL from the object store.
    pub url: String,
}

/// Serves file content to owners, share recipients, and link holders.
#[derive(Clone)]
pub struct ContentService {
    resolver: AccessResolver,
    objects: Arc<dyn ObjectStore>,
    links: Arc<dyn ShareLinkStore>,
    activity: ActivityLogger,
}

impl std::fmt::Debug for ContentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentService")
            .field("objects", &self.objects.provider_type())
            .finish()
    }
}

impl ContentService {
    /// Creates a new content service.
    pub fn new(
        resolver: AccessResolver,
        objects: Arc<dyn ObjectStore>,
        links: Arc<dyn ShareLinkStore>,
        activity: ActivityLogger,
    ) -> Self {
        Self {
            resolver,
            objects,
            links,
            activity,
        }
    }

    /// Resolves what the requester may do with a file.
    pub async fn check_access(
        &self,
        ctx: Option<&RequestContext>,
        file_id: FileId,
        link: Option<&LinkCredentials>,
    ) -> AppResult<AccessDecision> {
        let (_, decision) = self
            .resolver
            .resolve(file_id, ctx.map(|c| c.user_id), link)
            .await?;
        Ok(decision)
    }

    /// A URL for viewing or downloading a file.
    pub async fn file_url(
        &self,
        ctx: Option<&RequestContext>,
        file_id: FileId,
        mode: UrlMode,
        link: Option<&LinkCredentials>,
    ) -> AppResult<FileUrl> {
        let (file, decision) = self.authorize(ctx, file_id, mode, link).await?;
        let url = self.objects.url_for(&file.object_ref, mode).await?;
        self.account(ctx, &file, &decision, mode).await;

        Ok(FileUrl {
            file_id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            mode,
            url,
        })
    }

    /// Reads a file's content.
    pub async fn read_content(
        &self,
        ctx: Option<&RequestContext>,
        file_id: FileId,
        mode: UrlMode,
        link: Option<&LinkCredentials>,
    ) -> AppResult<(File, Bytes)> {
        let (file, decision) = self.authorize(ctx, file_id, mode, link).await?;
        let data = read_retrying_once("get_object", || self.objects.get(&file.object_ref)).await?;
        self.account(ctx, &file, &decision, mode).await;
        Ok((file, data))
    }

    /// Content of the file a link points at.
    pub async fn read_link_content(
        &self,
        link: &LinkCredentials,
        mode: UrlMode,
    ) -> AppResult<(File, Bytes)> {
        let share = self
            .resolver
            .validate_link(&link.token, link.password.as_deref())
            .await?;
        self.read_content(None, share.file_id, mode, Some(link)).await
    }

    async fn authorize(
        &self,
        ctx: Option<&RequestContext>,
        file_id: FileId,
        mode: UrlMode,
        link: Option<&LinkCredentials>,
    ) -> AppResult<(File, AccessDecision)> {
        let (file, decision) = self
            .resolver
            .resolve(file_id, ctx.map(|c| c.user_id), link)
            .await?;

        let required = match mode {
            UrlMode::View => Permission::View,
            UrlMode::Download => Permission::Download,
        };
        if !decision.allowed || !decision.permissions.contains(required) {
            debug!(file_id = %file_id, mode = ?mode, source = ?decision.source, "Content access denied");
            return Err(AppError::unauthorized(format!(
                "You do not have {} permission on this file",
                match mode {
                    UrlMode::View => "view",
                    UrlMode::Download => "download",
                }
            )));
        }
        Ok((file, decision))
    }

    async fn account(
        &self,
        ctx: Option<&RequestContext>,
        file: &File,
        decision: &AccessDecision,
        mode: UrlMode,
    ) {
        if let Some(link) = &decision.link {
            let usage = match mode {
                UrlMode::View => LinkUse::View,
                UrlMode::Download => LinkUse::Download,
            };
            if let Err(e) = self.links.record_use(link.id, usage).await {
                warn!(link_id = %link.id, error = %e, "Failed to record link use");
            }
            let metadata = serde_json::json!({ "link_id": link.id, "mode": usage });
            match ctx {
                Some(ctx) => {
                    self.activity
                        .record(
                            ctx,
                            ActivityAction::ShareAccess,
                            ResourceType::ShareLink,
                            link.id.into_uuid(),
                            &file.name,
                            metadata,
                        )
                        .await
                }
                None => {
                    self.activity
                        .record_for(
                            link.owner_id,
                            ActivityAction::ShareAccess,
                            ResourceType::ShareLink,
                            link.id.into_uuid(),
                            &file.name,
                            metadata,
                        )
                        .await
                }
            }
            return;
        }

        if let (Some(ctx), UrlMode::Download) = (ctx, mode) {
            self.activity
                .record(
                    ctx,
                    ActivityAction::FileDownload,
                    ResourceType::File,
                    file.id.into_uuid(),
                    &file.name,
                    serde_json::json!({ "source": decision.source }),
                )
                .await;
        }
    }
}
