//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use vaultbox_auth::{AccessResolver, JwtDecoder};
use vaultbox_core::config::AppConfig;
use vaultbox_core::result::AppResult;
use vaultbox_core::traits::ObjectStore;
use vaultbox_database::Stores;
use vaultbox_service::file::FileDeleter;
use vaultbox_service::{
    ActivityLogger, ActivityService, ContentService, FileService, FolderService, LinkService,
    SearchService, ShareService, TagService, TreeService, UploadService, UserService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Binary object store
    pub objects: Arc<dyn ObjectStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// Identity token decoder
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Folder service
    pub folder_service: FolderService,
    /// Folder tree and breadcrumbs
    pub tree_service: TreeService,
    /// File record service
    pub file_service: FileService,
    /// Upload service
    pub upload_service: UploadService,
    /// File search
    pub search_service: SearchService,
    /// Tag vocabulary
    pub tag_service: TagService,
    /// Access-checked content
    pub content_service: ContentService,
    /// Share links
    pub link_service: LinkService,
    /// User shares
    pub share_service: ShareService,
    /// Activity log
    pub activity_service: ActivityService,
    /// User directory
    pub user_service: UserService,
}

impl AppState {
    /// Wire every service over the given stores and object store.
    pub fn new(
        config: AppConfig,
        stores: Stores,
        objects: Arc<dyn ObjectStore>,
    ) -> AppResult<Self> {
        let activity = ActivityLogger::new(Arc::clone(&stores.activities));
        let resolver = AccessResolver::new(
            Arc::clone(&stores.files),
            Arc::clone(&stores.user_shares),
            Arc::clone(&stores.links),
        );
        let deleter = FileDeleter::new(
            Arc::clone(&stores.files),
            Arc::clone(&stores.links),
            Arc::clone(&stores.user_shares),
            Arc::clone(&objects),
        );

        let folder_service = FolderService::new(
            Arc::clone(&stores.folders),
            Arc::clone(&stores.files),
            deleter.clone(),
            activity.clone(),
        );
        let tree_service = TreeService::new(Arc::clone(&stores.folders));
        let file_service = FileService::new(
            Arc::clone(&stores.files),
            Arc::clone(&stores.folders),
            deleter,
            activity.clone(),
        );
        let upload_service = UploadService::new(
            Arc::clone(&objects),
            file_service.clone(),
            config.storage.max_upload_bytes,
        );
        let search_service = SearchService::new(
            Arc::clone(&stores.files),
            file_service.clone(),
            tree_service.clone(),
        );
        let tag_service = TagService::new(Arc::clone(&stores.files));
        let content_service = ContentService::new(
            resolver.clone(),
            Arc::clone(&objects),
            Arc::clone(&stores.links),
            activity.clone(),
        );
        let link_service = LinkService::new(
            Arc::clone(&stores.files),
            Arc::clone(&stores.links),
            resolver,
            activity.clone(),
            &config.share,
        )?;
        let share_service = ShareService::new(
            Arc::clone(&stores.files),
            Arc::clone(&stores.user_shares),
            Arc::clone(&stores.users),
            activity,
        );
        let activity_service = ActivityService::new(Arc::clone(&stores.activities));
        let user_service = UserService::new(Arc::clone(&stores.users));

        Ok(Self {
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            config: Arc::new(config),
            objects,
            folder_service,
            tree_service,
            file_service,
            upload_service,
            search_service,
            tag_service,
            content_service,
            link_service,
            share_service,
            activity_service,
            user_service,
        })
    }
}
