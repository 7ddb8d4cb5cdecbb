//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bytes::Bytes;
use serde_json::Value;
use tower::ServiceExt;

use vaultbox_api::{AppState, build_router};
use vaultbox_auth::JwtEncoder;
use vaultbox_core::config::AppConfig;
use vaultbox_core::error::AppError;
use vaultbox_core::result::AppResult;
use vaultbox_core::types::{
    FileId, FileOrdering, FolderId, PageRequest, PageResponse, UserId,
};
use vaultbox_database::{FileFilter, FileStore, FolderScope, MemoryStore, Stores};
use vaultbox_entity::file::{CreateFile, File, TagCount};
use vaultbox_entity::folder::Folder;
use vaultbox_service::RequestContext;
use vaultbox_service::file::upload::UploadRequest;
use vaultbox_service::folder::service::CreateFolderRequest;
use vaultbox_storage::MemoryObjectStore;

/// Test application context
pub struct TestApp {
    /// Wired services
    pub state: AppState,
    /// Backing tables
    pub store: Arc<MemoryStore>,
    /// Backing object store
    pub objects: MemoryObjectStore,
    /// Switch for the record-delete failure wrapper
    pub fail_record_deletes: Arc<AtomicBool>,
    /// Issues identity tokens for HTTP tests
    pub encoder: JwtEncoder,
}

impl TestApp {
    /// Create a new test application over empty in-memory stores
    pub fn new() -> Self {
        let config = AppConfig::default();
        let store = Arc::new(MemoryStore::new());
        let objects = MemoryObjectStore::new();
        let fail_record_deletes = Arc::new(AtomicBool::new(false));

        let mut stores = Stores::from_memory(Arc::clone(&store));
        stores.files = Arc::new(FlakyFileStore {
            inner: Arc::clone(&store),
            fail_deletes: Arc::clone(&fail_record_deletes),
        });

        let encoder = JwtEncoder::new(&config.auth);
        let state = AppState::new(config, stores, Arc::new(objects.clone()))
            .expect("Failed to build app state");

        Self {
            state,
            store,
            objects,
            fail_record_deletes,
            encoder,
        }
    }

    /// The router over this app's state
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// A bearer token for `user`
    pub fn token(&self, user: UserId, email: Option<&str>) -> String {
        self.encoder
            .issue(user, email, Some("Test User"), 3600)
            .expect("Failed to issue token")
    }

    /// Create a folder
    pub async fn folder(&self, ctx: &RequestContext, name: &str, parent: Option<FolderId>) -> Folder {
        self.state
            .folder_service
            .create_folder(
                ctx,
                CreateFolderRequest {
                    name: name.to_string(),
                    parent_id: parent,
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to create folder")
    }

    /// Upload a small text file
    pub async fn upload(&self, ctx: &RequestContext, name: &str, folder: Option<FolderId>) -> File {
        self.state
            .upload_service
            .upload(
                ctx,
                UploadRequest {
                    name: name.to_string(),
                    data: Bytes::from(format!("content of {name}")),
                    mime_type: Some("text/plain".to_string()),
                    folder_id: folder,
                },
            )
            .await
            .expect("Failed to upload file")
    }

    /// Re-read a folder straight from the store
    pub async fn stored_folder(&self, id: FolderId) -> Option<Folder> {
        vaultbox_database::FolderStore::find_by_id(self.store.as_ref(), id)
            .await
            .expect("Folder lookup failed")
    }

    /// Re-read a file straight from the store
    pub async fn stored_file(&self, id: FileId) -> Option<File> {
        FileStore::find_by_id(self.store.as_ref(), id)
            .await
            .expect("File lookup failed")
    }

    /// Make an HTTP request against the router
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("Failed to build request");
        self.send(request).await
    }

    /// Send a prepared request through the router
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router()
            .oneshot(request)
            .await
            .expect("Router call failed");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            content_type,
            raw: bytes,
            body,
        }
    }
}

/// A request context for `user`
pub fn ctx(user: UserId) -> RequestContext {
    RequestContext::new(user)
}

/// A fresh user with a context
pub fn new_user() -> RequestContext {
    ctx(UserId::new())
}

/// Test response wrapper
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Raw body
    pub raw: Bytes,
    /// Parsed JSON body, `Null` when not JSON
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

/// File store whose record deletions can be made to fail.
pub struct FlakyFileStore {
    inner: Arc<MemoryStore>,
    fail_deletes: Arc<AtomicBool>,
}

#[async_trait]
impl FileStore for FlakyFileStore {
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        FileStore::find_by_id(self.inner.as_ref(), id).await
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        FileStore::create(self.inner.as_ref(), data).await
    }

    async fn list(
        &self,
        owner: UserId,
        scope: FolderScope,
        filter: &FileFilter,
        page: PageRequest,
        ordering: FileOrdering,
    ) -> AppResult<PageResponse<File>> {
        FileStore::list(self.inner.as_ref(), owner, scope, filter, page, ordering).await
    }

    async fn find_in_folder(&self, folder: FolderId) -> AppResult<Vec<File>> {
        FileStore::find_in_folder(self.inner.as_ref(), folder).await
    }

    async fn count_in_folder(&self, folder: FolderId) -> AppResult<u64> {
        FileStore::count_in_folder(self.inner.as_ref(), folder).await
    }

    async fn update_folder(&self, id: FileId, folder: Option<FolderId>) -> AppResult<Option<File>> {
        FileStore::update_folder(self.inner.as_ref(), id, folder).await
    }

    async fn update_tags(&self, id: FileId, tags: &[String]) -> AppResult<Option<File>> {
        FileStore::update_tags(self.inner.as_ref(), id, tags).await
    }

    async fn delete(&self, id: FileId) -> AppResult<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::external_store("record delete failed"));
        }
        FileStore::delete(self.inner.as_ref(), id).await
    }

    async fn tag_counts(&self, owner: UserId) -> AppResult<Vec<TagCount>> {
        FileStore::tag_counts(self.inner.as_ref(), owner).await
    }

    async fn scan_after(&self, cursor: Option<FileId>, limit: u32) -> AppResult<Vec<File>> {
        FileStore::scan_after(self.inner.as_ref(), cursor, limit).await
    }
}
