//! Local filesystem object store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use vaultbox_core::error::{AppError, ErrorKind};
use vaultbox_core::result::AppResult;
use vaultbox_core::traits::ObjectStore;
use vaultbox_core::types::{ObjectRef, UrlMode};

use super::{is_valid_key, new_object_key};

/// Object store backed by a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    /// Root directory for all stored objects.
    root: PathBuf,
    /// Base URL objects are served from.
    public_base_url: String,
}

impl LocalObjectStore {
    /// Create a new local object store rooted at the given path.
    pub async fn new(root_path: &str, public_base_url: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalStore,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve an object handle to an absolute path within the root.
    fn resolve(&self, object: &ObjectRef) -> AppResult<PathBuf> {
        if !is_valid_key(object.as_str()) {
            return Err(AppError::validation(format!(
                "Invalid object key: {object}"
            )));
        }
        Ok(self.root.join(object.as_str()))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalStore,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn put(&self, data: Bytes, content_type: &str) -> AppResult<ObjectRef> {
        let object = ObjectRef::new(new_object_key());
        let full_path = self.resolve(&object)?;
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalStore,
                format!("Failed to write object: {object}"),
                e,
            )
        })?;

        debug!(key = %object, bytes = data.len(), content_type, "Stored object");
        Ok(object)
    }

    async fn get(&self, object: &ObjectRef) -> AppResult<Bytes> {
        let full_path = self.resolve(object)?;
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {object}"))
            } else {
                AppError::with_source(
                    ErrorKind::ExternalStore,
                    format!("Failed to read object: {object}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, object: &ObjectRef) -> AppResult<()> {
        let full_path = self.resolve(object)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(key = %object, "Deleted object");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::ExternalStore,
                format!("Failed to delete object: {object}"),
                e,
            )),
        }
    }

    async fn exists(&self, object: &ObjectRef) -> AppResult<bool> {
        let full_path = self.resolve(object)?;
        fs::try_exists(&full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalStore,
                format!("Failed to stat object: {object}"),
                e,
            )
        })
    }

    async fn url_for(&self, object: &ObjectRef, mode: UrlMode) -> AppResult<String> {
        self.resolve(object)?;
        let base = format!("{}/{}", self.public_base_url, object);
        Ok(match mode {
            UrlMode::View => base,
            UrlMode::Download => format!("{base}?download=1"),
        })
    }
}
