//! In-process object store used by tests and the `memory` provider.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use vaultbox_core::error::AppError;
use vaultbox_core::result::AppResult;
use vaultbox_core::traits::ObjectStore;
use vaultbox_core::types::{ObjectRef, UrlMode};

use super::new_object_key;

/// Object store that keeps binaries in a map.
///
/// Cloning shares the underlying map. Failure injection lets tests simulate
/// an unavailable backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, Bytes>>>,
    fail_writes: Arc<AtomicBool>,
    fail_deletes: Arc<AtomicBool>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail with an external store error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `delete` fail with an external store error.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, data: Bytes, _content_type: &str) -> AppResult<ObjectRef> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::external_store("Object store unavailable"));
        }
        let key = new_object_key();
        self.objects.write().await.insert(key.clone(), data);
        Ok(ObjectRef::new(key))
    }

    async fn get(&self, object: &ObjectRef) -> AppResult<Bytes> {
        self.objects
            .read()
            .await
            .get(object.as_str())
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Object not found: {object}")))
    }

    async fn delete(&self, object: &ObjectRef) -> AppResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::external_store("Object store unavailable"));
        }
        self.objects.write().await.remove(object.as_str());
        Ok(())
    }

    async fn exists(&self, object: &ObjectRef) -> AppResult<bool> {
        Ok(self.objects.read().await.contains_key(object.as_str()))
    }

    async fn url_for(&self, object: &ObjectRef, mode: UrlMode) -> AppResult<String> {
        let mode = match mode {
            UrlMode::View => "view",
            UrlMode::Download => "download",
        };
        Ok(format!("memory://{object}?mode={mode}"))
    }
}
