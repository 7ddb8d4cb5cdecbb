//! Object store trait for pluggable binary storage backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;
use crate::types::{ObjectRef, UrlMode};

/// Trait for binary object storage backends.
///
/// Implementations exist for the local filesystem, memory, and S3. The trait
/// is defined here in `vaultbox-core` and implemented in `vaultbox-storage`.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store a new object and return its handle.
    async fn put(&self, data: Bytes, content_type: &str) -> AppResult<ObjectRef>;

    /// Read an object. Fails with `NotFound` when the object is absent.
    async fn get(&self, object: &ObjectRef) -> AppResult<Bytes>;

    /// Delete an object. Deleting an absent object succeeds.
    async fn delete(&self, object: &ObjectRef) -> AppResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, object: &ObjectRef) -> AppResult<bool>;

    /// Produce a URL the client can fetch the object from.
    async fn url_for(&self, object: &ObjectRef, mode: UrlMode) -> AppResult<String>;
}
