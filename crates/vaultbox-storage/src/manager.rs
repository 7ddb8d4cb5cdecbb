//! Object store selection from configuration.

use std::sync::Arc;

use tracing::info;

use vaultbox_core::config::storage::{StorageConfig, StorageProviderKind};
use vaultbox_core::result::AppResult;
use vaultbox_core::traits::ObjectStore;

use crate::providers::{LocalObjectStore, MemoryObjectStore};

/// Build the configured object store.
pub async fn build_object_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.provider {
        StorageProviderKind::Local => Arc::new(
            LocalObjectStore::new(&config.local.root_path, &config.public_base_url).await?,
        ),
        StorageProviderKind::Memory => Arc::new(MemoryObjectStore::new()),
        StorageProviderKind::S3 => build_s3(config).await?,
    };

    info!(provider = store.provider_type(), "Object store ready");
    Ok(store)
}

#[cfg(feature = "s3")]
async fn build_s3(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    Ok(Arc::new(
        crate::providers::S3ObjectStore::new(&config.s3).await?,
    ))
}

#[cfg(not(feature = "s3"))]
async fn build_s3(_config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    Err(vaultbox_core::error::AppError::configuration(
        "S3 storage requires building with the `s3` feature",
    ))
}
