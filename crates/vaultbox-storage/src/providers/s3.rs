//! S3-compatible object store (requires the `s3` feature).

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{debug, info};

use vaultbox_core::config::storage::S3StorageConfig;
use vaultbox_core::error::{AppError, ErrorKind};
use vaultbox_core::result::AppResult;
use vaultbox_core::traits::ObjectStore;
use vaultbox_core::types::{ObjectRef, UrlMode};

use super::new_object_key;

/// Object store backed by an S3-compatible bucket.
///
/// Credentials come from the standard AWS environment chain.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    prefix: String,
    presign_expiry: Duration,
}

impl S3ObjectStore {
    /// Build a client from configuration.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("storage.s3.bucket must be set"));
        }

        let mut loader = aws_config::from_env().region(Region::new(config.region.clone()));
        if !config.endpoint.is_empty() {
            loader = loader.endpoint_url(&config.endpoint);
        }
        let aws_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(!config.endpoint.is_empty())
            .build();

        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initializing S3 object store"
        );

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            prefix: config.prefix.trim_matches('/').to_string(),
            presign_expiry: Duration::from_secs(config.presign_expiry_seconds),
        })
    }

    /// Bucket key for an object handle.
    fn key(&self, object: &ObjectRef) -> String {
        if self.prefix.is_empty() {
            object.as_str().to_string()
        } else {
            format!("{}/{}", self.prefix, object)
        }
    }
}

fn s3_error(message: String, err: impl std::error::Error + Send + Sync + 'static) -> AppError {
    AppError::with_source(ErrorKind::ExternalStore, message, err)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok())
    }

    async fn put(&self, data: Bytes, content_type: &str) -> AppResult<ObjectRef> {
        let object = ObjectRef::new(new_object_key());
        let len = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.key(&object))
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| s3_error(format!("Failed to upload object: {object}"), e))?;

        debug!(key = %object, bytes = len, "Stored object in S3");
        Ok(object)
    }

    async fn get(&self, object: &ObjectRef) -> AppResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.key(object))
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    AppError::not_found(format!("Object not found: {object}"))
                } else {
                    s3_error(format!("Failed to read object: {object}"), service_error)
                }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| s3_error(format!("Failed to read object body: {object}"), e))?;
        Ok(data.into_bytes())
    }

    async fn delete(&self, object: &ObjectRef) -> AppResult<()> {
        // S3 reports success for absent keys.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(self.key(object))
            .send()
            .await
            .map_err(|e| s3_error(format!("Failed to delete object: {object}"), e))?;
        Ok(())
    }

    async fn exists(&self, object: &ObjectRef) -> AppResult<bool> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(self.key(object))
            .send()
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(s3_error(
                        format!("Failed to stat object: {object}"),
                        service_error,
                    ))
                }
            }
        }
    }

    async fn url_for(&self, object: &ObjectRef, mode: UrlMode) -> AppResult<String> {
        let presigning = PresigningConfig::expires_in(self.presign_expiry)
            .map_err(|e| s3_error("Invalid presign expiry".to_string(), e))?;

        let mut request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.key(object));
        if mode == UrlMode::Download {
            request = request.response_content_disposition("attachment");
        }

        let presigned = request
            .presigned(presigning)
            .await
            .map_err(|e| s3_error(format!("Failed to presign object: {object}"), e))?;
        Ok(presigned.uri().to_string())
    }
}
