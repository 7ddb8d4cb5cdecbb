//! Object storage configuration.

use serde::{Deserialize, Serialize};

/// Which object store holds file binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderKind {
    /// Local filesystem directory.
    #[default]
    Local,
    /// Process memory, lost on restart.
    Memory,
    /// S3-compatible bucket (requires the `s3` feature).
    S3,
}

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Provider to use.
    #[serde(default)]
    pub provider: StorageProviderKind,
    /// Maximum upload size in bytes (default 50 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: u64,
    /// Base URL objects are served from when the provider cannot sign URLs.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Local filesystem storage configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
    /// S3-compatible storage configuration.
    #[serde(default)]
    pub s3: S3StorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProviderKind::default(),
            max_upload_bytes: default_max_upload(),
            public_base_url: default_public_base_url(),
            local: LocalStorageConfig::default(),
            s3: S3StorageConfig::default(),
        }
    }
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root path for local object storage.
    #[serde(default = "default_local_root")]
    pub root_path: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3StorageConfig {
    /// S3 endpoint URL (for non-AWS services like MinIO).
    #[serde(default)]
    pub endpoint: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// S3 bucket name.
    #[serde(default)]
    pub bucket: String,
    /// Key prefix all objects are written under.
    #[serde(default)]
    pub prefix: String,
    /// Lifetime of presigned URLs in seconds.
    #[serde(default = "default_presign_expiry")]
    pub presign_expiry_seconds: u64,
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: default_region(),
            bucket: String::new(),
            prefix: String::new(),
            presign_expiry_seconds: default_presign_expiry(),
        }
    }
}

fn default_max_upload() -> u64 {
    52_428_800 // 50 MB
}

fn default_public_base_url() -> String {
    "http://localhost:8080/objects".to_string()
}

fn default_local_root() -> String {
    "./data/objects".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_presign_expiry() -> u64 {
    3600
}
