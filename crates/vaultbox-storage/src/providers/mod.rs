//! Object store provider implementations.

pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;
#[cfg(feature = "s3")]
pub use s3::S3ObjectStore;

use uuid::Uuid;

/// Generate a fresh object key sharded by its last two hex characters.
pub(crate) fn new_object_key() -> String {
    let id = Uuid::now_v7().simple().to_string();
    // v7 ids share a timestamp prefix, so shard on the random tail.
    let shard = &id[id.len() - 2..];
    format!("{shard}/{id}")
}

/// Reject keys that could escape the provider namespace.
pub(crate) fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('/')
        && key
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}
