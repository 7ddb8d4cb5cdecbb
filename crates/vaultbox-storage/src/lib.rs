//! # vaultbox-storage
//!
//! Object store providers for file binaries. Every provider implements
//! [`vaultbox_core::traits::ObjectStore`]; [`build_object_store`] picks one
//! from configuration.

pub mod manager;
pub mod providers;

pub use manager::build_object_store;
pub use providers::{LocalObjectStore, MemoryObjectStore};
