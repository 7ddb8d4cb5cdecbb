//! Core trait definitions implemented by other crates.

pub mod object_store;

pub use object_store::ObjectStore;
