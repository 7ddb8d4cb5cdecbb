//! Core type definitions used across the Vaultbox workspace.

pub mod id;
pub mod object;
pub mod pagination;
pub mod sorting;

pub use id::*;
pub use object::{ObjectRef, UrlMode};
pub use pagination::{PageRequest, PageResponse};
pub use sorting::{FileOrdering, FileSortKey, SortDirection};
