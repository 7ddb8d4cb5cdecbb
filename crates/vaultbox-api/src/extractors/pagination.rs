//! Pagination and ordering query parameter extractors.

use serde::{Deserialize, Serialize};

use vaultbox_core::types::{FileOrdering, FileSortKey, PageRequest, SortDirection};

/// Query parameters for paginated endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Items to skip (default: 0).
    #[serde(default)]
    pub offset: u64,
    /// Items per page (default: 25, max: 100).
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    25
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: default_limit(),
        }
    }
}

impl PaginationParams {
    /// Converts to a `PageRequest`.
    pub fn into_page_request(self) -> PageRequest {
        PageRequest::new(self.offset, self.limit)
    }
}

/// Ordering of file listings: `?sort=name&direction=asc`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SortParams {
    /// Sort key: `created_at`, `name` or `size`.
    #[serde(default)]
    pub sort: FileSortKey,
    /// `asc` or `desc` (default).
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortParams {
    /// Converts to a `FileOrdering`.
    pub fn into_ordering(self) -> FileOrdering {
        FileOrdering::new(self.sort, self.direction)
    }
}
