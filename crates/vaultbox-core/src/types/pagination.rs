//! Offset/limit pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_LIMIT: u64 = 25;
/// Maximum page size.
const MAX_LIMIT: u64 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Number of items to skip.
    #[serde(default)]
    pub offset: u64,
    /// Maximum number of items to return.
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl PageRequest {
    /// Create a new page request, clamping the limit to `1..=100`.
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Return the SQL `OFFSET` value.
    pub fn offset_i64(&self) -> i64 {
        i64::try_from(self.offset).unwrap_or(i64::MAX)
    }

    /// Return the SQL `LIMIT` value.
    pub fn limit_i64(&self) -> i64 {
        i64::try_from(self.limit.clamp(1, MAX_LIMIT)).unwrap_or(DEFAULT_LIMIT as i64)
    }

    /// Apply this window to an already ordered vector.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit.clamp(1, MAX_LIMIT)).unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(limit).collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    /// The items in this window.
    pub items: Vec<T>,
    /// Offset the window starts at.
    pub offset: u64,
    /// Requested window size.
    pub limit: u64,
    /// Total number of matching items.
    pub total: u64,
    /// Whether more items exist after this window.
    pub has_more: bool,
}

impl<T: Serialize> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, page: PageRequest, total: u64) -> Self {
        let has_more = page.offset + (items.len() as u64) < total;
        Self {
            items,
            offset: page.offset,
            limit: page.limit,
            total,
            has_more,
        }
    }

    /// Create an empty response.
    pub fn empty(page: PageRequest) -> Self {
        Self::new(Vec::new(), page, 0)
    }

    /// Transform the items while keeping the window metadata.
    pub fn map<U: Serialize>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            offset: self.offset,
            limit: self.limit,
            total: self.total,
            has_more: self.has_more,
        }
    }
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}
