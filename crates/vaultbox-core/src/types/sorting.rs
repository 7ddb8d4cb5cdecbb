//! Sorting types for list endpoints.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    #[default]
    Desc,
}

impl SortDirection {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Apply the direction to an ascending comparison result.
    pub fn apply(&self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Keys a file listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileSortKey {
    /// Creation time.
    #[default]
    CreatedAt,
    /// File name.
    Name,
    /// Size in bytes.
    Size,
}

impl FileSortKey {
    /// Return the column backing this key.
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Name => "name",
            Self::Size => "size_bytes",
        }
    }
}

/// A file ordering: key plus direction. Ties are always broken by id in the
/// same direction so pages are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileOrdering {
    /// Key to order by.
    #[serde(default)]
    pub key: FileSortKey,
    /// Direction to order in.
    #[serde(default)]
    pub direction: SortDirection,
}

impl FileOrdering {
    /// Create a new ordering.
    pub fn new(key: FileSortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Render an `ORDER BY` clause body.
    pub fn as_sql(&self) -> String {
        let dir = self.direction.as_sql();
        format!("{} {dir}, id {dir}", self.key.column())
    }
}
