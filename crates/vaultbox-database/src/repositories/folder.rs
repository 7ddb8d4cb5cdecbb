//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use vaultbox_core::error::{AppError, ErrorKind};
use vaultbox_core::result::AppResult;
use vaultbox_core::types::{FolderId, UserId};
use vaultbox_entity::folder::{CreateFolder, Folder};

use crate::store::FolderStore;

/// Repository for folder CRUD and tree queries.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to find folder", e))
    }

    async fn find_children(&self, owner: UserId, parent: Option<FolderId>) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             ORDER BY name ASC, id ASC",
        )
        .bind(owner)
        .bind(parent)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to list child folders", e))
    }

    async fn find_by_owner(&self, owner: UserId) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 ORDER BY path ASC, name ASC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to list folders", e))
    }

    async fn search(&self, owner: UserId, name_contains: &str) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND name ILIKE '%' || $2 || '%' \
             ORDER BY name ASC, id ASC",
        )
        .bind(owner)
        .bind(escape_like(name_contains))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to search folders", e))
    }

    async fn count_children(&self, id: FolderId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalStore, "Failed to count child folders", e)
            })?;
        Ok(count as u64)
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, name, parent_id, owner_id, path, color, icon) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(FolderId::new())
        .bind(&data.name)
        .bind(data.parent_id)
        .bind(data.owner_id)
        .bind(&data.path)
        .bind(&data.color)
        .bind(&data.icon)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to create folder", e))
    }

    async fn update_if_current(&self, folder: &Folder) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $3, parent_id = $4, path = $5, \
             revision = revision + 1, updated_at = NOW() \
             WHERE id = $1 AND revision = $2 RETURNING *",
        )
        .bind(folder.id)
        .bind(folder.revision)
        .bind(&folder.name)
        .bind(folder.parent_id)
        .bind(&folder.path)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to update folder", e))
    }

    async fn update_path(&self, id: FolderId, path: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE folders SET path = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(path)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalStore, "Failed to update folder path", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: FolderId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to delete folder", e))?;
        Ok(result.rows_affected() > 0)
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `LIKE`.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
