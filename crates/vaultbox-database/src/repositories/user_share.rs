//! User share repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use vaultbox_core::error::{AppError, ErrorKind};
use vaultbox_core::result::AppResult;
use vaultbox_core::types::{FileId, UserId, UserShareId};
use vaultbox_entity::share::{UpsertUserShare, UserShare};

use crate::store::UserShareStore;

/// Repository for direct user-to-user shares.
#[derive(Debug, Clone)]
pub struct UserShareRepository {
    pool: PgPool,
}

impl UserShareRepository {
    /// Create a new user share repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserShareStore for UserShareRepository {
    async fn find_by_id(&self, id: UserShareId) -> AppResult<Option<UserShare>> {
        sqlx::query_as::<_, UserShare>("SELECT * FROM user_shares WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to find user share", e))
    }

    async fn find_for(&self, file: FileId, user: UserId) -> AppResult<Option<UserShare>> {
        sqlx::query_as::<_, UserShare>(
            "SELECT * FROM user_shares WHERE file_id = $1 AND shared_with_id = $2",
        )
        .bind(file)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to find user share", e))
    }

    async fn upsert(&self, data: &UpsertUserShare) -> AppResult<UserShare> {
        sqlx::query_as::<_, UserShare>(
            "INSERT INTO user_shares (id, file_id, owner_id, shared_with_id, permissions) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (file_id, shared_with_id) \
             DO UPDATE SET permissions = EXCLUDED.permissions, shared_at = NOW() \
             RETURNING *",
        )
        .bind(UserShareId::new())
        .bind(data.file_id)
        .bind(data.owner_id)
        .bind(data.shared_with_id)
        .bind(&data.permissions)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to save user share", e))
    }

    async fn list_by_file(&self, file: FileId) -> AppResult<Vec<UserShare>> {
        sqlx::query_as::<_, UserShare>(
            "SELECT * FROM user_shares WHERE file_id = $1 ORDER BY shared_at DESC, id ASC",
        )
        .bind(file)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to list file shares", e))
    }

    async fn list_shared_with(&self, user: UserId) -> AppResult<Vec<UserShare>> {
        sqlx::query_as::<_, UserShare>(
            "SELECT * FROM user_shares WHERE shared_with_id = $1 ORDER BY shared_at DESC, id ASC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::ExternalStore, "Failed to list shares for user", e)
        })
    }

    async fn delete(&self, id: UserShareId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_shares WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalStore, "Failed to delete user share", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_file(&self, file: FileId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_shares WHERE file_id = $1")
            .bind(file)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalStore, "Failed to delete file shares", e)
            })?;
        Ok(result.rows_affected())
    }
}
