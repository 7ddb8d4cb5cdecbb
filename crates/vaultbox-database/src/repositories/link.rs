//! Share link repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use vaultbox_core::error::{AppError, ErrorKind};
use vaultbox_core::result::AppResult;
use vaultbox_core::types::{FileId, ShareLinkId, UserId};
use vaultbox_entity::share::{CreateShareLink, LinkUse, ShareLink};

use crate::store::ShareLinkStore;

/// Repository for share link CRUD and token lookup operations.
#[derive(Debug, Clone)]
pub struct ShareLinkRepository {
    pool: PgPool,
}

impl ShareLinkRepository {
    /// Create a new share link repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareLinkStore for ShareLinkRepository {
    async fn find_by_id(&self, id: ShareLinkId) -> AppResult<Option<ShareLink>> {
        sqlx::query_as::<_, ShareLink>("SELECT * FROM share_links WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to find share link", e))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>> {
        sqlx::query_as::<_, ShareLink>("SELECT * FROM share_links WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalStore, "Failed to find share link by token", e)
            })
    }

    async fn token_exists(&self, token: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM share_links WHERE token = $1)")
            .bind(token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to check token", e))
    }

    async fn create(&self, data: &CreateShareLink) -> AppResult<ShareLink> {
        sqlx::query_as::<_, ShareLink>(
            "INSERT INTO share_links (id, file_id, owner_id, token, password_hash, expires_at, permissions) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(ShareLinkId::new())
        .bind(data.file_id)
        .bind(data.owner_id)
        .bind(&data.token)
        .bind(&data.password_hash)
        .bind(data.expires_at)
        .bind(&data.permissions)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to create share link", e))
    }

    async fn list_by_owner(&self, owner: UserId, file: Option<FileId>) -> AppResult<Vec<ShareLink>> {
        sqlx::query_as::<_, ShareLink>(
            "SELECT * FROM share_links WHERE owner_id = $1 AND ($2::uuid IS NULL OR file_id = $2) \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(owner)
        .bind(file)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to list share links", e))
    }

    async fn record_use(&self, id: ShareLinkId, usage: LinkUse) -> AppResult<()> {
        let column = usage.column();
        let sql = format!("UPDATE share_links SET {column} = {column} + 1 WHERE id = $1");
        sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalStore, "Failed to record link use", e)
            })?;
        Ok(())
    }

    async fn delete(&self, id: ShareLinkId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM share_links WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalStore, "Failed to delete share link", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_file(&self, file: FileId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM share_links WHERE file_id = $1")
            .bind(file)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalStore, "Failed to delete file links", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM share_links WHERE expires_at IS NOT NULL AND expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalStore, "Failed to delete expired links", e)
            })?;
        Ok(result.rows_affected())
    }
}
