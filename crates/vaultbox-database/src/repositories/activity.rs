//! Activity log repository implementation (append-only).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use vaultbox_core::error::{AppError, ErrorKind};
use vaultbox_core::result::AppResult;
use vaultbox_core::types::{ActivityId, PageRequest, PageResponse, UserId};
use vaultbox_entity::activity::{Activity, CreateActivity, ResourceType};

use crate::store::ActivityStore;

/// Repository for activity entries. There are no update or delete methods.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    /// Create a new activity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityStore for ActivityRepository {
    async fn append(&self, data: &CreateActivity) -> AppResult<Activity> {
        sqlx::query_as::<_, Activity>(
            "INSERT INTO activities (id, user_id, action, resource_type, resource_id, resource_name, \
             metadata, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(ActivityId::from_uuid(Uuid::now_v7()))
        .bind(data.user_id)
        .bind(data.action)
        .bind(data.resource_type)
        .bind(data.resource_id)
        .bind(&data.resource_name)
        .bind(&data.metadata)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to append activity", e))
    }

    async fn list_by_user(&self, user: UserId, page: PageRequest) -> AppResult<PageResponse<Activity>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activities WHERE user_id = $1")
            .bind(user)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalStore, "Failed to count activities", e)
            })?;

        let entries = sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(user)
        .bind(page.limit_i64())
        .bind(page.offset_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to list activities", e))?;

        Ok(PageResponse::new(entries, page, total as u64))
    }

    async fn list_by_resource(
        &self,
        user: UserId,
        resource_type: ResourceType,
        resource_id: Uuid,
        limit: u32,
    ) -> AppResult<Vec<Activity>> {
        sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE user_id = $1 AND resource_type = $2 AND resource_id = $3 \
             ORDER BY created_at DESC, id DESC LIMIT $4",
        )
        .bind(user)
        .bind(resource_type)
        .bind(resource_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::ExternalStore, "Failed to list resource activities", e)
        })
    }

    async fn list_since(&self, user: UserId, since: DateTime<Utc>, limit: u32) -> AppResult<Vec<Activity>> {
        sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE user_id = $1 AND created_at >= $2 \
             ORDER BY created_at DESC, id DESC LIMIT $3",
        )
        .bind(user)
        .bind(since)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::ExternalStore, "Failed to list recent activities", e)
        })
    }
}
