//! User directory repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use vaultbox_core::error::{AppError, ErrorKind};
use vaultbox_core::result::AppResult;
use vaultbox_core::types::UserId;
use vaultbox_entity::user::{UpsertUser, User};

use crate::store::UserStore;

/// Repository for the mirrored user directory.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn upsert(&self, data: &UpsertUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, display_name) VALUES ($1, LOWER($2), $3) \
             ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email, \
             display_name = EXCLUDED.display_name, \
             updated_at = CASE WHEN users.email IS DISTINCT FROM EXCLUDED.email \
                 OR users.display_name IS DISTINCT FROM EXCLUDED.display_name \
                 THEN NOW() ELSE users.updated_at END \
             RETURNING *",
        )
        .bind(data.id)
        .bind(data.email.trim())
        .bind(&data.display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to save user", e))
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to find user by id", e))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = LOWER($1)")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalStore, "Failed to find user by email", e)
            })
    }
}
