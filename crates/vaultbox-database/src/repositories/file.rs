//! File record repository implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use vaultbox_core::error::{AppError, ErrorKind};
use vaultbox_core::result::AppResult;
use vaultbox_core::types::{FileId, FileOrdering, FolderId, PageRequest, PageResponse, UserId};
use vaultbox_entity::file::{CreateFile, File, TagCount};

use super::folder::escape_like;
use crate::store::{FileFilter, FileStore, FolderScope};

/// Repository for file record CRUD, listing, and tag statistics.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append the `WHERE` clause shared by the count and page queries.
    fn push_conditions<'a>(
        builder: &mut QueryBuilder<'a, Postgres>,
        owner: UserId,
        scope: FolderScope,
        filter: &'a FileFilter,
    ) {
        builder.push(" WHERE owner_id = ").push_bind(owner);
        match scope {
            FolderScope::All => {}
            FolderScope::Root => {
                builder.push(" AND folder_id IS NULL");
            }
            FolderScope::Folder(id) => {
                builder.push(" AND folder_id = ").push_bind(id);
            }
        }
        if let Some(needle) = &filter.name_contains {
            builder
                .push(" AND name ILIKE '%' || ")
                .push_bind(escape_like(needle))
                .push(" || '%'");
        }
        if let Some(category) = filter.category {
            builder.push(" AND ").push(category.sql_predicate());
        }
        if !filter.tags.is_empty() {
            builder.push(" AND tags @> ").push_bind(&filter.tags);
        }
        if let Some(after) = filter.created_after {
            builder.push(" AND created_at >= ").push_bind(after);
        }
        if let Some(before) = filter.created_before {
            builder.push(" AND created_at <= ").push_bind(before);
        }
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to find file", e))
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files (id, owner_id, name, size_bytes, mime_type, folder_id, object_ref) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(FileId::new())
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(data.size_bytes)
        .bind(&data.mime_type)
        .bind(data.folder_id)
        .bind(&data.object_ref)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to create file", e))
    }

    async fn list(
        &self,
        owner: UserId,
        scope: FolderScope,
        filter: &FileFilter,
        page: PageRequest,
        ordering: FileOrdering,
    ) -> AppResult<PageResponse<File>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM files");
        Self::push_conditions(&mut count, owner, scope, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to count files", e))?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM files");
        Self::push_conditions(&mut select, owner, scope, filter);
        select
            .push(" ORDER BY ")
            .push(ordering.as_sql())
            .push(" LIMIT ")
            .push_bind(page.limit_i64())
            .push(" OFFSET ")
            .push_bind(page.offset_i64());
        let files = select
            .build_query_as::<File>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to list files", e))?;

        Ok(PageResponse::new(files, page, total as u64))
    }

    async fn find_in_folder(&self, folder: FolderId) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE folder_id = $1 ORDER BY id ASC")
            .bind(folder)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalStore, "Failed to list folder files", e)
            })
    }

    async fn count_in_folder(&self, folder: FolderId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE folder_id = $1")
            .bind(folder)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalStore, "Failed to count folder files", e)
            })?;
        Ok(count as u64)
    }

    async fn update_folder(&self, id: FileId, folder: Option<FolderId>) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET folder_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(folder)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to move file", e))
    }

    async fn update_tags(&self, id: FileId, tags: &[String]) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET tags = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(tags)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to update tags", e))
    }

    async fn delete(&self, id: FileId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn tag_counts(&self, owner: UserId) -> AppResult<Vec<TagCount>> {
        sqlx::query_as::<_, TagCount>(
            "SELECT tag, COUNT(*) AS count FROM files, UNNEST(tags) AS tag \
             WHERE owner_id = $1 GROUP BY tag ORDER BY count DESC, tag ASC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to count tags", e))
    }

    async fn scan_after(&self, cursor: Option<FileId>, limit: u32) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE ($1::uuid IS NULL OR id > $1) ORDER BY id ASC LIMIT $2",
        )
        .bind(cursor)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ExternalStore, "Failed to scan files", e))
    }
}
