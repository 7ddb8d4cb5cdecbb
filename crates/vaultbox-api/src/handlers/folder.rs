//! Folder CRUD and tree handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use vaultbox_core::types::FolderId;
use vaultbox_entity::folder::{Folder, FolderTree};
use vaultbox_service::folder::service::DeleteFolderOutcome;

use crate::dto::request::{
    CreateFolderRequest, DeleteFolderParams, FolderListParams, FolderSearchParams,
    MoveFolderRequest, RenameFolderRequest,
};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/folders?parent_id=...
pub async fn list_folders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<FolderListParams>,
) -> ApiResult<Json<ApiResponse<Vec<Folder>>>> {
    let folders = state
        .folder_service
        .list_children(&auth, params.parent_id)
        .await?;
    Ok(Json(ApiResponse::ok(folders)))
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Folder>>)> {
    let folder = state.folder_service.create_folder(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(folder))))
}

/// POST /api/folders/defaults
pub async fn create_default_folders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<Folder>>>> {
    let folders = state.folder_service.create_default_folders(&auth).await?;
    Ok(Json(ApiResponse::ok(folders)))
}

/// GET /api/folders/tree
pub async fn get_tree(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<FolderTree>>> {
    let tree = state.tree_service.folder_tree(&auth).await?;
    Ok(Json(ApiResponse::ok(tree)))
}

/// GET /api/folders/search?q=...
pub async fn search_folders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<FolderSearchParams>,
) -> ApiResult<Json<ApiResponse<Vec<Folder>>>> {
    let folders = state.tree_service.search_folders(&auth, &params.q).await?;
    Ok(Json(ApiResponse::ok(folders)))
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FolderId>,
) -> ApiResult<Json<ApiResponse<Folder>>> {
    let folder = state.folder_service.get_folder(&auth, id).await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// GET /api/folders/{id}/breadcrumbs
pub async fn breadcrumbs(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FolderId>,
) -> ApiResult<Json<ApiResponse<Vec<Folder>>>> {
    let trail = state.tree_service.breadcrumbs(&auth, id).await?;
    Ok(Json(ApiResponse::ok(trail)))
}

/// PUT /api/folders/{id}
pub async fn rename_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FolderId>,
    ValidatedJson(req): ValidatedJson<RenameFolderRequest>,
) -> ApiResult<Json<ApiResponse<Folder>>> {
    let folder = state
        .folder_service
        .rename_folder(&auth, id, &req.name)
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// PUT /api/folders/{id}/move
pub async fn move_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FolderId>,
    Json(req): Json<MoveFolderRequest>,
) -> ApiResult<Json<ApiResponse<Folder>>> {
    let folder = state
        .folder_service
        .move_folder(&auth, id, req.parent_id)
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// DELETE /api/folders/{id}?cascade=true
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FolderId>,
    Query(params): Query<DeleteFolderParams>,
) -> ApiResult<Json<ApiResponse<DeleteFolderOutcome>>> {
    let outcome = state
        .folder_service
        .delete_folder(&auth, id, params.cascade)
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}
