//! Share link management handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use vaultbox_core::types::{FileId, ShareLinkId};

use crate::dto::request::{CreateLinkRequest, LinkListParams};
use crate::dto::response::{ApiResponse, LinkResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/files/{id}/links
pub async fn create_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<FileId>,
    ValidatedJson(req): ValidatedJson<CreateLinkRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<LinkResponse>>)> {
    let link = state
        .link_service
        .create_link(&auth, file_id, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(link.into()))))
}

/// GET /api/links?file_id=...
pub async fn list_links(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<LinkListParams>,
) -> ApiResult<Json<ApiResponse<Vec<LinkResponse>>>> {
    let links = state
        .link_service
        .list_active(&auth, params.file_id)
        .await?;
    Ok(Json(ApiResponse::ok(
        links.into_iter().map(LinkResponse::from).collect(),
    )))
}

/// DELETE /api/links/{id}
pub async fn revoke_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ShareLinkId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.link_service.revoke(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Share link revoked"))))
}
