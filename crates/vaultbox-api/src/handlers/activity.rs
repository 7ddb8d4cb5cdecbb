//! Activity log handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use vaultbox_core::types::PageResponse;

use crate::dto::request::{RecentActivityParams, ResourceActivityParams, ResourceActivityPath};
use crate::dto::response::{ActivityEntry, ApiResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/activities?offset=...&limit=...
pub async fn list_activities(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<ActivityEntry>>>> {
    let result = state
        .activity_service
        .list(&auth, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(result.map(ActivityEntry::from))))
}

/// GET /api/activities/recent?hours=24
pub async fn recent_activities(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<RecentActivityParams>,
) -> ApiResult<Json<ApiResponse<Vec<ActivityEntry>>>> {
    let entries = state.activity_service.recent(&auth, params.hours).await?;
    Ok(Json(ApiResponse::ok(
        entries.into_iter().map(ActivityEntry::from).collect(),
    )))
}

/// GET /api/activities/{resource_type}/{id}
pub async fn resource_activities(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ResourceActivityPath>,
    Query(params): Query<ResourceActivityParams>,
) -> ApiResult<Json<ApiResponse<Vec<ActivityEntry>>>> {
    let entries = state
        .activity_service
        .for_resource(&auth, path.resource_type, path.id, params.limit)
        .await?;
    Ok(Json(ApiResponse::ok(
        entries.into_iter().map(ActivityEntry::from).collect(),
    )))
}
