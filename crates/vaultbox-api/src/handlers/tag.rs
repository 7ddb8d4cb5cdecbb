//! Tag vocabulary handlers.

use axum::Json;
use axum::extract::{Query, State};

use vaultbox_entity::file::TagCount;

use crate::dto::request::TagSuggestParams;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/tags
pub async fn list_tags(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<TagCount>>>> {
    let tags = state.tag_service.user_tags(&auth).await?;
    Ok(Json(ApiResponse::ok(tags)))
}

/// GET /api/tags/suggest?prefix=...
pub async fn suggest_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<TagSuggestParams>,
) -> ApiResult<Json<ApiResponse<Vec<String>>>> {
    let tags = state
        .tag_service
        .suggest_tags(&auth, &params.prefix)
        .await?;
    Ok(Json(ApiResponse::ok(tags)))
}
