//! Current-user handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, MeResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<MeResponse>>> {
    let directory = state.user_service.me(&auth).await?;
    let ctx = auth.context();
    Ok(Json(ApiResponse::ok(MeResponse {
        id: ctx.user_id,
        email: ctx.email.clone(),
        display_name: ctx.display_name.clone(),
        directory,
    })))
}
