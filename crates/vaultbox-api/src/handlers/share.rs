//! User-to-user sharing handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use vaultbox_core::error::AppError;
use vaultbox_core::types::{FileId, UserShareId};
use vaultbox_entity::share::{SharedFile, UserShare};

use crate::dto::request::CreateShareRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/files/{id}/shares
pub async fn share_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<FileId>,
    ValidatedJson(req): ValidatedJson<CreateShareRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserShare>>)> {
    let share = match (req.user_id, req.email.as_deref()) {
        (Some(user_id), _) => {
            state
                .share_service
                .share_with_user(&auth, file_id, user_id, &req.permissions)
                .await?
        }
        (None, Some(email)) => {
            state
                .share_service
                .share_with_email(&auth, file_id, email, &req.permissions)
                .await?
        }
        (None, None) => {
            return Err(AppError::validation("Either user_id or email is required").into());
        }
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(share))))
}

/// GET /api/files/{id}/shares
pub async fn list_file_shares(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<FileId>,
) -> ApiResult<Json<ApiResponse<Vec<UserShare>>>> {
    let shares = state.share_service.file_shares(&auth, file_id).await?;
    Ok(Json(ApiResponse::ok(shares)))
}

/// DELETE /api/shares/{id}
pub async fn remove_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserShareId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.share_service.remove_share(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Share removed"))))
}

/// GET /api/shares/with-me
pub async fn shared_with_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<SharedFile>>>> {
    let files = state.share_service.shared_with_me(&auth).await?;
    Ok(Json(ApiResponse::ok(files)))
}
