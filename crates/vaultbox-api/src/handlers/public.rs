//! Anonymous share link handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;

use vaultbox_auth::LinkCredentials;
use vaultbox_core::types::UrlMode;

use crate::dto::request::{ContentParams, LinkAccessRequest};
use crate::dto::response::{ApiResponse, PublicLinkResponse};
use crate::error::ApiResult;
use crate::handlers::file::content_response;
use crate::state::AppState;

/// Header carrying a link password on GET requests.
pub const SHARE_PASSWORD_HEADER: &str = "x-share-password";

/// GET /api/s/{token}
pub async fn open_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<ApiResponse<PublicLinkResponse>>> {
    let password = link_password(&headers);
    resolve_link(&state, token, password).await
}

/// POST /api/s/{token} with `{"password": ...}`
pub async fn unlock_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    body: Option<Json<LinkAccessRequest>>,
) -> ApiResult<Json<ApiResponse<PublicLinkResponse>>> {
    let password = body
        .and_then(|Json(req)| req.password)
        .or_else(|| link_password(&headers));
    resolve_link(&state, token, password).await
}

/// GET /api/s/{token}/content?mode=view|download
pub async fn link_content(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(params): Query<ContentParams>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let creds = credentials(token, link_password(&headers));
    let (file, data) = state
        .content_service
        .read_link_content(&creds, params.mode)
        .await?;
    Ok(content_response(&file, data, params.mode)?)
}

async fn resolve_link(
    state: &AppState,
    token: String,
    password: Option<String>,
) -> ApiResult<Json<ApiResponse<PublicLinkResponse>>> {
    let link = state
        .link_service
        .validate_access(&token, password.as_deref())
        .await?;
    let creds = credentials(token, password);
    let url = state
        .content_service
        .file_url(None, link.file_id, UrlMode::View, Some(&creds))
        .await?;
    Ok(Json(ApiResponse::ok(PublicLinkResponse::new(link, url))))
}

fn credentials(token: String, password: Option<String>) -> LinkCredentials {
    let creds = LinkCredentials::token(token);
    match password {
        Some(password) => creds.with_password(password),
        None => creds,
    }
}

/// The link password sent in the `x-share-password` header, if any.
pub(crate) fn link_password(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SHARE_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
}
