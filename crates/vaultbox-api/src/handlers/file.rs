//! File handlers: listing, search, upload, moves, tags, bulk operations,
//! and access-checked content.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use bytes::Bytes;

use vaultbox_auth::{AccessDecision, LinkCredentials};
use vaultbox_core::error::AppError;
use vaultbox_core::types::{FileId, FolderId, PageResponse, UrlMode};
use vaultbox_entity::file::File;
use vaultbox_service::file::BulkOutcome;
use vaultbox_service::file::content::FileUrl;
use vaultbox_service::file::search::QuickSearchResult;
use vaultbox_service::file::upload::UploadRequest;

use crate::dto::request::{
    BulkDeleteRequest, BulkMoveRequest, ContentParams, FileListParams, FileSearchParams,
    MoveFileRequest, QuickSearchParams, TagsRequest,
};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, MaybeAuthUser, PaginationParams, SortParams, ValidatedJson};
use crate::handlers::public::link_password;
use crate::state::AppState;

/// GET /api/files?folder_id=...&root=...&offset=...&limit=...&sort=...&direction=...
pub async fn list_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<FileListParams>,
    Query(page): Query<PaginationParams>,
    Query(sort): Query<SortParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<File>>>> {
    let result = state
        .file_service
        .list_files(
            &auth,
            filter.scope(),
            page.into_page_request(),
            sort.into_ordering(),
        )
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// GET /api/files/search?name=...&category=...&tags=a,b&created_after=...
pub async fn search_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<FileSearchParams>,
    Query(page): Query<PaginationParams>,
    Query(sort): Query<SortParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<File>>>> {
    let result = state
        .search_service
        .search(
            &auth,
            params.into(),
            page.into_page_request(),
            sort.into_ordering(),
        )
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// GET /api/search?q=...
pub async fn quick_search(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<QuickSearchParams>,
) -> ApiResult<Json<ApiResponse<QuickSearchResult>>> {
    let result = state.search_service.quick_search(&auth, &params.q).await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// POST /api/files (multipart: `file`, optional `folder_id`)
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<File>>)> {
    let mut folder_id: Option<FolderId> = None;
    let mut file_name: Option<String> = None;
    let mut mime_type: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "folder_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                let text = text.trim();
                if !text.is_empty() {
                    folder_id = Some(text.parse::<FolderId>()?);
                }
            }
            "file" => {
                file_name = field.file_name().map(String::from);
                mime_type = field.content_type().map(String::from);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::validation("No file provided"))?;
    let name = file_name.ok_or_else(|| AppError::validation("File name is required"))?;

    let file = state
        .upload_service
        .upload(
            &auth,
            UploadRequest {
                name,
                data,
                mime_type,
                folder_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file))))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FileId>,
) -> ApiResult<Json<ApiResponse<File>>> {
    let file = state.file_service.get_file(&auth, id).await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// PUT /api/files/{id}/move
pub async fn move_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FileId>,
    Json(req): Json<MoveFileRequest>,
) -> ApiResult<Json<ApiResponse<File>>> {
    let file = state
        .file_service
        .move_file(&auth, id, req.folder_id)
        .await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FileId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.file_service.delete_file(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("File deleted"))))
}

/// POST /api/files/{id}/tags
pub async fn add_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FileId>,
    ValidatedJson(req): ValidatedJson<TagsRequest>,
) -> ApiResult<Json<ApiResponse<File>>> {
    let file = state.file_service.tag(&auth, id, &req.tags).await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// DELETE /api/files/{id}/tags
pub async fn remove_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<FileId>,
    ValidatedJson(req): ValidatedJson<TagsRequest>,
) -> ApiResult<Json<ApiResponse<File>>> {
    let file = state.file_service.untag(&auth, id, &req.tags).await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// POST /api/files/bulk/delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<BulkDeleteRequest>,
) -> ApiResult<Json<ApiResponse<BulkOutcome>>> {
    let outcome = state.file_service.bulk_delete(&auth, &req.file_ids).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// POST /api/files/bulk/move
pub async fn bulk_move(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<BulkMoveRequest>,
) -> ApiResult<Json<ApiResponse<BulkOutcome>>> {
    let outcome = state
        .file_service
        .bulk_move(&auth, &req.file_ids, req.folder_id)
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// GET /api/files/{id}/access?token=...
pub async fn check_access(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Path(id): Path<FileId>,
    Query(params): Query<ContentParams>,
    headers: HeaderMap,
) -> ApiResult<Json<ApiResponse<AccessDecision>>> {
    let link = link_credentials(params.token, &headers);
    let decision = state
        .content_service
        .check_access(auth.context(), id, link.as_ref())
        .await?;
    Ok(Json(ApiResponse::ok(decision)))
}

/// GET /api/files/{id}/url?mode=view|download&token=...
pub async fn file_url(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Path(id): Path<FileId>,
    Query(params): Query<ContentParams>,
    headers: HeaderMap,
) -> ApiResult<Json<ApiResponse<FileUrl>>> {
    let link = link_credentials(params.token, &headers);
    let url = state
        .content_service
        .file_url(auth.context(), id, params.mode, link.as_ref())
        .await?;
    Ok(Json(ApiResponse::ok(url)))
}

/// GET /api/files/{id}/content?mode=view|download&token=...
pub async fn file_content(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Path(id): Path<FileId>,
    Query(params): Query<ContentParams>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let link = link_credentials(params.token, &headers);
    let (file, data) = state
        .content_service
        .read_content(auth.context(), id, params.mode, link.as_ref())
        .await?;
    Ok(content_response(&file, data, params.mode)?)
}

/// Link credentials from a `token` query parameter and the password header.
fn link_credentials(token: Option<String>, headers: &HeaderMap) -> Option<LinkCredentials> {
    let token = token.filter(|t| !t.is_empty())?;
    let creds = LinkCredentials::token(token);
    Some(match link_password(headers) {
        Some(password) => creds.with_password(password),
        None => creds,
    })
}

/// Builds a response carrying file content.
pub(crate) fn content_response(file: &File, data: Bytes, mode: UrlMode) -> Result<Response, AppError> {
    let disposition = match mode {
        UrlMode::View => "inline",
        UrlMode::Download => "attachment",
    };
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.mime_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            format!("{disposition}; filename=\"{}\"", header_safe_name(&file.name)),
        )
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))
}

fn header_safe_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_safe_name() {
        assert_eq!(header_safe_name("a\"b\\c\n.txt"), "a_b_c_.txt");
        assert_eq!(header_safe_name("résumé.pdf"), "résumé.pdf");
    }

    #[test]
    fn test_link_credentials_need_token() {
        let headers = HeaderMap::new();
        assert!(link_credentials(None, &headers).is_none());
        assert!(link_credentials(Some(String::new()), &headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert("x-share-password", "pw".parse().unwrap());
        let creds = link_credentials(Some("abc".to_string()), &headers).unwrap();
        assert_eq!(creds.token, "abc");
        assert_eq!(creds.password.as_deref(), Some("pw"));
    }
}
