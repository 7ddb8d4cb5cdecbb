//! `AuthUser` extractor: pulls the identity token from the Authorization
//! header, validates it, and injects the request context.

use axum::extract::FromRequestParts;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use vaultbox_core::error::AppError;
use vaultbox_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::authentication("Missing or malformed bearer token"))?;

        let ctx = authenticate(parts, state, bearer.token()).await?;
        Ok(AuthUser(ctx))
    }
}

/// An identity when a bearer token is present.
///
/// A present but invalid token is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<RequestContext>);

impl MaybeAuthUser {
    /// The context, if authenticated.
    pub fn context(&self) -> Option<&RequestContext> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(axum::http::header::AUTHORIZATION) {
            return Ok(MaybeAuthUser(None));
        }
        let AuthUser(ctx) = AuthUser::from_request_parts(parts, state).await?;
        Ok(MaybeAuthUser(Some(ctx)))
    }
}

async fn authenticate(
    parts: &Parts,
    state: &AppState,
    token: &str,
) -> Result<RequestContext, AppError> {
    let claims = state.jwt_decoder.decode(token)?;

    let ip_address = parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let user_agent = parts
        .headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let ctx = RequestContext::new(claims.user_id())
        .with_identity(claims.email, claims.name)
        .with_client(ip_address, user_agent);

    if let Err(e) = state.user_service.sync_identity(&ctx).await {
        tracing::warn!(user_id = %ctx.user_id, error = %e, "Failed to sync identity into user directory");
    }

    Ok(ctx)
}
