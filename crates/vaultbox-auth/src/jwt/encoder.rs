//! Identity token signing.
//!
//! Production tokens come from the external identity provider. The encoder
//! issues compatible tokens for local development and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use vaultbox_core::config::AuthConfig;
use vaultbox_core::error::AppError;
use vaultbox_core::types::UserId;

use super::claims::Claims;

/// Creates signed HS256 identity tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Issuer written into tokens.
    issuer: Option<String>,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
        }
    }

    /// Issues a token for `user` valid for `ttl_seconds`.
    pub fn issue(
        &self,
        user: UserId,
        email: Option<&str>,
        name: Option<&str>,
        ttl_seconds: i64,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user,
            email: email.map(str::to_string),
            name: name.map(str::to_string),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode identity token: {e}")))
    }
}
