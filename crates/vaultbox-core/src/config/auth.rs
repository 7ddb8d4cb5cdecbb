//! Identity token configuration.

use serde::{Deserialize, Serialize};

/// Settings for verifying identity tokens issued by the external provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for HS256 verification.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Expected `iss` claim, if the provider sets one.
    #[serde(default)]
    pub jwt_issuer: Option<String>,
    /// Clock skew tolerance in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_issuer: None,
            leeway_seconds: default_leeway(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_leeway() -> u64 {
    5
}
