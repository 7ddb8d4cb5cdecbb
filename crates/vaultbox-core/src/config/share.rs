//! Share link configuration.

use serde::{Deserialize, Serialize};

/// Shortest token length accepted.
pub const MIN_TOKEN_LENGTH: usize = 32;

/// Share link issuance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Length of generated link tokens (raised to 32 if lower).
    #[serde(default = "default_token_length")]
    pub token_length: usize,
    /// Collision retries before giving up on token generation.
    #[serde(default = "default_max_attempts")]
    pub token_max_attempts: u32,
    /// Permissions granted when a link is created without an explicit set.
    #[serde(default = "default_permissions")]
    pub default_permissions: Vec<String>,
}

impl ShareConfig {
    /// Effective token length.
    pub fn effective_token_length(&self) -> usize {
        self.token_length.max(MIN_TOKEN_LENGTH)
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            token_length: default_token_length(),
            token_max_attempts: default_max_attempts(),
            default_permissions: default_permissions(),
        }
    }
}

fn default_token_length() -> usize {
    MIN_TOKEN_LENGTH
}

fn default_max_attempts() -> u32 {
    5
}

fn default_permissions() -> Vec<String> {
    vec!["view".to_string(), "download".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_token_length_is_raised() {
        let config = ShareConfig {
            token_length: 8,
            ..ShareConfig::default()
        };
        assert_eq!(config.effective_token_length(), MIN_TOKEN_LENGTH);
    }
}
