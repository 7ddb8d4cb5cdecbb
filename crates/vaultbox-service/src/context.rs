//! Request context carrying the acting identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vaultbox_core::types::UserId;

/// Context for the current authenticated request.
///
/// Built from the identity token and passed into service methods so that
/// every operation knows *who* is acting and from *where*.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// Email from the identity token.
    pub email: Option<String>,
    /// Display name from the identity token.
    pub display_name: Option<String>,
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for `user_id` with no client details.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
            display_name: None,
            ip_address: None,
            user_agent: None,
            request_time: Utc::now(),
        }
    }

    /// Attach identity details from the token.
    pub fn with_identity(mut self, email: Option<String>, display_name: Option<String>) -> Self {
        self.email = email;
        self.display_name = display_name;
        self
    }

    /// Attach client details from the transport.
    pub fn with_client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}
