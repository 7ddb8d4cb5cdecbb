//! Best-effort activity recording.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use vaultbox_core::types::UserId;
use vaultbox_database::ActivityStore;
use vaultbox_entity::activity::{ActivityAction, CreateActivity, ResourceType};

use crate::context::RequestContext;

/// Appends audit entries without ever failing the caller.
#[derive(Clone)]
pub struct ActivityLogger {
    store: Arc<dyn ActivityStore>,
}

impl std::fmt::Debug for ActivityLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLogger").finish()
    }
}

impl ActivityLogger {
    /// Creates a new logger.
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }

    /// Record an action taken by the request's user.
    pub async fn record(
        &self,
        ctx: &RequestContext,
        action: ActivityAction,
        resource_type: ResourceType,
        resource_id: Uuid,
        resource_name: &str,
        metadata: Value,
    ) {
        let entry = CreateActivity {
            user_id: ctx.user_id,
            action,
            resource_type,
            resource_id,
            resource_name: resource_name.to_string(),
            metadata,
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
        };
        self.append(entry).await;
    }

    /// Record an action attributed to `user` without a request context,
    /// such as anonymous link access credited to the file owner.
    pub async fn record_for(
        &self,
        user: UserId,
        action: ActivityAction,
        resource_type: ResourceType,
        resource_id: Uuid,
        resource_name: &str,
        metadata: Value,
    ) {
        let entry = CreateActivity {
            user_id: user,
            action,
            resource_type,
            resource_id,
            resource_name: resource_name.to_string(),
            metadata,
            ip_address: None,
            user_agent: None,
        };
        self.append(entry).await;
    }

    async fn append(&self, entry: CreateActivity) {
        if let Err(e) = self.store.append(&entry).await {
            warn!(
                user_id = %entry.user_id,
                action = ?entry.action,
                resource_id = %entry.resource_id,
                error = %e,
                "Failed to record activity"
            );
        }
    }
}
