//! Activity log queries.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use vaultbox_core::error::AppError;
use vaultbox_core::retry::read_retrying_once;
use vaultbox_core::types::{PageRequest, PageResponse};
use vaultbox_database::ActivityStore;
use vaultbox_entity::activity::{Activity, ResourceType};

use crate::context::RequestContext;

/// Largest window `recent` accepts, in hours.
const MAX_RECENT_HOURS: i64 = 24 * 30;

/// Most entries `recent` and `for_resource` return.
const MAX_ENTRIES: u32 = 200;

/// Reads the current user's activity log.
#[derive(Clone)]
pub struct ActivityService {
    store: Arc<dyn ActivityStore>,
}

impl std::fmt::Debug for ActivityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityService").finish()
    }
}

impl ActivityService {
    /// Creates a new activity service.
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }

    /// The user's activity, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<Activity>, AppError> {
        read_retrying_once("list_activities", || {
            self.store.list_by_user(ctx.user_id, page)
        })
        .await
    }

    /// The user's activity about one resource, newest first.
    pub async fn for_resource(
        &self,
        ctx: &RequestContext,
        resource_type: ResourceType,
        resource_id: Uuid,
        limit: u32,
    ) -> Result<Vec<Activity>, AppError> {
        let limit = limit.clamp(1, MAX_ENTRIES);
        read_retrying_once("list_resource_activities", || {
            self.store
                .list_by_resource(ctx.user_id, resource_type, resource_id, limit)
        })
        .await
    }

    /// The user's activity in the last `hours` hours.
    pub async fn recent(&self, ctx: &RequestContext, hours: i64) -> Result<Vec<Activity>, AppError> {
        if hours <= 0 {
            return Err(AppError::validation("hours must be positive"));
        }
        let since = Utc::now() - Duration::hours(hours.min(MAX_RECENT_HOURS));
        read_retrying_once("recent_activities", || {
            self.store.list_since(ctx.user_id, since, MAX_ENTRIES)
        })
        .await
    }
}
