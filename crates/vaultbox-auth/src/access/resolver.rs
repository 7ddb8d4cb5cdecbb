//! Access control resolver that merges ownership, user shares, and share links.
//!
//! Resolution order:
//! 1. Owner check: the owner holds every permission.
//! 2. User share: a direct grant to the requester.
//! 3. Share link: an anonymous grant presented as a token (and password).
//! 4. Denied.
//!
//! A requester holding a user share is never checked against a link, so a
//! link can not widen a direct grant.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use vaultbox_core::error::AppError;
use vaultbox_core::result::AppResult;
use vaultbox_core::retry::read_retrying_once;
use vaultbox_core::types::{FileId, UserId};
use vaultbox_database::{FileStore, ShareLinkStore, UserShareStore};
use vaultbox_entity::file::File;
use vaultbox_entity::permission::PermissionSet;
use vaultbox_entity::share::ShareLink;

use crate::password::LinkPasswordHasher;

/// Message shared by unknown and expired tokens.
const INVALID_LINK: &str = "Share link not found or no longer valid";

/// A share link token and the password presented with it.
#[derive(Debug, Clone, Default)]
pub struct LinkCredentials {
    /// The bearer token.
    pub token: String,
    /// Password for protected links.
    pub password: Option<String>,
}

impl LinkCredentials {
    /// Credentials for an unprotected link.
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            password: None,
        }
    }

    /// Attach a password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// Where the decision was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessSource {
    /// The requester owns the file.
    Owner,
    /// A direct share to the requester.
    UserShare,
    /// A share link.
    Link,
    /// No grant applies.
    Denied,
}

/// Result of resolving access to a file.
#[derive(Debug, Clone, Serialize)]
pub struct AccessDecision {
    /// Whether any access is granted.
    pub allowed: bool,
    /// Granted permissions; empty when denied.
    pub permissions: PermissionSet,
    /// The grant source.
    pub source: AccessSource,
    /// The link that granted access, for usage accounting.
    #[serde(skip)]
    pub link: Option<ShareLink>,
}

impl AccessDecision {
    fn granted(permissions: PermissionSet, source: AccessSource) -> Self {
        Self {
            allowed: true,
            permissions,
            source,
            link: None,
        }
    }

    fn denied() -> Self {
        Self {
            allowed: false,
            permissions: PermissionSet::none(),
            source: AccessSource::Denied,
            link: None,
        }
    }
}

/// The single authority on what a requester may do with a file.
#[derive(Clone)]
pub struct AccessResolver {
    files: Arc<dyn FileStore>,
    user_shares: Arc<dyn UserShareStore>,
    links: Arc<dyn ShareLinkStore>,
    hasher: LinkPasswordHasher,
}

impl std::fmt::Debug for AccessResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessResolver").finish()
    }
}

impl AccessResolver {
    /// Creates a new resolver over the given stores.
    pub fn new(
        files: Arc<dyn FileStore>,
        user_shares: Arc<dyn UserShareStore>,
        links: Arc<dyn ShareLinkStore>,
    ) -> Self {
        Self {
            files,
            user_shares,
            links,
            hasher: LinkPasswordHasher::new(),
        }
    }

    /// Loads a file and resolves access to it.
    ///
    /// Fails with `NotFound` when the file does not exist.
    pub async fn resolve(
        &self,
        file_id: FileId,
        requester: Option<UserId>,
        link: Option<&LinkCredentials>,
    ) -> AppResult<(File, AccessDecision)> {
        let file = read_retrying_once("find_file", || self.files.find_by_id(file_id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_id}")))?;
        let decision = self.resolve_for(&file, requester, link).await?;
        Ok((file, decision))
    }

    /// Resolves access to an already loaded file.
    pub async fn resolve_for(
        &self,
        file: &File,
        requester: Option<UserId>,
        link: Option<&LinkCredentials>,
    ) -> AppResult<AccessDecision> {
        if let Some(user) = requester {
            if file.is_owned_by(user) {
                return Ok(AccessDecision::granted(
                    PermissionSet::full(),
                    AccessSource::Owner,
                ));
            }

            let share = read_retrying_once("find_user_share", || {
                self.user_shares.find_for(file.id, user)
            })
            .await?;
            if let Some(share) = share {
                debug!(file_id = %file.id, user_id = %user, "Access granted by user share");
                return Ok(AccessDecision::granted(
                    share.permission_set(),
                    AccessSource::UserShare,
                ));
            }
        }

        let Some(credentials) = link else {
            return Ok(AccessDecision::denied());
        };

        let link = self
            .validate_link(&credentials.token, credentials.password.as_deref())
            .await?;
        if link.file_id != file.id {
            return Err(AppError::not_found(INVALID_LINK));
        }

        debug!(file_id = %file.id, link_id = %link.id, "Access granted by share link");
        let mut decision = AccessDecision::granted(link.permission_set(), AccessSource::Link);
        decision.link = Some(link);
        Ok(decision)
    }

    /// Validates a link token and password.
    ///
    /// Unknown and expired tokens fail identically with `NotFound`. A
    /// protected link fails with `PasswordRequired` when no password is
    /// given and `InvalidPassword` when it does not match.
    pub async fn validate_link(&self, token: &str, password: Option<&str>) -> AppResult<ShareLink> {
        let link = read_retrying_once("find_link_by_token", || self.links.find_by_token(token))
            .await?
            .filter(|link| !link.is_expired())
            .ok_or_else(|| AppError::not_found(INVALID_LINK))?;

        if let Some(hash) = &link.password_hash {
            let Some(password) = password else {
                return Err(AppError::password_required(
                    "This link is password protected",
                ));
            };
            self.hasher.check(password, hash)?;
        }

        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use vaultbox_core::ErrorKind;
    use vaultbox_core::types::ObjectRef;
    use vaultbox_database::MemoryStore;
    use vaultbox_entity::file::CreateFile;
    use vaultbox_entity::permission::{GrantPermission, Permission};
    use vaultbox_entity::share::{CreateShareLink, UpsertUserShare};

    use super::*;

    struct Fixture {
        store: Arc<MemoryStore>,
        resolver: AccessResolver,
        owner: UserId,
        file: File,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let owner = UserId::new();
        let file = FileStore::create(
            store.as_ref(),
            &CreateFile {
                owner_id: owner,
                name: "report.pdf".to_string(),
                size_bytes: 42,
                mime_type: "application/pdf".to_string(),
                folder_id: None,
                object_ref: ObjectRef::new("ab/report"),
            },
        )
        .await
        .unwrap();
        let resolver = AccessResolver::new(store.clone(), store.clone(), store.clone());
        Fixture {
            store,
            resolver,
            owner,
            file,
        }
    }

    async fn link(
        fx: &Fixture,
        token: &str,
        password: Option<&str>,
        expires_at: Option<chrono::DateTime<Utc>>,
        permissions: Vec<GrantPermission>,
    ) -> ShareLink {
        let password_hash = password.map(|p| LinkPasswordHasher::new().seal(p).unwrap());
        ShareLinkStore::create(
            fx.store.as_ref(),
            &CreateShareLink {
                file_id: fx.file.id,
                owner_id: fx.owner,
                token: token.to_string(),
                password_hash,
                expires_at,
                permissions,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_owner_gets_full_permissions() {
        let fx = fixture().await;
        let (_, decision) = fx.resolver.resolve(fx.file.id, Some(fx.owner), None).await.unwrap();

        assert!(decision.allowed);
        assert_eq!(decision.permissions, PermissionSet::full());
        assert_eq!(decision.source, AccessSource::Owner);
    }

    #[tokio::test]
    async fn test_user_share_wins_over_link() {
        let fx = fixture().await;
        let viewer = UserId::new();
        UserShareStore::upsert(
            fx.store.as_ref(),
            &UpsertUserShare {
                file_id: fx.file.id,
                owner_id: fx.owner,
                shared_with_id: viewer,
                permissions: vec![GrantPermission::View],
            },
        )
        .await
        .unwrap();
        let token = "a".repeat(32);
        link(&fx, &token, None, None, vec![GrantPermission::View, GrantPermission::Download]).await;

        let creds = LinkCredentials::token(&token);
        let decision = fx
            .resolver
            .resolve_for(&fx.file, Some(viewer), Some(&creds))
            .await
            .unwrap();

        assert_eq!(decision.source, AccessSource::UserShare);
        assert!(decision.permissions.contains(Permission::View));
        assert!(!decision.permissions.contains(Permission::Download));
    }

    #[tokio::test]
    async fn test_authenticated_user_without_share_falls_through_to_link() {
        let fx = fixture().await;
        let token = "b".repeat(32);
        link(&fx, &token, None, None, vec![GrantPermission::Download]).await;

        let creds = LinkCredentials::token(&token);
        let decision = fx
            .resolver
            .resolve_for(&fx.file, Some(UserId::new()), Some(&creds))
            .await
            .unwrap();

        assert_eq!(decision.source, AccessSource::Link);
        assert!(decision.link.is_some());
    }

    #[tokio::test]
    async fn test_stranger_without_token_is_denied() {
        let fx = fixture().await;
        let decision = fx
            .resolver
            .resolve_for(&fx.file, Some(UserId::new()), None)
            .await
            .unwrap();

        assert!(!decision.allowed);
        assert!(decision.permissions.is_empty());
    }

    #[tokio::test]
    async fn test_expired_link_matches_unknown_token() {
        let fx = fixture().await;
        let token = "c".repeat(32);
        link(
            &fx,
            &token,
            None,
            Some(Utc::now() - Duration::minutes(1)),
            vec![GrantPermission::View],
        )
        .await;

        let expired = fx.resolver.validate_link(&token, None).await.unwrap_err();
        let unknown = fx
            .resolver
            .validate_link(&"z".repeat(32), None)
            .await
            .unwrap_err();

        assert_eq!(expired.kind, ErrorKind::NotFound);
        assert_eq!(expired.kind, unknown.kind);
        assert_eq!(expired.message, unknown.message);
    }

    #[tokio::test]
    async fn test_password_required_then_invalid_then_ok() {
        let fx = fixture().await;
        let token = "d".repeat(32);
        link(&fx, &token, Some("hunter2"), None, vec![GrantPermission::View]).await;

        let missing = fx.resolver.validate_link(&token, None).await.unwrap_err();
        assert_eq!(missing.kind, ErrorKind::PasswordRequired);

        let wrong = fx
            .resolver
            .validate_link(&token, Some("hunter3"))
            .await
            .unwrap_err();
        assert_eq!(wrong.kind, ErrorKind::InvalidPassword);

        let ok = fx.resolver.validate_link(&token, Some("hunter2")).await.unwrap();
        assert_eq!(ok.permissions, vec![GrantPermission::View]);
    }

    #[tokio::test]
    async fn test_link_for_another_file_is_not_found() {
        let fx = fixture().await;
        let token = "e".repeat(32);
        link(&fx, &token, None, None, vec![GrantPermission::View]).await;
        let other = FileStore::create(
            fx.store.as_ref(),
            &CreateFile {
                owner_id: fx.owner,
                name: "other.txt".to_string(),
                size_bytes: 1,
                mime_type: "text/plain".to_string(),
                folder_id: None,
                object_ref: ObjectRef::new("cd/other"),
            },
        )
        .await
        .unwrap();

        let creds = LinkCredentials::token(&token);
        let err = fx
            .resolver
            .resolve_for(&other, None, Some(&creds))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let fx = fixture().await;
        let err = fx
            .resolver
            .resolve(FileId::new(), Some(fx.owner), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
