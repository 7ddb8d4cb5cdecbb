//! Access resolution, link validation, and content accounting.

use chrono::{Duration, Utc};

use vaultbox_auth::{AccessSource, LinkCredentials};
use vaultbox_core::ErrorKind;
use vaultbox_core::types::UrlMode;
use vaultbox_database::ShareLinkStore;
use vaultbox_entity::activity::{ActivityAction, ResourceType};
use vaultbox_entity::permission::{GrantPermission, Permission};
use vaultbox_entity::share::CreateShareLink;
use vaultbox_service::share::link::CreateLinkRequest;

use crate::helpers::{TestApp, new_user};

fn link_request(permissions: &[&str], password: Option<&str>) -> CreateLinkRequest {
    CreateLinkRequest {
        password: password.map(String::from),
        expires_in_days: None,
        permissions: Some(permissions.iter().map(|p| p.to_string()).collect()),
    }
}

#[tokio::test]
async fn test_owner_holds_every_permission() {
    let app = TestApp::new();
    let owner = new_user();
    let file = app.upload(&owner, "mine.txt", None).await;

    let decision = app
        .state
        .content_service
        .check_access(Some(&owner), file.id, None)
        .await
        .unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.source, AccessSource::Owner);
    for permission in [
        Permission::View,
        Permission::Download,
        Permission::Delete,
        Permission::Share,
    ] {
        assert!(decision.permissions.contains(permission));
    }
}

#[tokio::test]
async fn test_user_share_takes_precedence_over_link() {
    let app = TestApp::new();
    let owner = new_user();
    let friend = new_user();
    let file = app.upload(&owner, "shared.txt", None).await;

    app.state
        .share_service
        .share_with_user(&owner, file.id, friend.user_id, &["view"])
        .await
        .unwrap();
    let link = app
        .state
        .link_service
        .create_link(&owner, file.id, link_request(&["view", "download"], None))
        .await
        .unwrap();

    let decision = app
        .state
        .content_service
        .check_access(Some(&friend), file.id, None)
        .await
        .unwrap();
    assert_eq!(decision.source, AccessSource::UserShare);
    assert!(decision.permissions.contains(Permission::View));
    assert!(!decision.permissions.contains(Permission::Download));

    // Presenting the link does not widen the direct grant.
    let creds = LinkCredentials::token(link.token.clone());
    let decision = app
        .state
        .content_service
        .check_access(Some(&friend), file.id, Some(&creds))
        .await
        .unwrap();
    assert_eq!(decision.source, AccessSource::UserShare);
    assert!(!decision.permissions.contains(Permission::Download));

    let err = app
        .state
        .content_service
        .read_content(Some(&friend), file.id, UrlMode::Download, Some(&creds))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_stranger_without_grant_is_denied() {
    let app = TestApp::new();
    let owner = new_user();
    let file = app.upload(&owner, "private.txt", None).await;

    let decision = app
        .state
        .content_service
        .check_access(Some(&new_user()), file.id, None)
        .await
        .unwrap();
    assert!(!decision.allowed);
    assert!(decision.permissions.is_empty());
    assert_eq!(decision.source, AccessSource::Denied);

    let err = app
        .state
        .content_service
        .read_content(None, file.id, UrlMode::View, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_view_only_link_grants_view_but_not_download() {
    let app = TestApp::new();
    let owner = new_user();
    let file = app.upload(&owner, "photo.txt", None).await;
    let link = app
        .state
        .link_service
        .create_link(&owner, file.id, link_request(&["view"], None))
        .await
        .unwrap();
    assert_eq!(link.permissions, vec![GrantPermission::View]);

    let validated = app
        .state
        .link_service
        .validate_access(&link.token, None)
        .await
        .unwrap();
    assert_eq!(validated.id, link.id);

    let creds = LinkCredentials::token(link.token.clone());
    let decision = app
        .state
        .content_service
        .check_access(None, file.id, Some(&creds))
        .await
        .unwrap();
    assert_eq!(decision.source, AccessSource::Link);
    assert!(decision.permissions.contains(Permission::View));
    assert!(!decision.permissions.contains(Permission::Download));

    let err = app
        .state
        .content_service
        .read_link_content(&creds, UrlMode::Download)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_expired_and_unknown_tokens_fail_alike() {
    let app = TestApp::new();
    let owner = new_user();
    let file = app.upload(&owner, "old.txt", None).await;
    let expired = ShareLinkStore::create(
        app.store.as_ref(),
        &CreateShareLink {
            file_id: file.id,
            owner_id: owner.user_id,
            token: "expired-token-0000000000000000".to_string(),
            password_hash: None,
            expires_at: Some(Utc::now() - Duration::minutes(1)),
            permissions: vec![GrantPermission::View],
        },
    )
    .await
    .unwrap();

    let expired_err = app
        .state
        .link_service
        .validate_access(&expired.token, None)
        .await
        .unwrap_err();
    let unknown_err = app
        .state
        .link_service
        .validate_access("no-such-token", None)
        .await
        .unwrap_err();
    assert_eq!(expired_err.kind, ErrorKind::NotFound);
    assert_eq!(expired_err.kind, unknown_err.kind);
    assert_eq!(expired_err.message, unknown_err.message);
}

#[tokio::test]
async fn test_link_for_another_file_is_rejected() {
    let app = TestApp::new();
    let owner = new_user();
    let shared = app.upload(&owner, "shared.txt", None).await;
    let secret = app.upload(&owner, "secret.txt", None).await;
    let link = app
        .state
        .link_service
        .create_link(&owner, shared.id, Default::default())
        .await
        .unwrap();

    let creds = LinkCredentials::token(link.token);
    let err = app
        .state
        .content_service
        .check_access(None, secret.id, Some(&creds))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_password_protected_link() {
    let app = TestApp::new();
    let owner = new_user();
    let file = app.upload(&owner, "locked.txt", None).await;
    let link = app
        .state
        .link_service
        .create_link(&owner, file.id, link_request(&["view"], Some("s3cret")))
        .await
        .unwrap();
    assert!(link.has_password());

    let err = app
        .state
        .link_service
        .validate_access(&link.token, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PasswordRequired);

    let err = app
        .state
        .link_service
        .validate_access(&link.token, Some("wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidPassword);

    app.state
        .link_service
        .validate_access(&link.token, Some("s3cret"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_blank_password_leaves_link_open() {
    let app = TestApp::new();
    let owner = new_user();
    let file = app.upload(&owner, "open.txt", None).await;
    let link = app
        .state
        .link_service
        .create_link(&owner, file.id, link_request(&["view"], Some("   ")))
        .await
        .unwrap();
    assert!(!link.has_password());
    app.state
        .link_service
        .validate_access(&link.token, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_link_content_is_counted_and_logged_for_owner() {
    let app = TestApp::new();
    let owner = new_user();
    let file = app.upload(&owner, "count.txt", None).await;
    let link = app
        .state
        .link_service
        .create_link(&owner, file.id, Default::default())
        .await
        .unwrap();
    let creds = LinkCredentials::token(link.token.clone());

    let (read, data) = app
        .state
        .content_service
        .read_link_content(&creds, UrlMode::View)
        .await
        .unwrap();
    assert_eq!(read.id, file.id);
    assert_eq!(data, bytes::Bytes::from("content of count.txt"));
    app.state
        .content_service
        .read_link_content(&creds, UrlMode::Download)
        .await
        .unwrap();

    let stored = ShareLinkStore::find_by_id(app.store.as_ref(), link.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.views, 1);
    assert_eq!(stored.downloads, 1);

    let accesses = app
        .state
        .activity_service
        .for_resource(&owner, ResourceType::ShareLink, link.id.into_uuid(), 10)
        .await
        .unwrap();
    assert_eq!(accesses.len(), 2);
    assert!(accesses.iter().all(|a| a.action == ActivityAction::ShareAccess));
}

#[tokio::test]
async fn test_owner_download_is_logged() {
    let app = TestApp::new();
    let owner = new_user();
    let file = app.upload(&owner, "dl.txt", None).await;

    let url = app
        .state
        .content_service
        .file_url(Some(&owner), file.id, UrlMode::Download, None)
        .await
        .unwrap();
    assert_eq!(url.file_id, file.id);
    assert!(!url.url.is_empty());

    let entries = app
        .state
        .activity_service
        .for_resource(&owner, ResourceType::File, file.id.into_uuid(), 10)
        .await
        .unwrap();
    assert!(entries.iter().any(|a| a.action == ActivityAction::FileDownload));
    assert!(entries.iter().any(|a| a.action == ActivityAction::FileUpload));
}

#[tokio::test]
async fn test_link_expiry_must_be_in_range() {
    let app = TestApp::new();
    let owner = new_user();
    let file = app.upload(&owner, "exp.txt", None).await;

    for days in [0, 366] {
        let err = app
            .state
            .link_service
            .create_link(
                &owner,
                file.id,
                CreateLinkRequest {
                    expires_in_days: Some(days),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    let link = app
        .state
        .link_service
        .create_link(
            &owner,
            file.id,
            CreateLinkRequest {
                expires_in_days: Some(7),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(link.expires_at.unwrap() > Utc::now() + Duration::days(6));
}
