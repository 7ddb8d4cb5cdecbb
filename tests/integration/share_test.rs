//! User shares and share link lifecycle.

use chrono::{Duration, Utc};

use vaultbox_core::ErrorKind;
use vaultbox_database::ShareLinkStore;
use vaultbox_entity::permission::GrantPermission;
use vaultbox_entity::share::CreateShareLink;
use vaultbox_service::RequestContext;

use crate::helpers::{TestApp, new_user};

#[tokio::test]
async fn test_share_with_user_upserts_and_lists() {
    let app = TestApp::new();
    let owner = new_user();
    let friend = new_user();
    let file = app.upload(&owner, "plan.txt", None).await;

    let first = app
        .state
        .share_service
        .share_with_user(&owner, file.id, friend.user_id, &["view"])
        .await
        .unwrap();
    let second = app
        .state
        .share_service
        .share_with_user(&owner, file.id, friend.user_id, &["download", "view", "view"])
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(
        second.permissions,
        vec![GrantPermission::View, GrantPermission::Download]
    );

    let shares = app.state.share_service.file_shares(&owner, file.id).await.unwrap();
    assert_eq!(shares.len(), 1);

    let incoming = app.state.share_service.shared_with_me(&friend).await.unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].file.id, file.id);
    assert_eq!(incoming[0].share.id, first.id);
}

#[tokio::test]
async fn test_share_rules() {
    let app = TestApp::new();
    let owner = new_user();
    let friend = new_user();
    let file = app.upload(&owner, "rules.txt", None).await;

    let err = app
        .state
        .share_service
        .share_with_user(&owner, file.id, owner.user_id, &["view"])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidOperation);

    let err = app
        .state
        .share_service
        .share_with_user(&owner, file.id, friend.user_id, &["delete"])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidOperation);

    let none: [&str; 0] = [];
    let err = app
        .state
        .share_service
        .share_with_user(&owner, file.id, friend.user_id, &none)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidOperation);

    let err = app
        .state
        .share_service
        .share_with_user(&friend, file.id, owner.user_id, &["view"])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_share_with_email_uses_directory() {
    let app = TestApp::new();
    let owner = new_user();
    let friend = RequestContext::new(vaultbox_core::types::UserId::new())
        .with_identity(Some("Friend@Example.com".to_string()), Some("Friend".to_string()));
    app.state.user_service.sync_identity(&friend).await.unwrap();
    let file = app.upload(&owner, "mail.txt", None).await;

    let share = app
        .state
        .share_service
        .share_with_email(&owner, file.id, " friend@example.COM ", &["view"])
        .await
        .unwrap();
    assert_eq!(share.shared_with_id, friend.user_id);

    let err = app
        .state
        .share_service
        .share_with_email(&owner, file.id, "nobody@example.com", &["view"])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_remove_share_is_owner_only() {
    let app = TestApp::new();
    let owner = new_user();
    let friend = new_user();
    let file = app.upload(&owner, "rm.txt", None).await;
    let share = app
        .state
        .share_service
        .share_with_user(&owner, file.id, friend.user_id, &["view"])
        .await
        .unwrap();

    let err = app
        .state
        .share_service
        .remove_share(&friend, share.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    app.state.share_service.remove_share(&owner, share.id).await.unwrap();
    assert!(app.state.share_service.shared_with_me(&friend).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_link_creation_requires_ownership() {
    let app = TestApp::new();
    let owner = new_user();
    let file = app.upload(&owner, "own.txt", None).await;

    let err = app
        .state
        .link_service
        .create_link(&new_user(), file.id, Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    let link = app
        .state
        .link_service
        .create_link(&owner, file.id, Default::default())
        .await
        .unwrap();
    assert_eq!(
        link.permissions,
        vec![GrantPermission::View, GrantPermission::Download]
    );
    assert!(link.expires_at.is_none());
    assert_eq!(link.views, 0);
}

#[tokio::test]
async fn test_revoke_link() {
    let app = TestApp::new();
    let owner = new_user();
    let intruder = new_user();
    let file = app.upload(&owner, "rev.txt", None).await;
    let link = app
        .state
        .link_service
        .create_link(&owner, file.id, Default::default())
        .await
        .unwrap();

    let err = app
        .state
        .link_service
        .revoke(&intruder, link.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    app.state
        .link_service
        .validate_access(&link.token, None)
        .await
        .unwrap();

    app.state.link_service.revoke(&owner, link.id).await.unwrap();
    let err = app
        .state
        .link_service
        .validate_access(&link.token, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_list_active_hides_expired_and_sweep_removes_them() {
    let app = TestApp::new();
    let owner = new_user();
    let file = app.upload(&owner, "sweep.txt", None).await;
    let other = app.upload(&owner, "other.txt", None).await;

    let live = app
        .state
        .link_service
        .create_link(&owner, file.id, Default::default())
        .await
        .unwrap();
    app.state
        .link_service
        .create_link(&owner, other.id, Default::default())
        .await
        .unwrap();
    let expired = ShareLinkStore::create(
        app.store.as_ref(),
        &CreateShareLink {
            file_id: file.id,
            owner_id: owner.user_id,
            token: "stale-token-00000000000000000".to_string(),
            password_hash: None,
            expires_at: Some(Utc::now() - Duration::hours(1)),
            permissions: vec![GrantPermission::View],
        },
    )
    .await
    .unwrap();

    let active = app
        .state
        .link_service
        .list_active(&owner, Some(file.id))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, live.id);
    assert_eq!(
        app.state.link_service.list_active(&owner, None).await.unwrap().len(),
        2
    );

    assert_eq!(app.state.link_service.sweep_expired().await.unwrap(), 1);
    assert!(
        ShareLinkStore::find_by_id(app.store.as_ref(), expired.id)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(app.state.link_service.sweep_expired().await.unwrap(), 0);
}
