//! File records: upload, listing, search, tags, moves, deletion, bulk.

use std::sync::atomic::Ordering;

use bytes::Bytes;

use vaultbox_core::ErrorKind;
use vaultbox_core::traits::ObjectStore;
use vaultbox_core::types::{
    FileId, FileOrdering, FileSortKey, FolderId, PageRequest, PageResponse, SortDirection,
};
use vaultbox_database::FolderScope;
use vaultbox_entity::file::{File, MediaCategory};
use vaultbox_service::RequestContext;
use vaultbox_service::file::search::SearchQuery;
use vaultbox_service::file::upload::UploadRequest;

use crate::helpers::{TestApp, new_user};

async fn upload_typed(app: &TestApp, ctx: &RequestContext, name: &str, mime: &str) -> File {
    app.state
        .upload_service
        .upload(
            ctx,
            UploadRequest {
                name: name.to_string(),
                data: Bytes::from_static(b"0123456789"),
                mime_type: Some(mime.to_string()),
                folder_id: None,
            },
        )
        .await
        .unwrap()
}

async fn list(app: &TestApp, user: &RequestContext, scope: FolderScope) -> PageResponse<File> {
    app.state
        .file_service
        .list_files(user, scope, PageRequest::default(), FileOrdering::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_upload_stores_object_and_record() {
    let app = TestApp::new();
    let user = new_user();
    let folder = app.folder(&user, "Docs", None).await;

    let file = app.upload(&user, "a.txt", Some(folder.id)).await;
    assert_eq!(file.owner_id, user.user_id);
    assert_eq!(file.folder_id, Some(folder.id));
    assert_eq!(file.mime_type, "text/plain");
    assert_eq!(file.size_bytes, "content of a.txt".len() as i64);

    let data = app.objects.get(&file.object_ref).await.unwrap();
    assert_eq!(data, Bytes::from("content of a.txt"));
}

#[tokio::test]
async fn test_upload_into_foreign_folder_leaves_no_object() {
    let app = TestApp::new();
    let owner = new_user();
    let other = new_user();
    let folder = app.folder(&owner, "Private", None).await;

    let err = app
        .state
        .upload_service
        .upload(
            &other,
            UploadRequest {
                name: "x.txt".to_string(),
                data: Bytes::from_static(b"x"),
                mime_type: None,
                folder_id: Some(folder.id),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    let listed = app
        .state
        .file_service
        .list_files(&other, FolderScope::All, PageRequest::default(), FileOrdering::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 0);
}

#[tokio::test]
async fn test_empty_upload_is_rejected() {
    let app = TestApp::new();
    let user = new_user();
    let err = app
        .state
        .upload_service
        .upload(
            &user,
            UploadRequest {
                name: "empty.txt".to_string(),
                data: Bytes::new(),
                mime_type: None,
                folder_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_list_orders_and_pages() {
    let app = TestApp::new();
    let user = new_user();
    for name in ["b.txt", "c.txt", "a.txt"] {
        app.upload(&user, name, None).await;
    }
    app.upload(&new_user(), "other.txt", None).await;

    let ordering = FileOrdering::new(FileSortKey::Name, SortDirection::Asc);
    let first = app
        .state
        .file_service
        .list_files(&user, FolderScope::All, PageRequest::new(0, 2), ordering)
        .await
        .unwrap();
    assert_eq!(first.total, 3);
    assert!(first.has_more);
    let names: Vec<_> = first.items.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);

    let second = app
        .state
        .file_service
        .list_files(&user, FolderScope::All, PageRequest::new(2, 2), ordering)
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].name, "c.txt");
    assert!(!second.has_more);
}

#[tokio::test]
async fn test_list_scopes() {
    let app = TestApp::new();
    let user = new_user();
    let folder = app.folder(&user, "F", None).await;
    app.upload(&user, "root.txt", None).await;
    app.upload(&user, "inside.txt", Some(folder.id)).await;

    assert_eq!(list(&app, &user, FolderScope::All).await.total, 2);
    let root = list(&app, &user, FolderScope::Root).await;
    assert_eq!(root.total, 1);
    assert_eq!(root.items[0].name, "root.txt");
    let inside = list(&app, &user, FolderScope::Folder(folder.id)).await;
    assert_eq!(inside.items[0].name, "inside.txt");
}

#[tokio::test]
async fn test_tag_normalization_is_idempotent() {
    let app = TestApp::new();
    let user = new_user();
    let file = app.upload(&user, "t.txt", None).await;

    for _ in 0..2 {
        app.state
            .file_service
            .tag(&user, file.id, &["Work", "work", "WORK"])
            .await
            .unwrap();
    }
    let stored = app.stored_file(file.id).await.unwrap();
    assert_eq!(stored.tags, vec!["work".to_string()]);

    let untagged = app
        .state
        .file_service
        .untag(&user, file.id, &[" WORK "])
        .await
        .unwrap();
    assert!(untagged.tags.is_empty());
}

#[tokio::test]
async fn test_tag_vocabulary_and_suggestions() {
    let app = TestApp::new();
    let user = new_user();
    let a = app.upload(&user, "a.txt", None).await;
    let b = app.upload(&user, "b.txt", None).await;
    app.state
        .file_service
        .tag(&user, a.id, &["travel", "work"])
        .await
        .unwrap();
    app.state
        .file_service
        .tag(&user, b.id, &["travel", "taxes"])
        .await
        .unwrap();

    let counts = app.state.tag_service.user_tags(&user).await.unwrap();
    assert_eq!(counts[0].tag, "travel");
    assert_eq!(counts[0].count, 2);

    let suggested = app.state.tag_service.suggest_tags(&user, " T").await.unwrap();
    assert_eq!(suggested.len(), 2);
    assert_eq!(suggested[0], "travel");
    assert!(suggested.contains(&"taxes".to_string()));
}

#[tokio::test]
async fn test_search_combines_criteria() {
    let app = TestApp::new();
    let user = new_user();
    let report = upload_typed(&app, &user, "Quarterly Report.pdf", "application/pdf").await;
    upload_typed(&app, &user, "report-photo.jpg", "image/jpeg").await;
    upload_typed(&app, &user, "notes.txt", "text/plain").await;
    app.state
        .file_service
        .tag(&user, report.id, &["finance"])
        .await
        .unwrap();

    let by_name = app
        .state
        .search_service
        .search(
            &user,
            SearchQuery {
                name: Some("REPORT".to_string()),
                ..Default::default()
            },
            PageRequest::default(),
            FileOrdering::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_name.total, 2);

    let documents = app
        .state
        .search_service
        .search(
            &user,
            SearchQuery {
                name: Some("report".to_string()),
                category: Some(MediaCategory::Document),
                tags: vec!["Finance".to_string()],
                ..Default::default()
            },
            PageRequest::default(),
            FileOrdering::default(),
        )
        .await
        .unwrap();
    assert_eq!(documents.total, 1);
    assert_eq!(documents.items[0].id, report.id);
}

#[tokio::test]
async fn test_search_rejects_inverted_date_range() {
    let app = TestApp::new();
    let user = new_user();
    let now = chrono::Utc::now();
    let err = app
        .state
        .search_service
        .search(
            &user,
            SearchQuery {
                created_after: Some(now),
                created_before: Some(now - chrono::Duration::days(1)),
                ..Default::default()
            },
            PageRequest::default(),
            FileOrdering::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_move_file_checks_owner_and_target() {
    let app = TestApp::new();
    let owner = new_user();
    let intruder = new_user();
    let file = app.upload(&owner, "m.txt", None).await;
    let folder = app.folder(&owner, "Dest", None).await;
    let foreign = app.folder(&intruder, "Theirs", None).await;

    let err = app
        .state
        .file_service
        .move_file(&intruder, file.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    let err = app
        .state
        .file_service
        .move_file(&owner, file.id, Some(foreign.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(app.stored_file(file.id).await.unwrap().folder_id, None);

    let moved = app
        .state
        .file_service
        .move_file(&owner, file.id, Some(folder.id))
        .await
        .unwrap();
    assert_eq!(moved.folder_id, Some(folder.id));
}

#[tokio::test]
async fn test_delete_removes_object_record_and_grants() {
    let app = TestApp::new();
    let owner = new_user();
    let friend = new_user();
    let file = app.upload(&owner, "d.txt", None).await;
    let link = app
        .state
        .link_service
        .create_link(&owner, file.id, Default::default())
        .await
        .unwrap();
    app.state
        .share_service
        .share_with_user(&owner, file.id, friend.user_id, &["view"])
        .await
        .unwrap();

    let err = app
        .state
        .file_service
        .delete_file(&friend, file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    app.state.file_service.delete_file(&owner, file.id).await.unwrap();

    assert!(app.stored_file(file.id).await.is_none());
    assert!(!app.objects.exists(&file.object_ref).await.unwrap());
    let err = app
        .state
        .link_service
        .validate_access(&link.token, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(app.state.share_service.shared_with_me(&friend).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_object_delete_failure_keeps_record() {
    let app = TestApp::new();
    let user = new_user();
    let file = app.upload(&user, "keep.txt", None).await;

    app.objects.set_fail_deletes(true);
    let err = app
        .state
        .file_service
        .delete_file(&user, file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalStore);
    assert!(app.stored_file(file.id).await.is_some());
    assert!(app.objects.exists(&file.object_ref).await.unwrap());
}

#[tokio::test]
async fn test_record_delete_failure_can_be_retried() {
    let app = TestApp::new();
    let user = new_user();
    let file = app.upload(&user, "retry.txt", None).await;

    app.fail_record_deletes.store(true, Ordering::SeqCst);
    let err = app
        .state
        .file_service
        .delete_file(&user, file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalStore);
    assert!(app.stored_file(file.id).await.is_some());
    assert!(!app.objects.exists(&file.object_ref).await.unwrap());

    app.fail_record_deletes.store(false, Ordering::SeqCst);
    app.state.file_service.delete_file(&user, file.id).await.unwrap();
    assert!(app.stored_file(file.id).await.is_none());
}

#[tokio::test]
async fn test_bulk_delete_reports_each_item() {
    let app = TestApp::new();
    let user = new_user();
    let other = new_user();
    let a = app.upload(&user, "a.txt", None).await;
    let b = app.upload(&user, "b.txt", None).await;
    let foreign = app.upload(&other, "f.txt", None).await;
    let missing = FileId::new();

    let outcome = app
        .state
        .file_service
        .bulk_delete(&user, &[a.id, b.id, a.id, foreign.id, missing])
        .await
        .unwrap();
    assert_eq!(outcome.succeeded, vec![a.id, b.id]);
    assert_eq!(outcome.failed.len(), 2);
    assert_eq!(outcome.failed[0].file_id, foreign.id);
    assert_eq!(outcome.failed[0].kind, ErrorKind::Unauthorized);
    assert_eq!(outcome.failed[1].kind, ErrorKind::NotFound);
    assert!(app.stored_file(foreign.id).await.is_some());
}

#[tokio::test]
async fn test_bulk_move_validates_target_once() {
    let app = TestApp::new();
    let user = new_user();
    let files = [
        app.upload(&user, "1.txt", None).await,
        app.upload(&user, "2.txt", None).await,
    ];
    let ids: Vec<_> = files.iter().map(|f| f.id).collect();
    let folder = app.folder(&user, "Target", None).await;

    let outcome = app
        .state
        .file_service
        .bulk_move(&user, &ids, Some(folder.id))
        .await
        .unwrap();
    assert_eq!(outcome.succeeded.len(), 2);
    for id in &ids {
        assert_eq!(app.stored_file(*id).await.unwrap().folder_id, Some(folder.id));
    }

    let err = app
        .state
        .file_service
        .bulk_move(&user, &ids, Some(FolderId::new()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let too_many: Vec<_> = (0..101).map(|_| FileId::new()).collect();
    let err = app
        .state
        .file_service
        .bulk_delete(&user, &too_many)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}
