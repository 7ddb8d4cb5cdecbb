//! Folder tree: paths, moves, ownership and deletion.

use std::collections::{HashMap, HashSet};

use vaultbox_core::ErrorKind;
use vaultbox_core::types::FolderId;
use vaultbox_database::FolderStore;
use vaultbox_entity::folder::Folder;
use vaultbox_service::RequestContext;

use crate::helpers::{TestApp, new_user};

async fn all_folders(app: &TestApp, ctx: &RequestContext) -> HashMap<FolderId, Folder> {
    FolderStore::find_by_owner(app.store.as_ref(), ctx.user_id)
        .await
        .unwrap()
        .into_iter()
        .map(|f| (f.id, f))
        .collect()
}

/// Every path equals the joined ancestor names and no chain loops.
async fn assert_tree_consistent(app: &TestApp, ctx: &RequestContext) {
    let folders = all_folders(app, ctx).await;
    for folder in folders.values() {
        let mut names = Vec::new();
        let mut seen = HashSet::from([folder.id]);
        let mut next = folder.parent_id;
        while let Some(id) = next {
            assert!(seen.insert(id), "cycle through folder {}", folder.name);
            let parent = &folders[&id];
            names.push(parent.name.clone());
            next = parent.parent_id;
        }
        names.reverse();
        let expected = if names.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", names.join("/"))
        };
        assert_eq!(folder.path, expected, "path of {}", folder.name);
    }
}

#[tokio::test]
async fn test_rename_rewrites_descendant_paths() {
    let app = TestApp::new();
    let user = new_user();

    let a = app.folder(&user, "A", None).await;
    let b = app.folder(&user, "B", Some(a.id)).await;
    let c = app.folder(&user, "C", Some(b.id)).await;
    assert_eq!(a.path, "/");
    assert_eq!(b.path, "/A/");
    assert_eq!(c.path, "/A/B/");

    app.state
        .folder_service
        .rename_folder(&user, a.id, "A2")
        .await
        .unwrap();

    let b = app.stored_folder(b.id).await.unwrap();
    let c = app.stored_folder(c.id).await.unwrap();
    assert_eq!(b.path, "/A2/");
    assert_eq!(c.path, "/A2/B/");
    assert_tree_consistent(&app, &user).await;
}

#[tokio::test]
async fn test_move_rewrites_subtree_paths() {
    let app = TestApp::new();
    let user = new_user();

    let a = app.folder(&user, "A", None).await;
    let b = app.folder(&user, "B", Some(a.id)).await;
    let c = app.folder(&user, "C", Some(b.id)).await;
    let x = app.folder(&user, "X", None).await;

    let moved = app
        .state
        .folder_service
        .move_folder(&user, b.id, Some(x.id))
        .await
        .unwrap();
    assert_eq!(moved.parent_id, Some(x.id));
    assert_eq!(moved.path, "/X/");
    assert_eq!(app.stored_folder(c.id).await.unwrap().path, "/X/B/");

    app.state
        .folder_service
        .move_folder(&user, b.id, None)
        .await
        .unwrap();
    assert_eq!(app.stored_folder(c.id).await.unwrap().path, "/B/");
    assert_tree_consistent(&app, &user).await;
}

#[tokio::test]
async fn test_move_into_descendant_is_rejected() {
    let app = TestApp::new();
    let user = new_user();

    let a = app.folder(&user, "A", None).await;
    let b = app.folder(&user, "B", Some(a.id)).await;
    let c = app.folder(&user, "C", Some(b.id)).await;
    let before = all_folders(&app, &user).await;

    for target in [b.id, c.id, a.id] {
        let err = app
            .state
            .folder_service
            .move_folder(&user, a.id, Some(target))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidOperation);
    }

    assert_eq!(all_folders(&app, &user).await, before);
    assert_tree_consistent(&app, &user).await;
}

#[tokio::test]
async fn test_random_moves_keep_tree_acyclic() {
    let app = TestApp::new();
    let user = new_user();

    let mut ids = Vec::new();
    for i in 0..6 {
        let parent = if i == 0 { None } else { Some(ids[(i - 1) / 2]) };
        ids.push(app.folder(&user, &format!("F{i}"), parent).await.id);
    }

    // Deterministic sequence of moves, some of which must fail.
    let moves = [(1, Some(5)), (3, Some(0)), (0, Some(4)), (2, Some(1)), (5, None), (1, Some(2))];
    for (folder, target) in moves {
        let target = target.map(|t: usize| ids[t]);
        let _ = app
            .state
            .folder_service
            .move_folder(&user, ids[folder], target)
            .await;
        assert_tree_consistent(&app, &user).await;
    }
}

#[tokio::test]
async fn test_sibling_names_are_unique() {
    let app = TestApp::new();
    let user = new_user();

    let a = app.folder(&user, "Docs", None).await;
    let err = app
        .state
        .folder_service
        .create_folder(
            &user,
            vaultbox_service::folder::service::CreateFolderRequest {
                name: "Docs".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    // The same name under a different parent is fine.
    app.folder(&user, "Docs", Some(a.id)).await;
}

#[tokio::test]
async fn test_other_users_cannot_touch_folders() {
    let app = TestApp::new();
    let owner = new_user();
    let intruder = new_user();

    let a = app.folder(&owner, "A", None).await;
    let b = app.folder(&owner, "B", Some(a.id)).await;
    let before = all_folders(&app, &owner).await;

    let err = app
        .state
        .folder_service
        .rename_folder(&intruder, a.id, "stolen")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    let err = app
        .state
        .folder_service
        .delete_folder(&intruder, b.id, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    let err = app
        .state
        .folder_service
        .move_folder(&intruder, b.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    // Reads do not reveal the folder exists.
    let err = app
        .state
        .folder_service
        .get_folder(&intruder, a.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    assert_eq!(all_folders(&app, &owner).await, before);
}

#[tokio::test]
async fn test_delete_non_empty_folder_requires_cascade() {
    let app = TestApp::new();
    let user = new_user();

    let a = app.folder(&user, "A", None).await;
    let file = app.upload(&user, "note.txt", Some(a.id)).await;

    let err = app
        .state
        .folder_service
        .delete_folder(&user, a.id, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotEmpty);
    assert!(app.stored_folder(a.id).await.is_some());
    assert!(app.stored_file(file.id).await.is_some());
}

#[tokio::test]
async fn test_cascade_delete_removes_subtree_and_objects() {
    let app = TestApp::new();
    let user = new_user();

    let a = app.folder(&user, "A", None).await;
    let b = app.folder(&user, "B", Some(a.id)).await;
    let keep = app.folder(&user, "Keep", None).await;
    let in_a = app.upload(&user, "a.txt", Some(a.id)).await;
    let in_b = app.upload(&user, "b.txt", Some(b.id)).await;
    let kept = app.upload(&user, "k.txt", Some(keep.id)).await;

    let outcome = app
        .state
        .folder_service
        .delete_folder(&user, a.id, true)
        .await
        .unwrap();
    assert_eq!(outcome.folders_deleted, 2);
    assert_eq!(outcome.files_deleted, 2);

    assert!(app.stored_folder(a.id).await.is_none());
    assert!(app.stored_folder(b.id).await.is_none());
    assert!(app.stored_file(in_a.id).await.is_none());
    assert!(app.stored_file(in_b.id).await.is_none());
    assert!(!vaultbox_core::traits::ObjectStore::exists(&app.objects, &in_b.object_ref).await.unwrap());

    assert!(app.stored_folder(keep.id).await.is_some());
    assert!(app.stored_file(kept.id).await.is_some());
}

#[tokio::test]
async fn test_cascade_delete_stops_at_first_failure() {
    let app = TestApp::new();
    let user = new_user();

    let a = app.folder(&user, "A", None).await;
    let b = app.folder(&user, "B", Some(a.id)).await;
    let c = app.folder(&user, "C", Some(b.id)).await;
    let in_a = app.upload(&user, "a.txt", Some(a.id)).await;
    let in_b = app.upload(&user, "b.txt", Some(b.id)).await;

    // C is empty and goes first; B's file is the first object delete.
    app.objects.set_fail_deletes(true);
    let err = app
        .state
        .folder_service
        .delete_folder(&user, a.id, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalStore);

    assert!(app.stored_folder(c.id).await.is_none());
    assert!(app.stored_folder(b.id).await.is_some());
    assert!(app.stored_file(in_b.id).await.is_some());
    assert!(app.stored_folder(a.id).await.is_some());
    assert!(app.stored_file(in_a.id).await.is_some());
    assert!(vaultbox_core::traits::ObjectStore::exists(&app.objects, &in_a.object_ref).await.unwrap());
    assert!(vaultbox_core::traits::ObjectStore::exists(&app.objects, &in_b.object_ref).await.unwrap());

    app.objects.set_fail_deletes(false);
    let outcome = app
        .state
        .folder_service
        .delete_folder(&user, a.id, true)
        .await
        .unwrap();
    assert_eq!(outcome.folders_deleted, 2);
    assert_eq!(outcome.files_deleted, 2);
    assert!(app.stored_folder(a.id).await.is_none());
    assert_tree_consistent(&app, &user).await;
}

#[tokio::test]
async fn test_breadcrumbs_and_tree() {
    let app = TestApp::new();
    let user = new_user();

    let a = app.folder(&user, "A", None).await;
    let b = app.folder(&user, "B", Some(a.id)).await;
    let c = app.folder(&user, "C", Some(b.id)).await;
    app.folder(&user, "Z", None).await;

    let trail: Vec<String> = app
        .state
        .tree_service
        .breadcrumbs(&user, c.id)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(trail, vec!["A", "B", "C"]);

    let tree = app.state.tree_service.folder_tree(&user).await.unwrap();
    assert_eq!(tree.total_folders, 4);
    assert_eq!(tree.roots.len(), 2);
}

#[tokio::test]
async fn test_default_folders_are_created_once() {
    let app = TestApp::new();
    let user = new_user();

    let created = app
        .state
        .folder_service
        .create_default_folders(&user)
        .await
        .unwrap();
    assert_eq!(created.len(), 4);

    let again = app
        .state
        .folder_service
        .create_default_folders(&user)
        .await
        .unwrap();
    assert!(again.is_empty());
}
