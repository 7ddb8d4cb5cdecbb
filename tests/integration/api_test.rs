//! HTTP surface: routing, status mapping, envelopes, and headers.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use vaultbox_core::types::UserId;

use crate::helpers::{TestApp, ctx, new_user};

#[tokio::test]
async fn test_health_reports_storage() {
    let app = TestApp::new();
    let res = app.request("GET", "/api/health", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.data()["status"], "ok");
    assert_eq!(res.data()["storage_provider"], "memory");
}

#[tokio::test]
async fn test_missing_or_bad_token_is_401() {
    let app = TestApp::new();
    let res = app.request("GET", "/api/folders", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], "AUTHENTICATION");

    let res = app
        .request("GET", "/api/folders", None, Some("not-a-jwt"))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_folder_returns_created_envelope() {
    let app = TestApp::new();
    let user = UserId::new();
    let token = app.token(user, Some("me@example.com"));

    let res = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "name": "Projects", "color": "#ff0000" })),
            Some(&token),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.data()["name"], "Projects");
    assert_eq!(res.data()["path"], "/");
    assert_eq!(res.data()["owner_id"], user.to_string());

    let res = app
        .request("POST", "/api/folders", Some(json!({ "name": "" })), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "VALIDATION");

    let res = app.request("GET", "/api/me", None, Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["email"], "me@example.com");
}

#[tokio::test]
async fn test_error_kinds_map_to_statuses() {
    let app = TestApp::new();
    let owner = UserId::new();
    let intruder = UserId::new();
    let parent = app.folder(&ctx(owner), "Parent", None).await;
    app.folder(&ctx(owner), "Child", Some(parent.id)).await;

    let owner_token = app.token(owner, None);
    let intruder_token = app.token(intruder, None);

    let res = app
        .request("DELETE", &format!("/api/folders/{}", parent.id), None, Some(&owner_token))
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["error"], "NOT_EMPTY");

    let res = app
        .request(
            "DELETE",
            &format!("/api/folders/{}", parent.id),
            None,
            Some(&intruder_token),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .request("GET", &format!("/api/folders/{}", parent.id), None, Some(&intruder_token))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .request(
            "DELETE",
            &format!("/api/folders/{}?cascade=true", parent.id),
            None,
            Some(&owner_token),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["folders_deleted"], 2);
}

#[tokio::test]
async fn test_multipart_upload() {
    let app = TestApp::new();
    let user = UserId::new();
    let token = app.token(user, None);
    let folder = app.folder(&ctx(user), "Inbox", None).await;

    let boundary = "vaultbox-test-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"folder_id\"\r\n\r\n\
         {folder}\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"hello.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         hello world\r\n\
         --{b}--\r\n",
        b = boundary,
        folder = folder.id,
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/files")
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let res = app.send(request).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["name"], "hello.txt");
    assert_eq!(res.data()["mime_type"], "text/plain");
    assert_eq!(res.data()["size_bytes"], 11);
    assert_eq!(res.data()["folder_id"], folder.id.to_string());

    let res = app
        .request(
            "GET",
            &format!("/api/files?folder_id={}", folder.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["total"], 1);
}

#[tokio::test]
async fn test_content_headers() {
    let app = TestApp::new();
    let user = UserId::new();
    let token = app.token(user, None);
    let file = app.upload(&ctx(user), "report \"final\".txt", None).await;

    let res = app
        .request(
            "GET",
            &format!("/api/files/{}/content?mode=download", file.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.content_type.as_deref(), Some("text/plain"));
    assert_eq!(&res.raw[..], b"content of report \"final\".txt");

    let request = Request::builder()
        .uri(format!("/api/files/{}/content", file.id))
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router(), request).await.unwrap();
    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(disposition, "inline; filename=\"report _final_.txt\"");
}

#[tokio::test]
async fn test_public_link_flow() {
    let app = TestApp::new();
    let owner = new_user();
    let token = app.token(owner.user_id, None);
    let file = app.upload(&owner, "public.txt", None).await;

    let res = app
        .request(
            "POST",
            &format!("/api/files/{}/links", file.id),
            Some(json!({ "password": "open sesame", "permissions": ["view"] })),
            Some(&token),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["has_password"], true);
    assert!(res.data().get("password_hash").is_none());
    let share_token = res.data()["token"].as_str().unwrap().to_string();

    let res = app
        .request("GET", &format!("/api/s/{share_token}"), None, None)
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], "PASSWORD_REQUIRED");

    let res = app
        .request(
            "POST",
            &format!("/api/s/{share_token}"),
            Some(json!({ "password": "wrong" })),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], "INVALID_PASSWORD");

    let res = app
        .request(
            "POST",
            &format!("/api/s/{share_token}"),
            Some(json!({ "password": "open sesame" })),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["name"], "public.txt");
    assert_eq!(res.data()["views"], 1);

    let request = Request::builder()
        .uri(format!("/api/s/{share_token}/content"))
        .header("x-share-password", "open sesame")
        .body(Body::empty())
        .unwrap();
    let res = app.send(request).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(&res.raw[..], b"content of public.txt");

    let request = Request::builder()
        .uri(format!("/api/s/{share_token}/content?mode=download"))
        .header("x-share-password", "open sesame")
        .body(Body::empty())
        .unwrap();
    let res = app.send(request).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .request("GET", "/api/s/unknown-token", None, None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_delete_over_http() {
    let app = TestApp::new();
    let user = new_user();
    let token = app.token(user.user_id, None);
    let a = app.upload(&user, "a.txt", None).await;
    let foreign = app.upload(&new_user(), "b.txt", None).await;

    let res = app
        .request(
            "POST",
            "/api/files/bulk/delete",
            Some(json!({ "file_ids": [a.id, foreign.id] })),
            Some(&token),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["succeeded"].as_array().unwrap().len(), 1);
    assert_eq!(res.data()["failed"][0]["kind"], "Unauthorized");

    let res = app
        .request(
            "POST",
            "/api/files/bulk/delete",
            Some(json!({ "file_ids": [] })),
            Some(&token),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_quick_search_returns_files_and_folders() {
    let app = TestApp::new();
    let user = new_user();
    let token = app.token(user.user_id, None);
    let folder = app.folder(&user, "Invoices", None).await;
    app.upload(&user, "invoice-march.txt", Some(folder.id)).await;
    app.upload(&user, "holiday.txt", None).await;

    let res = app
        .request("GET", "/api/search?q=INVOICE", None, Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["files"][0]["name"], "invoice-march.txt");
    assert_eq!(res.data()["folders"][0]["id"], json!(folder.id));
    assert_eq!(res.data()["total"], 2);

    let res = app.request("GET", "/api/search?q=", None, Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["total"], 0);

    let res = app.request("GET", "/api/search?q=invoice", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}
