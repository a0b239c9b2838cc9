//! Browsing, transfer, search and quota over HTTP.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use crate::helpers::{ADMIN, ADMIN_PASSWORD, TestApp, with_token};

#[tokio::test]
async fn upload_then_download_round_trips() {
    let app = TestApp::new().await;
    let token = app.login(ADMIN, ADMIN_PASSWORD).await;

    let response = app.upload(&token, "docs/report.txt", b"quarterly numbers").await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let (status, bytes) = app
        .download(&with_token("/fs/docs/report.txt", &token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&bytes[..], b"quarterly numbers");
}

#[tokio::test]
async fn directory_listing_is_tagged_and_sorted() {
    let app = TestApp::new().await;
    let token = app.login(ADMIN, ADMIN_PASSWORD).await;

    app.upload(&token, "b.txt", b"b").await;
    app.upload(&token, "a.txt", b"a").await;
    let response = app
        .request("POST", &with_token("/fs/zeta?dir=true", &token), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &with_token("/fs", &token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let children = response.body["children"].as_array().unwrap();
    let summary: Vec<(&str, &str)> = children
        .iter()
        .map(|c| (c["type"].as_str().unwrap(), c["name"].as_str().unwrap()))
        .collect();
    assert_eq!(
        summary,
        vec![("directory", "zeta"), ("file", "a.txt"), ("file", "b.txt")]
    );

    let trailing = app.request("GET", &with_token("/fs/", &token), None).await;
    assert_eq!(trailing.body, response.body);
}

#[tokio::test]
async fn traversal_is_rejected_and_nothing_outside_is_touched() {
    let app = TestApp::new().await;
    let token = app.login(ADMIN, ADMIN_PASSWORD).await;
    let outside = app.outside_root().join("secret.txt");
    std::fs::write(&outside, b"keep out").unwrap();

    for path in ["../secret.txt", "a/../../secret.txt", "%2E%2E/secret.txt"] {
        let response = app
            .request("DELETE", &with_token(&format!("/fs/{path}"), &token), None)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(response.error_code(), "FS_ERROR");
    }

    assert!(outside.exists());
}

#[tokio::test]
async fn upload_requires_octet_stream_and_length() {
    let app = TestApp::new().await;
    let token = app.login(ADMIN, ADMIN_PASSWORD).await;

    let req = Request::builder()
        .method("POST")
        .uri(with_token("/fs/x.txt", &token))
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::CONTENT_LENGTH, 3)
        .body(Body::from("abc"))
        .unwrap();
    let response = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!app.storage_root().join("x.txt").exists());
}

#[tokio::test]
async fn upload_over_limit_fails_before_writing() {
    // ~1 byte limit
    let app = TestApp::with_config(|c| c.storage.max_upload_size_gb = 1e-9).await;
    let token = app.login(ADMIN, ADMIN_PASSWORD).await;

    let response = app.upload(&token, "big.bin", b"0123456789").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "FS_ERROR");
    assert!(!app.storage_root().join("big.bin").exists());
}

#[tokio::test]
async fn delete_root_always_fails() {
    let app = TestApp::new().await;
    let token = app.login(ADMIN, ADMIN_PASSWORD).await;

    for uri in ["/fs/.", "/fs/./"] {
        let response = app.request("DELETE", &with_token(uri, &token), None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.error_code(), "FS_ERROR");
    }
    assert!(app.storage_root().exists());
}

#[tokio::test]
async fn search_finds_every_match_at_any_depth() {
    let app = TestApp::new().await;
    let token = app.login(ADMIN, ADMIN_PASSWORD).await;

    app.upload(&token, "report.txt", b"1").await;
    app.upload(&token, "deep/er/old-report.md", b"2").await;
    app.upload(&token, "deep/notes.txt", b"3").await;
    app.request("POST", &with_token("/fs/reports?dir=true", &token), None)
        .await;

    let response = app
        .request("GET", &with_token("/search?query=report", &token), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let mut names: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["old-report.md", "report.txt", "reports"]);
}

#[tokio::test]
async fn search_requires_query() {
    let app = TestApp::new().await;
    let token = app.login(ADMIN, ADMIN_PASSWORD).await;

    let response = app.request("GET", &with_token("/search", &token), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_FAILED");
}

#[tokio::test]
async fn space_reports_totals() {
    let app = TestApp::new().await;
    let token = app.login(ADMIN, ADMIN_PASSWORD).await;

    let response = app.request("GET", &with_token("/space", &token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let total = response.body["total"].as_u64().unwrap();
    let free = response.body["free"].as_u64().unwrap();
    assert!(total > 0);
    assert!(free <= total);
}

#[tokio::test]
async fn fs_routes_need_a_session() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/fs", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "AUTH_ERROR");
}
