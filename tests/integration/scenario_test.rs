//! Two users sharing one server end to end.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{ADMIN, ADMIN_PASSWORD, TestApp, with_token};

#[tokio::test]
async fn admin_and_user_full_session() {
    let app = TestApp::new().await;

    let alice = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.register(&alice, "bobbie", "Passw0rd1", false).await;
    let bob = app.login("bobbie", "Passw0rd1").await;

    let response = app.request("POST", &with_token("/auth/logout", &alice), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &with_token("/auth/user", &alice), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "AUTH_ERROR");

    let response = app.request("GET", &with_token("/auth/user", &bob), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "username": "bobbie", "admin": false }));

    let response = app.upload(&bob, "notes.txt", b"0123456789").await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let (status, bytes) = app.download(&with_token("/fs/notes.txt", &bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&bytes[..], b"0123456789");

    let response = app
        .request("DELETE", &with_token("/fs/notes.txt", &bob), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!app.storage_root().join("notes.txt").exists());

    let response = app.request("GET", &with_token("/fs/notes.txt", &bob), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "FS_ERROR");
    assert!(
        response.body["message"]
            .as_str()
            .unwrap()
            .contains("not found")
    );
}
