//! Login, session revocation and account management over HTTP.

use axum::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;

use pss_database::UserStore;

use crate::helpers::{ADMIN, ADMIN_PASSWORD, TestApp, with_token};

#[tokio::test]
async fn login_returns_token_that_verifies() {
    let app = TestApp::new().await;
    let token = app.login(ADMIN, ADMIN_PASSWORD).await;

    let response = app.request("GET", &with_token("/auth/user", &token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], ADMIN);
    assert_eq!(response.body["admin"], true);
    assert!(response.body.get("password_hash").is_none());
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_identical() {
    let app = TestApp::new().await;

    let wrong = app.try_login(ADMIN, "Wrong12345").await;
    let unknown = app.try_login("nobody1", "Wrong12345").await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.error_code(), "AUTH_ERROR");
    assert_eq!(wrong.body, unknown.body);
}

#[tokio::test]
async fn login_without_basic_header_is_rejected() {
    let app = TestApp::new().await;
    let response = app.request("POST", "/auth/login", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "AUTH_ERROR");
}

#[tokio::test]
async fn logout_invalidates_unexpired_token() {
    let app = TestApp::new().await;
    let token = app.login(ADMIN, ADMIN_PASSWORD).await;

    let response = app.request("POST", &with_token("/auth/logout", &token), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &with_token("/auth/user", &token), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "AUTH_ERROR");
}

#[tokio::test]
async fn renew_supersedes_previous_token() {
    let app = TestApp::new().await;
    let old = app.login(ADMIN, ADMIN_PASSWORD).await;

    let response = app.request("POST", &with_token("/auth/renew", &old), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let new = response.body["token"].as_str().unwrap().to_string();
    assert_ne!(old, new);

    let stale = app.request("GET", &with_token("/auth/user", &old), None).await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let fresh = app.request("GET", &with_token("/auth/user", &new), None).await;
    assert_eq!(fresh.status, StatusCode::OK);
}

#[tokio::test]
async fn second_login_supersedes_first() {
    let app = TestApp::new().await;
    let first = app.login(ADMIN, ADMIN_PASSWORD).await;
    let second = app.login(ADMIN, ADMIN_PASSWORD).await;

    let response = app.request("GET", &with_token("/auth/user", &first), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    let response = app.request("GET", &with_token("/auth/user", &second), None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn register_requires_admin_and_valid_password() {
    let app = TestApp::new().await;
    let admin = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.register(&admin, "bobbie", "Passw0rd1", false).await;
    let bob = app.login("bobbie", "Passw0rd1").await;

    let body = json!({ "username": "carol1", "password": BASE64.encode("Passw0rd1"), "admin": false });
    let response = app
        .request("POST", &with_token("/auth/register", &bob), Some(body))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "PERMISSION_ERROR");

    let body = json!({ "username": "carol1", "password": BASE64.encode("nodigits!!"), "admin": false });
    let response = app
        .request("POST", &with_token("/auth/register", &admin), Some(body))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_FAILED");

    let body = json!({ "username": "bobbie", "password": BASE64.encode("Passw0rd1"), "admin": false });
    let response = app
        .request("POST", &with_token("/auth/register", &admin), Some(body))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "CONFLICT_ERROR");
}

#[tokio::test]
async fn users_listing_is_admin_only() {
    let app = TestApp::new().await;
    let admin = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.register(&admin, "bobbie", "Passw0rd1", false).await;
    let bob = app.login("bobbie", "Passw0rd1").await;

    let response = app.request("GET", &with_token("/auth/users", &admin), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec![ADMIN, "bobbie"]);

    let response = app.request("GET", &with_token("/auth/users", &bob), None).await;
    assert_eq!(response.error_code(), "PERMISSION_ERROR");
}

#[tokio::test]
async fn access_code_recovery_is_one_time() {
    let app = TestApp::new().await;
    let admin = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.register(&admin, "bobbie", "Passw0rd1", false).await;

    let response = app
        .request(
            "POST",
            &with_token("/auth/user/code", &admin),
            Some(json!({ "username": "bobbie" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let code = response.body["code"].as_str().unwrap().to_string();

    let wrong = app
        .request(
            "PUT",
            "/auth/recover",
            Some(json!({ "username": "bobbie", "password": BASE64.encode("NewPassw0rd"), "code": "ZZZZZZ" })),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let body = json!({
        "username": "bobbie",
        "password": BASE64.encode("NewPassw0rd"),
        "code": code.to_lowercase(),
    });
    let response = app.request("PUT", "/auth/recover", Some(body.clone())).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    app.login("bobbie", "NewPassw0rd").await;

    let replay = app.request("PUT", "/auth/recover", Some(body)).await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_access_code_is_rejected() {
    let app = TestApp::with_config(|c| c.auth.access_code_expiration_ms = 1_000).await;
    let admin = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.register(&admin, "bobbie", "Passw0rd1", false).await;

    let issued_at = chrono::Utc::now().timestamp_millis() - 60_000;
    assert!(app.store.set_access_code("bobbie", "ABCDEF", issued_at).await.unwrap());

    let response = app
        .request(
            "PUT",
            "/auth/recover",
            Some(json!({ "username": "bobbie", "password": BASE64.encode("NewPassw0rd"), "code": "ABCDEF" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "AUTH_ERROR");
    app.login("bobbie", "Passw0rd1").await;
}

#[tokio::test]
async fn password_change_kills_sessions() {
    let app = TestApp::new().await;
    let admin = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.register(&admin, "bobbie", "Passw0rd1", false).await;
    let bob = app.login("bobbie", "Passw0rd1").await;

    let response = app
        .request(
            "PUT",
            &with_token("/auth/user", &admin),
            Some(json!({ "username": "bobbie", "password": BASE64.encode("Rotated123") })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &with_token("/auth/user", &bob), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    app.login("bobbie", "Rotated123").await;
}

#[tokio::test]
async fn non_admin_needs_code_to_change_own_password() {
    let app = TestApp::new().await;
    let admin = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.register(&admin, "bobbie", "Passw0rd1", false).await;
    let bob = app.login("bobbie", "Passw0rd1").await;

    let response = app
        .request(
            "PUT",
            &with_token("/auth/user", &bob),
            Some(json!({ "username": "bobbie", "password": BASE64.encode("Rotated123") })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            "PUT",
            &with_token("/auth/user", &bob),
            Some(json!({ "username": ADMIN, "password": BASE64.encode("Rotated123"), "code": "ABCDEF" })),
        )
        .await;
    assert_eq!(response.error_code(), "PERMISSION_ERROR");
}

#[tokio::test]
async fn promote_demote_and_last_admin_guard() {
    let app = TestApp::new().await;
    let admin = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.register(&admin, "bobbie", "Passw0rd1", false).await;

    let response = app
        .request(
            "POST",
            &with_token("/auth/user/demote", &admin),
            Some(json!({ "username": ADMIN })),
        )
        .await;
    assert_eq!(response.error_code(), "PERMISSION_ERROR");

    let response = app
        .request(
            "POST",
            &with_token("/auth/user/promote", &admin),
            Some(json!({ "username": "bobbie" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "POST",
            &with_token("/auth/user/demote", &admin),
            Some(json!({ "username": "bobbie" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!app.store.find("bobbie").await.unwrap().unwrap().admin);
}

#[tokio::test]
async fn admin_revoke_ends_user_sessions() {
    let app = TestApp::new().await;
    let admin = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.register(&admin, "bobbie", "Passw0rd1", false).await;
    let bob = app.login("bobbie", "Passw0rd1").await;

    let response = app
        .request(
            "POST",
            &with_token("/auth/user/revoke", &admin),
            Some(json!({ "username": "bobbie" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &with_token("/auth/user", &bob), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn delete_user_rules() {
    let app = TestApp::new().await;
    let admin = app.login(ADMIN, ADMIN_PASSWORD).await;
    app.register(&admin, "bobbie", "Passw0rd1", false).await;
    app.register(&admin, "carol1", "Passw0rd1", false).await;
    let bob = app.login("bobbie", "Passw0rd1").await;

    let response = app
        .request(
            "DELETE",
            &with_token("/auth/user", &bob),
            Some(json!({ "username": "carol1" })),
        )
        .await;
    assert_eq!(response.error_code(), "PERMISSION_ERROR");

    let response = app
        .request(
            "DELETE",
            &with_token("/auth/user", &bob),
            Some(json!({ "username": "bobbie" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(app.store.find("bobbie").await.unwrap().is_none());

    let response = app
        .request(
            "DELETE",
            &with_token("/auth/user", &admin),
            Some(json!({ "username": "carol1" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}
