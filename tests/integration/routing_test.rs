//! Unknown routes, public endpoints and the error body shape.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{ADMIN, ADMIN_PASSWORD, TestApp, with_token};

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "running": true }));
}

#[tokio::test]
async fn unknown_route_checks_session_first_by_default() {
    let app = TestApp::new().await;

    let anonymous = app.request("GET", "/does/not/exist", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.error_code(), "AUTH_ERROR");

    let token = app.login(ADMIN, ADMIN_PASSWORD).await;
    let known = app
        .request("GET", &with_token("/does/not/exist", &token), None)
        .await;
    assert_eq!(known.status, StatusCode::NOT_FOUND);
    assert_eq!(known.error_code(), "ROUTE_NOT_FOUND");
}

#[tokio::test]
async fn predictive_404_answers_before_session_check() {
    let app = TestApp::with_config(|c| c.server.predictive_404 = true).await;

    let response = app.request("GET", "/does/not/exist", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "ROUTE_NOT_FOUND");
}

#[tokio::test]
async fn garbage_token_is_auth_error() {
    let app = TestApp::new().await;
    let response = app
        .request("GET", &with_token("/auth/user", "not-a-jwt"), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "AUTH_ERROR");
}

#[tokio::test]
async fn malformed_json_is_validation_error() {
    let app = TestApp::new().await;
    let token = app.login(ADMIN, ADMIN_PASSWORD).await;

    let response = app
        .request(
            "POST",
            &with_token("/auth/user/promote", &token),
            Some(json!({ "user": "bobbie" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_FAILED");
}
