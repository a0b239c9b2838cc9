//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use pss_api::{AppState, build_app};
use pss_auth::{AuthService, PasswordHasher};
use pss_core::config::AppConfig;
use pss_database::{MemoryUserStore, UserStore};
use pss_storage::StorageService;

/// Admin account seeded into every test app.
pub const ADMIN: &str = "alice1";
/// Password of [`ADMIN`].
pub const ADMIN_PASSWORD: &str = "Secret123";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for driving services directly
    pub state: AppState,
    /// Credential store behind the auth service
    pub store: Arc<MemoryUserStore>,
    root: TempDir,
}

impl TestApp {
    /// Create a test application with default configuration
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application after adjusting the configuration
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let root = TempDir::new().expect("Failed to create temp root");

        let mut config = AppConfig::default();
        config.auth.token_secret = "integration-test-secret".to_string();
        config.storage.root = root.path().join("storage").display().to_string();
        config.logging.verbose = false;
        adjust(&mut config);

        let store = Arc::new(MemoryUserStore::new());
        let dyn_store: Arc<dyn UserStore> = store.clone();
        let auth = AuthService::with_hasher(dyn_store, &config.auth, fast_hasher());
        auth.bootstrap_admin(ADMIN, ADMIN_PASSWORD)
            .await
            .expect("Failed to seed admin");

        let storage = StorageService::new(&config.storage)
            .await
            .expect("Failed to init storage");

        let state = AppState::new(config, auth, storage);
        let router = build_app(state.clone());

        Self {
            router,
            state,
            store,
            root,
        }
    }

    /// Absolute path of the storage root on disk
    pub fn storage_root(&self) -> std::path::PathBuf {
        self.state.storage.root().to_path_buf()
    }

    /// Directory holding the storage root; outside the sandbox
    pub fn outside_root(&self) -> &std::path::Path {
        self.root.path()
    }

    /// Create a user through the admin API
    pub async fn register(&self, admin_token: &str, username: &str, password: &str, admin: bool) {
        let response = self
            .request(
                "POST",
                &with_token("/auth/register", admin_token),
                Some(serde_json::json!({
                    "username": username,
                    "password": BASE64.encode(password),
                    "admin": admin,
                })),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Register failed: {:?}",
            response.body
        );
    }

    /// Login with Basic credentials, returning the raw response
    pub async fn try_login(&self, username: &str, password: &str) -> TestResponse {
        let credentials = BASE64.encode(format!("{username}:{password}"));
        let req = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::AUTHORIZATION, format!("Basic {credentials}"))
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Login and return the session token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self.try_login(username, password).await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.body["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }

    /// Make a JSON request to the test app
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).expect("Failed to serialize body"))
            }
            None => Body::empty(),
        };
        let req = req.body(body).expect("Failed to build request");
        self.send(req).await
    }

    /// Upload raw bytes to `/fs/{path}`
    pub async fn upload(&self, token: &str, path: &str, bytes: &'static [u8]) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri(with_token(&format!("/fs/{path}"), token))
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .header(header::CONTENT_LENGTH, bytes.len())
            .body(Body::from(bytes))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// GET a path and return the raw body
    pub async fn download(&self, uri: &str) -> (StatusCode, Bytes) {
        let req = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        (status, bytes)
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let (status, bytes) = {
            let response = self
                .router
                .clone()
                .oneshot(req)
                .await
                .expect("Failed to send request");
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
                .await
                .expect("Failed to read body");
            (status, bytes)
        };
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, body }
    }
}

/// Append the session token to a URI
pub fn with_token(uri: &str, token: &str) -> String {
    let sep = if uri.contains('?') { '&' } else { '?' };
    format!("{uri}{sep}token={token}")
}

/// Argon2 parameters cheap enough for tests
pub fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_params(argon2::Params::new(8, 1, 1, None).expect("valid params"))
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// Assert the uniform error shape and return the `code`
    pub fn error_code(&self) -> &str {
        assert_eq!(self.body["error"], Value::Bool(true), "Not an error: {:?}", self.body);
        assert!(self.body["message"].is_string(), "No message: {:?}", self.body);
        self.body["code"].as_str().expect("No code in error body")
    }
}
