//! Personal storage server.
//!
//! Main entry point that wires the crates together and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use pss_api::{AppState, build_app};
use pss_auth::AuthService;
use pss_core::config::AppConfig;
use pss_core::error::AppError;
use pss_storage::StorageService;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from an explicit file or from the selected environment.
fn load_configuration() -> Result<AppConfig, AppError> {
    match std::env::var("PSS_CONFIG") {
        Ok(path) => AppConfig::load_file(&path),
        Err(_) => {
            let env = std::env::var("PSS_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting pss v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.uses_default_secret() {
        tracing::warn!("auth.token_secret is the built-in default; set PSS__AUTH__TOKEN_SECRET");
    }

    tracing::info!(backend = %config.database.backend, "Opening credential store...");
    let store = pss_database::build_store(&config.database).await?;

    let auth = AuthService::new(store, &config.auth);

    tracing::info!(root = %config.storage.root, "Preparing storage root...");
    let storage = StorageService::new(&config.storage).await?;
    tracing::info!(
        root = %storage.root().display(),
        max_upload_bytes = storage.max_upload_bytes(),
        "Storage ready"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, auth, storage);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("pss server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("pss server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
