//! CLI command definitions and dispatch.

pub mod admin;
pub mod config;
pub mod user;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use pss_auth::AuthService;
use pss_core::config::{AppConfig, StoreBackend};
use pss_core::error::AppError;

use crate::output::OutputFormat;

/// Personal storage server administration
#[derive(Debug, Parser)]
#[command(name = "pss", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (`config/{env}.toml`)
    #[arg(short, long, default_value = "development", env = "PSS_ENV")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Admin account bootstrap
    Admin(admin::AdminArgs),
    /// User management
    User(user::UserArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.config)?;
        match &self.command {
            Commands::Admin(args) => admin::execute(args, &config).await,
            Commands::User(args) => user::execute(args, &config, self.format).await,
            Commands::Config(args) => config::execute(args, &config, self.format),
        }
    }
}

/// Build an auth service over the configured persistent store.
pub async fn auth_service(config: &AppConfig) -> Result<AuthService, AppError> {
    if config.database.backend != StoreBackend::Postgres {
        return Err(AppError::configuration(format!(
            "The '{}' backend is per-process; set database.backend = \"postgres\" to manage accounts",
            config.database.backend
        )));
    }
    let store = pss_database::build_store(&config.database).await?;
    Ok(AuthService::new(Arc::clone(&store), &config.auth))
}

/// Map a dialoguer prompt failure into an application error.
pub fn input_error(e: dialoguer::Error) -> AppError {
    AppError::internal(format!("Input error: {e}"))
}
