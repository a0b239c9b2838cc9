//! User management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use pss_core::config::AppConfig;
use pss_core::error::AppError;
use pss_entity::UserSummary;

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List all accounts
    List,
    /// Grant admin rights
    Promote {
        /// Target username
        username: String,
    },
    /// Remove admin rights
    Demote {
        /// Target username
        username: String,
    },
    /// Invalidate every outstanding session of a user
    Revoke {
        /// Target username
        username: String,
    },
    /// Issue a fresh one-time access code for password recovery
    Code {
        /// Target username
        username: String,
    },
}

/// Table row for user listing
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Admin")]
    admin: bool,
}

impl From<UserSummary> for UserRow {
    fn from(user: UserSummary) -> Self {
        Self {
            username: user.username,
            admin: user.admin,
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let auth = super::auth_service(config).await?;

    match &args.command {
        UserCommand::List => {
            let rows: Vec<UserRow> = auth
                .list_users()
                .await?
                .into_iter()
                .map(UserRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        UserCommand::Promote { username } => {
            auth.promote(username).await?;
            output::print_success(&format!("User '{username}' is now an admin"));
        }
        UserCommand::Demote { username } => {
            auth.demote(username).await?;
            output::print_success(&format!("User '{username}' is no longer an admin"));
        }
        UserCommand::Revoke { username } => {
            auth.revoke_sessions(username).await?;
            output::print_success(&format!("Sessions revoked for '{username}'"));
        }
        UserCommand::Code { username } => {
            let code = auth.create_temp_access_code(username).await?;
            match format {
                OutputFormat::Json => output::print_item(&serde_json::json!({ "code": code }), format),
                OutputFormat::Table => output::print_kv("Access code", &code),
            }
        }
    }

    Ok(())
}
