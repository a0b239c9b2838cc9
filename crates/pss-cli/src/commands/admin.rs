//! Admin account bootstrap.

use clap::{Args, Subcommand};

use pss_core::config::AppConfig;
use pss_core::error::AppError;

use crate::output;

/// Arguments for admin commands
#[derive(Debug, Args)]
pub struct AdminArgs {
    /// Admin subcommand
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// Admin subcommands
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Create a new admin account
    Create {
        /// Username (will prompt if not provided)
        #[arg(short, long)]
        username: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
}

/// Execute admin commands
pub async fn execute(args: &AdminArgs, config: &AppConfig) -> Result<(), AppError> {
    let auth = super::auth_service(config).await?;

    match &args.command {
        AdminCommand::Create { username, password } => {
            let username = match username {
                Some(u) => u.clone(),
                None => dialoguer::Input::new()
                    .with_prompt("Admin username")
                    .interact_text()
                    .map_err(super::input_error)?,
            };

            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Admin password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()
                    .map_err(super::input_error)?,
            };

            let user = auth.bootstrap_admin(&username, &password).await?;
            output::print_success(&format!("Admin user '{}' created", user.username));
        }
    }

    Ok(())
}
