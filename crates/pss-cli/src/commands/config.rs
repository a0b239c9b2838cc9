//! Configuration inspection commands.

use clap::{Args, Subcommand};

use pss_core::config::AppConfig;
use pss_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets masked
    Show,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            output::print_item(&config.redacted(), format);
            if config.auth.uses_default_secret() {
                output::print_error("auth.token_secret is still the built-in default");
            }
        }
    }
    Ok(())
}
