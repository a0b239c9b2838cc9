//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a serializable value as pretty JSON, or TOML-like key/value lines for tables.
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat) {
    let value = serde_json::to_value(item).unwrap_or(serde_json::Value::Null);
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
        OutputFormat::Table => print_section("", &value),
    }
}

fn print_section(prefix: &str, value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, inner) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                print_section(&name, inner);
            }
        }
        other => print_kv(prefix, &other.to_string()),
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<36} {}", format!("{key}:"), value);
}
