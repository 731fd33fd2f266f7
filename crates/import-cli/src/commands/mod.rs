//! Command implementations for import-cli

pub mod batch;
pub mod explain;
pub mod validate;

pub use batch::{BatchArgs, run_batch, run_rescan};
pub use explain::run_explain;
pub use validate::run_validate;

use colored::Colorize;
use import_core::{ImportSettings, OperationSummary};
use import_fs::NormalizedPath;

use crate::error::{CliError, Result};

/// Load and validate the settings file, naming it in any error.
pub(crate) fn load_settings(path: &str) -> Result<ImportSettings> {
    let settings_path = NormalizedPath::new(path);
    if !settings_path.exists() {
        return Err(CliError::user(format!(
            "Settings file not found: {} (use --settings to point at one)",
            path
        )));
    }
    Ok(ImportSettings::load(&settings_path)?)
}

/// Print one planned operation as a line of text.
pub(crate) fn print_summary(summary: &OperationSummary) {
    match summary.action {
        "create-or-update" => {
            println!(
                "  {} {} -> {} @ {}",
                "+".green(),
                summary.path,
                summary.bucket.as_deref().unwrap_or_default().cyan(),
                summary.address.as_deref().unwrap_or_default()
            );
            if let Some(rule) = &summary.rule {
                println!("      {}: {}", "rule".dimmed(), rule);
            }
            if !summary.labels.is_empty() {
                println!("      {}: {}", "labels".dimmed(), summary.labels.join(", "));
            }
        }
        "remove" => println!("  {} {}", "-".red(), summary.path),
        _ => println!("  {} {}", "=".dimmed(), summary.path.dimmed()),
    }
}
