//! Validate command implementation

use colored::Colorize;

use super::load_settings;
use crate::error::Result;

/// Run the validate command
///
/// Loading compiles every rule, so success means the file is usable as is.
pub fn run_validate(settings_path: &str) -> Result<()> {
    let settings = load_settings(settings_path)?;
    let rules = settings.rules();

    println!(
        "{} {} is valid: {} rules.",
        "OK".green().bold(),
        settings_path.cyan(),
        rules.len()
    );
    if rules.is_empty() {
        println!(
            "  {} No rules configured; batches will be refused.",
            "WARN".yellow().bold()
        );
    }

    for (index, rule) in rules.rules().iter().enumerate() {
        let definition = rule.definition();
        let bucket = if definition.bucket.trim().is_empty() {
            "<default>"
        } else {
            definition.bucket.as_str()
        };
        println!(
            "  {:>3}. {} -> {}",
            index + 1,
            rule.display_name(),
            bucket.cyan()
        );
    }
    Ok(())
}
