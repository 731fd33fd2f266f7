//! Explain command implementation

use colored::Colorize;

use import_core::Planner;
use import_fs::AssetPath;

use super::{load_settings, print_summary};
use crate::error::Result;

/// Run the explain command
///
/// Shows what a created path would resolve to, without touching disk or
/// any catalog.
pub fn run_explain(settings_path: &str, path: &str, dir: bool, json: bool) -> Result<()> {
    let settings = load_settings(settings_path)?;
    let parsed = AssetPath::parse(path);
    let asset = if dir { parsed.with_dir(true) } else { parsed };

    let op = Planner::new(settings.rules()).plan(asset, None)?;
    let summary = op.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if op.is_noop() {
        println!("{} No rule matches {}", "=>".blue().bold(), summary.path.cyan());
        return Ok(());
    }

    println!("{} {}", "=>".blue().bold(), "Matched".bold());
    print_summary(&summary);
    Ok(())
}
