//! Run and rescan command implementations
//!
//! Both commands load settings and the catalog file, run one batch against
//! the project on disk, and save the catalog only when the batch changed it.

use std::path::PathBuf;

use colored::Colorize;

use import_core::{
    BatchReport, ChangeSet, DiskInspector, Importer, MemoryCatalog, MetaFileIdentity,
    OperationSummary, collect_folder_paths, rescan_folders,
};
use import_fs::NormalizedPath;

use super::{load_settings, print_summary};
use crate::cli::ProjectArgs;
use crate::error::{CliError, Result};

/// Changed paths as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct BatchArgs {
    pub created: Vec<String>,
    pub deleted: Vec<String>,
    pub moved_from: Vec<String>,
    pub moved_to: Vec<String>,
    pub exclude: Vec<String>,
}

impl BatchArgs {
    fn into_change_set(self) -> Result<ChangeSet> {
        if self.moved_from.len() != self.moved_to.len() {
            return Err(CliError::user(format!(
                "--moved-from was given {} times but --moved-to {} times",
                self.moved_from.len(),
                self.moved_to.len()
            )));
        }

        let mut changes = ChangeSet::new()
            .created(self.created)
            .deleted(self.deleted);
        for (from, to) in self.moved_from.into_iter().zip(self.moved_to) {
            changes = changes.moved(from, to);
        }
        for path in self.exclude {
            changes = changes.exclude(path);
        }
        Ok(changes)
    }
}

/// Run the run command
pub fn run_batch(project: &ProjectArgs, batch: BatchArgs, dry_run: bool, json: bool) -> Result<()> {
    let changes = batch.into_change_set()?;
    if changes.is_empty() {
        return Err(CliError::user(
            "No paths given. Use --created, --deleted or --moved-from with --moved-to",
        ));
    }

    let settings = load_settings(&project.settings)?;
    let root = PathBuf::from(&project.root);
    let inspector = DiskInspector::new(root.clone());
    let identity = MetaFileIdentity::new(root);
    let importer = Importer::new(&settings, &inspector, &identity);

    if dry_run {
        let summaries: Vec<_> = importer.plan(&changes)?.iter().map(|op| op.summary()).collect();
        return print_plan(&summaries, json);
    }

    let catalog_path = NormalizedPath::new(&project.catalog);
    let mut catalog = MemoryCatalog::load_or_default(&catalog_path)?;
    let report = importer.run(&changes, &mut catalog)?;
    save_if_dirty(&catalog, &catalog_path, &report)?;
    print_report(&report, &catalog_path, json)
}

/// Run the rescan command
pub fn run_rescan(project: &ProjectArgs, folders: &[String], dry_run: bool, json: bool) -> Result<()> {
    let settings = load_settings(&project.settings)?;
    let root = PathBuf::from(&project.root);
    let inspector = DiskInspector::new(root.clone());
    let identity = MetaFileIdentity::new(root.clone());
    let importer = Importer::new(&settings, &inspector, &identity);

    if dry_run {
        let paths = collect_folder_paths(&root, folders);
        let summaries: Vec<_> = importer
            .plan(&ChangeSet::new().created(paths))?
            .iter()
            .map(|op| op.summary())
            .collect();
        return print_plan(&summaries, json);
    }

    let catalog_path = NormalizedPath::new(&project.catalog);
    let mut catalog = MemoryCatalog::load_or_default(&catalog_path)?;
    let report = rescan_folders(&importer, &root, folders, &mut catalog)?;
    save_if_dirty(&catalog, &catalog_path, &report)?;
    print_report(&report, &catalog_path, json)
}

fn save_if_dirty(catalog: &MemoryCatalog, path: &NormalizedPath, report: &BatchReport) -> Result<()> {
    if report.dirty {
        catalog.save(path)?;
        tracing::debug!(path = %path, "Catalog saved");
    }
    Ok(())
}

fn print_plan(summaries: &[OperationSummary], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summaries)?);
        return Ok(());
    }

    println!("{} Planned operations (dry run):", "=>".blue().bold());
    if summaries.is_empty() {
        println!("  {}", "Nothing to do".dimmed());
    }
    for summary in summaries {
        print_summary(summary);
    }
    Ok(())
}

fn print_report(report: &BatchReport, catalog_path: &NormalizedPath, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if report.skipped {
        println!("{} Settings-only batch skipped.", "OK".green().bold());
        return Ok(());
    }

    println!(
        "{} Batch imported: {} updated, {} removed.",
        "OK".green().bold(),
        report.updated,
        report.removed
    );

    for failure in &report.failures {
        println!("  {} {}: {}", "FAILED".yellow().bold(), failure.path, failure.error);
    }

    if report.dirty {
        println!("Catalog saved to {}", catalog_path.as_str().cyan());
    } else {
        println!("{}", "Catalog unchanged.".dimmed());
    }
    Ok(())
}
