//! Asset Importer CLI
//!
//! Runs import batches against a catalog file from the command line.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialise logging: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} Asset Importer CLI", "importer".green().bold());
            println!();
            println!("Run {} for available commands.", "importer --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Run {
            project,
            created,
            deleted,
            moved_from,
            moved_to,
            exclude,
            dry_run,
            json,
        } => {
            let batch = commands::BatchArgs {
                created,
                deleted,
                moved_from,
                moved_to,
                exclude,
            };
            commands::run_batch(&project, batch, dry_run, json)
        }
        Commands::Rescan {
            folders,
            project,
            dry_run,
            json,
        } => commands::run_rescan(&project, &folders, dry_run, json),
        Commands::Validate { settings } => commands::run_validate(&settings),
        Commands::Explain {
            path,
            dir,
            settings,
            json,
        } => commands::run_explain(&settings, &path, dir, json),
    }
}
