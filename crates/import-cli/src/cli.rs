//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};

/// Asset Importer - file assets into catalog buckets by rule
#[derive(Parser, Debug)]
#[command(name = "importer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Locations shared by commands that touch a project.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ProjectArgs {
    /// Import settings file (.toml, .json, .yaml)
    #[arg(short, long, env = "IMPORTER_SETTINGS", default_value = "importer.toml")]
    pub settings: String,

    /// Catalog file, created on first save
    #[arg(short, long, env = "IMPORTER_CATALOG", default_value = "catalog.json")]
    pub catalog: String,

    /// Project root that asset paths are relative to
    #[arg(short, long, default_value = ".")]
    pub root: String,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Import one batch of changed paths
    ///
    /// Examples:
    ///   importer run --created Assets/Sprites/a.png
    ///   importer run --moved-from Assets/old.png --moved-to Assets/new.png
    ///   importer run --deleted Assets/gone.png --dry-run
    Run {
        #[command(flatten)]
        project: ProjectArgs,

        /// Created or imported paths
        #[arg(long)]
        created: Vec<String>,

        /// Deleted paths
        #[arg(long)]
        deleted: Vec<String>,

        /// Prior paths of moves, paired in order with --moved-to
        #[arg(long)]
        moved_from: Vec<String>,

        /// New paths of moves, paired in order with --moved-from
        #[arg(long)]
        moved_to: Vec<String>,

        /// Paths to leave untouched in this batch
        #[arg(long)]
        exclude: Vec<String>,

        /// Show planned operations without changing the catalog
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Re-check every asset beneath the given folders
    Rescan {
        /// Project-relative folders to rescan
        #[arg(required = true)]
        folders: Vec<String>,

        #[command(flatten)]
        project: ProjectArgs,

        /// Show planned operations without changing the catalog
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Check that a settings file loads and every rule compiles
    Validate {
        /// Import settings file
        #[arg(short, long, env = "IMPORTER_SETTINGS", default_value = "importer.toml")]
        settings: String,
    },

    /// Show which rule matches a path and what it resolves to
    Explain {
        /// Project-relative asset path
        path: String,

        /// Treat the path as a directory
        #[arg(long)]
        dir: bool,

        /// Import settings file
        #[arg(short, long, env = "IMPORTER_SETTINGS", default_value = "importer.toml")]
        settings: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
