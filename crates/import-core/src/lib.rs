//! Rule-driven asset cataloguing
//!
//! Classifies batches of created, moved and deleted asset paths against an
//! ordered list of rules and turns the result into catalog mutations:
//!
//! - **Templates**: placeholder expansion over a rule match's capture groups
//! - **Rules**: pattern plus bucket, address and label templates
//! - **Matching**: first declared rule wins
//! - **Planning**: create-or-update, remove or no-op per path
//! - **Pipeline**: parallel planning, then serial application to a [`Catalog`]
//!
//! # Example
//!
//! ```no_run
//! use import_core::{
//!     ChangeSet, DiskInspector, ImportSettings, Importer, MemoryCatalog, MetaFileIdentity,
//! };
//! use import_fs::NormalizedPath;
//!
//! fn example() -> import_core::Result<()> {
//!     let settings = ImportSettings::load(&NormalizedPath::new("importer.toml"))?;
//!     let inspector = DiskInspector::new(".");
//!     let identity = MetaFileIdentity::new(".");
//!     let mut catalog = MemoryCatalog::default();
//!
//!     let importer = Importer::new(&settings, &inspector, &identity);
//!     let report = importer.run(&ChangeSet::new().created(["Assets/a.png"]), &mut catalog)?;
//!     assert!(report.failures.is_empty());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod identity;
pub mod inspect;
pub mod matcher;
pub mod memory;
pub mod merge;
pub mod operation;
pub mod pipeline;
pub mod planner;
pub mod rescan;
pub mod rule;
pub mod template;

pub use catalog::{Bucket, BucketSettings, Catalog, Entry};
pub use config::{ImportSettings, SettingsFile};
pub use error::{Error, Result};
pub use identity::{AssetIdentity, MappedIdentity, MetaFileIdentity};
pub use inspect::{DiskInspector, FixedInspector, PathInspector, PathKind};
pub use matcher::{RuleSet, find_match};
pub use memory::MemoryCatalog;
pub use operation::{OperationKind, OperationSummary, PlannedOperation, Resolution};
pub use pipeline::{BatchReport, ChangeSet, Importer, PathFailure};
pub use planner::Planner;
pub use rescan::{collect_folder_paths, rescan_folders};
pub use rule::{BucketRef, GroupBootstrap, LabelWriteMode, MatchType, Rule, RuleDefinition};
pub use template::Template;
