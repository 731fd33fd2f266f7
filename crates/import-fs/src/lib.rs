//! Filesystem layer for the asset importer
//!
//! Provides forward-slash path handling, typed asset paths that know whether
//! they name a directory, atomic writes and format-agnostic config loading.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::{ConfigStore, Format};
pub use error::{Error, Result};
pub use path::{AssetPath, NormalizedPath};
