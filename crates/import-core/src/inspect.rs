//! Read-only path inspection for the plan phase

use crate::{Error, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Whether a path on disk is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
}

/// Answers "is this path a directory" without mutating anything.
pub trait PathInspector: Send + Sync {
    /// # Errors
    ///
    /// Returns [`Error::PathVanished`] if the path no longer exists.
    fn inspect(&self, path: &str) -> Result<PathKind>;
}

/// Inspects paths relative to a project root on disk.
#[derive(Debug, Clone)]
pub struct DiskInspector {
    root: PathBuf,
}

impl DiskInspector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PathInspector for DiskInspector {
    fn inspect(&self, path: &str) -> Result<PathKind> {
        let native = self.root.join(path.trim_end_matches('/'));
        let metadata = std::fs::metadata(&native).map_err(|_| Error::PathVanished {
            path: path.to_string(),
        })?;
        Ok(if metadata.is_dir() {
            PathKind::Directory
        } else {
            PathKind::File
        })
    }
}

/// A fixed set of known files and directories.
#[derive(Debug, Clone, Default)]
pub struct FixedInspector {
    files: BTreeSet<String>,
    directories: BTreeSet<String>,
}

impl FixedInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: impl Into<String>) -> Self {
        self.files.insert(path.into());
        self
    }

    pub fn directory(mut self, path: impl Into<String>) -> Self {
        self.directories.insert(path.into().trim_end_matches('/').to_string());
        self
    }
}

impl PathInspector for FixedInspector {
    fn inspect(&self, path: &str) -> Result<PathKind> {
        let bare = path.trim_end_matches('/');
        if self.directories.contains(bare) {
            Ok(PathKind::Directory)
        } else if self.files.contains(bare) {
            Ok(PathKind::File)
        } else {
            Err(Error::PathVanished {
                path: path.to_string(),
            })
        }
    }
}
