//! Normalized path handling for cross-platform compatibility

use std::fmt;
use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Converts to platform-native format only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: path_str.replace('\\', "/"),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

/// A project-relative asset path that knows whether it names a directory.
///
/// The stored path never carries a trailing separator. Rules that target
/// directories are written against [`AssetPath::match_key`], which appends
/// one, so `Art/Icons/` can only ever match the directory and never a file
/// literally called `Art/Icons`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AssetPath {
    path: String,
    is_dir: bool,
}

impl AssetPath {
    /// Create a path, normalizing separators and dropping trailing slashes.
    pub fn new(path: impl AsRef<str>, is_dir: bool) -> Self {
        let normalized = path.as_ref().replace('\\', "/");
        let trimmed = normalized.trim_end_matches('/');
        // A bare "/" trims to nothing; keep the root rather than an empty path
        let path = if trimmed.is_empty() && !normalized.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        };
        Self { path, is_dir }
    }

    pub fn file(path: impl AsRef<str>) -> Self {
        Self::new(path, false)
    }

    pub fn directory(path: impl AsRef<str>) -> Self {
        Self::new(path, true)
    }

    /// Parse a raw string where a trailing separator marks a directory.
    pub fn parse(raw: &str) -> Self {
        let is_dir = raw.ends_with('/') || raw.ends_with('\\');
        Self::new(raw, is_dir)
    }

    /// The same path, re-typed as a directory or file.
    pub fn with_dir(&self, is_dir: bool) -> Self {
        Self {
            path: self.path.clone(),
            is_dir,
        }
    }

    /// The bare path, without any trailing separator.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// The string rules are matched against: directories gain a trailing `/`.
    pub fn match_key(&self) -> String {
        if self.is_dir && !self.path.ends_with('/') {
            format!("{}/", self.path)
        } else {
            self.path.clone()
        }
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Last path segment without its extension. Dot-files keep their name.
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        if self.is_dir {
            return name;
        }
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }

    /// `/`-separated segments, skipping empty ones.
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// True if this path is `prefix` itself or lies beneath it.
    pub fn starts_with(&self, prefix: &str) -> bool {
        let prefix = prefix.trim_end_matches('/');
        self.path == prefix
            || (self.path.starts_with(prefix) && self.path[prefix.len()..].starts_with('/'))
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.match_key())
    }
}
