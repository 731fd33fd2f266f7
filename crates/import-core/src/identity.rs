//! Path to asset-identifier resolution

use import_fs::{AssetPath, checksum};
use std::collections::HashMap;
use std::path::PathBuf;

/// Maps a project path to the catalog's stable identifier.
pub trait AssetIdentity: Send + Sync {
    fn asset_id(&self, path: &AssetPath) -> Option<String>;
}

/// Reads the `guid:` line of the sidecar `<path>.meta` file.
///
/// Assets that exist but have no readable sidecar fall back to a digest of
/// the path, which stays stable for as long as the asset does not move. A
/// path with neither is unidentified.
#[derive(Debug, Clone)]
pub struct MetaFileIdentity {
    root: PathBuf,
}

impl MetaFileIdentity {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_guid(&self, path: &AssetPath) -> Option<String> {
        let meta = self.root.join(format!("{}.meta", path.as_str()));
        let content = std::fs::read_to_string(meta).ok()?;
        content.lines().find_map(|line| {
            let guid = line.trim().strip_prefix("guid:")?.trim();
            (!guid.is_empty()).then(|| guid.to_string())
        })
    }
}

impl AssetIdentity for MetaFileIdentity {
    fn asset_id(&self, path: &AssetPath) -> Option<String> {
        if path.as_str().is_empty() {
            return None;
        }
        self.read_guid(path).or_else(|| {
            if !self.root.join(path.as_str()).exists() {
                return None;
            }
            let digest = checksum::hex_digest(path.as_str());
            Some(digest[..32].to_string())
        })
    }
}

/// A fixed path-to-identifier table.
#[derive(Debug, Clone, Default)]
pub struct MappedIdentity {
    ids: HashMap<String, String>,
}

impl MappedIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, id: impl Into<String>) -> Self {
        self.insert(path, id);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, id: impl Into<String>) {
        let path = AssetPath::parse(&path.into()).as_str().to_string();
        self.ids.insert(path, id.into());
    }
}

impl AssetIdentity for MappedIdentity {
    fn asset_id(&self, path: &AssetPath) -> Option<String> {
        self.ids.get(path.as_str()).cloned()
    }
}
