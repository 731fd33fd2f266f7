//! Serializable in-memory catalog

use crate::catalog::{Bucket, BucketSettings, Catalog, Entry};
use crate::{Error, Result};
use import_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Bucket name used by [`MemoryCatalog::default`].
pub const DEFAULT_BUCKET: &str = "Default";

/// A [`Catalog`] held in memory and persisted as a single file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryCatalog {
    default_bucket: String,
    #[serde(default)]
    buckets: BTreeMap<String, Bucket>,
    #[serde(default)]
    entries: BTreeMap<String, Entry>,
    #[serde(default)]
    labels: BTreeSet<String>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET)
    }
}

impl MemoryCatalog {
    /// Create a catalog containing only its default bucket.
    pub fn new(default_bucket: impl Into<String>) -> Self {
        let default_bucket = default_bucket.into();
        let mut buckets = BTreeMap::new();
        buckets.insert(
            default_bucket.clone(),
            Bucket {
                name: default_bucket.clone(),
                settings: BucketSettings::new(),
            },
        );
        Self {
            default_bucket,
            buckets,
            entries: BTreeMap::new(),
            labels: BTreeSet::new(),
        }
    }

    /// Load from a TOML, JSON or YAML file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let mut catalog: Self = ConfigStore::new().load(path)?;
        if !catalog.buckets.contains_key(&catalog.default_bucket) {
            let name = catalog.default_bucket.clone();
            catalog.buckets.insert(
                name.clone(),
                Bucket {
                    name,
                    settings: BucketSettings::new(),
                },
            );
        }
        Ok(catalog)
    }

    /// Load from `path`, or start empty if the file does not exist.
    pub fn load_or_default(path: &NormalizedPath) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        Ok(())
    }

    /// Add a bucket directly, bypassing the importer.
    pub fn insert_bucket(&mut self, name: impl Into<String>, settings: BucketSettings) {
        let name = name.into();
        self.buckets.insert(name.clone(), Bucket { name, settings });
    }

    /// Add or replace an entry directly, bypassing the importer.
    pub fn insert_entry(&mut self, entry: Entry) {
        self.entries.insert(entry.asset_id.clone(), entry);
    }

    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.values()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }
}

impl Catalog for MemoryCatalog {
    fn default_bucket(&self) -> &str {
        &self.default_bucket
    }

    fn find_bucket(&self, name: &str) -> Option<&Bucket> {
        self.buckets.get(name)
    }

    fn create_bucket(&mut self, name: &str, schema: BucketSettings) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::catalog("bucket name is empty"));
        }
        if self.buckets.contains_key(name) {
            return Err(Error::catalog(format!("bucket '{}' already exists", name)));
        }
        self.insert_bucket(name, schema);
        Ok(())
    }

    fn apply_bucket_template(&mut self, name: &str, template: &BucketSettings) -> Result<bool> {
        let bucket = self
            .buckets
            .get_mut(name)
            .ok_or_else(|| Error::catalog(format!("bucket '{}' does not exist", name)))?;

        let mut changed = false;
        for (key, value) in template {
            if bucket.settings.get(key) != Some(value) {
                bucket.settings.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        Ok(changed)
    }

    fn entry(&self, asset_id: &str) -> Option<&Entry> {
        self.entries.get(asset_id)
    }

    fn entry_at(&self, path: &str) -> Option<&Entry> {
        if path.is_empty() {
            return None;
        }
        self.entries.values().find(|entry| entry.path == path)
    }

    fn create_or_move_entry(&mut self, asset_id: &str, bucket: &str) -> Result<&mut Entry> {
        if asset_id.trim().is_empty() {
            return Err(Error::catalog("asset identifier is empty"));
        }
        if !self.buckets.contains_key(bucket) {
            return Err(Error::catalog(format!("bucket '{}' does not exist", bucket)));
        }

        let entry = self
            .entries
            .entry(asset_id.to_string())
            .or_insert_with(|| Entry::new(asset_id, bucket));
        if entry.bucket != bucket {
            entry.bucket = bucket.to_string();
        }
        Ok(entry)
    }

    fn remove_entry(&mut self, asset_id: &str) -> bool {
        self.entries.remove(asset_id).is_some()
    }

    fn register_label(&mut self, label: &str) -> bool {
        self.labels.insert(label.to_string())
    }
}
