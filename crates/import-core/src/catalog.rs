//! Catalog collaborator interface
//!
//! The catalog stores buckets and entries. The importer only ever calls it
//! from the single-threaded apply phase, so implementations need no
//! internal synchronization.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Free-form bucket settings, also used for bucket templates.
pub type BucketSettings = BTreeMap<String, serde_json::Value>;

/// A named grouping of entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    #[serde(default)]
    pub settings: BucketSettings,
}

/// The catalog's record for one managed asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub asset_id: String,
    pub bucket: String,
    /// Empty until assigned
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    /// Path the entry was last imported from; empty if never imported
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

impl Entry {
    pub fn new(asset_id: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            bucket: bucket.into(),
            address: String::new(),
            labels: BTreeSet::new(),
            path: String::new(),
        }
    }
}

/// Storage the importer plans against.
pub trait Catalog {
    /// Name of the bucket used when a rule names none.
    fn default_bucket(&self) -> &str;

    fn find_bucket(&self, name: &str) -> Option<&Bucket>;

    /// Create a bucket seeded with `schema`.
    fn create_bucket(&mut self, name: &str, schema: BucketSettings) -> Result<()>;

    /// Merge `template` into a bucket's settings. Returns true if anything changed.
    fn apply_bucket_template(&mut self, name: &str, template: &BucketSettings) -> Result<bool>;

    fn entry(&self, asset_id: &str) -> Option<&Entry>;

    /// The entry last imported from `path`.
    ///
    /// Deleted assets can usually no longer be identified from disk, so
    /// removals fall back to this.
    fn entry_at(&self, path: &str) -> Option<&Entry>;

    /// Fetch the entry for `asset_id` in `bucket`, creating it or moving it
    /// from another bucket as needed.
    fn create_or_move_entry(&mut self, asset_id: &str, bucket: &str) -> Result<&mut Entry>;

    /// Returns true if an entry was removed.
    fn remove_entry(&mut self, asset_id: &str) -> bool;

    /// Add a label to the global vocabulary. Returns true if it was new.
    fn register_label(&mut self, label: &str) -> bool;
}
