//! Import settings
//!
//! Settings are read from a TOML, JSON or YAML file:
//!
//! ```toml
//! allow_bucket_creation = true
//! settings_prefix = "Assets/AddressableAssetsData"
//!
//! [templates.remote]
//! compression = "lz4"
//!
//! [[rules]]
//! pattern = 'Assets/Sprites/(?P<kind>\w+)/.*\.png'
//! bucket = "Sprites-${kind}"
//! labels = ["ui"]
//! dynamic_labels = ["${kind}"]
//! bootstrap = "on-create-only"
//! bucket_template = "remote"
//! ```
//!
//! Loading compiles and validates every rule up front, so a batch never
//! starts with a rule that cannot be evaluated.

use crate::catalog::BucketSettings;
use crate::matcher::RuleSet;
use crate::rule::RuleDefinition;
use crate::{Error, Result};
use import_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default location of the host's own settings assets.
pub const DEFAULT_SETTINGS_PREFIX: &str = "Assets/AddressableAssetsData";

/// Default prefix that marks an address as an unedited raw path.
pub const DEFAULT_RAW_ADDRESS_PREFIX: &str = "Assets/";

/// Settings as written on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default = "default_true")]
    pub allow_bucket_creation: bool,
    #[serde(default = "default_settings_prefix")]
    pub settings_prefix: String,
    #[serde(default = "default_raw_address_prefix")]
    pub raw_address_prefix: String,
    /// Plan-phase worker cap; 0 uses the available hardware parallelism
    #[serde(default)]
    pub max_workers: usize,
    #[serde(default)]
    pub templates: BTreeMap<String, BucketSettings>,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

fn default_true() -> bool {
    true
}

fn default_settings_prefix() -> String {
    DEFAULT_SETTINGS_PREFIX.to_string()
}

fn default_raw_address_prefix() -> String {
    DEFAULT_RAW_ADDRESS_PREFIX.to_string()
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            allow_bucket_creation: true,
            settings_prefix: default_settings_prefix(),
            raw_address_prefix: default_raw_address_prefix(),
            max_workers: 0,
            templates: BTreeMap::new(),
            rules: Vec::new(),
        }
    }
}

/// Validated, compiled settings handed to the importer.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub allow_bucket_creation: bool,
    pub settings_prefix: String,
    pub raw_address_prefix: String,
    pub max_workers: usize,
    templates: BTreeMap<String, BucketSettings>,
    rules: RuleSet,
}

impl ImportSettings {
    /// Settings with default options around an already-compiled rule set.
    pub fn new(rules: RuleSet) -> Self {
        let defaults = SettingsFile::default();
        Self {
            allow_bucket_creation: defaults.allow_bucket_creation,
            settings_prefix: defaults.settings_prefix,
            raw_address_prefix: defaults.raw_address_prefix,
            max_workers: defaults.max_workers,
            templates: defaults.templates,
            rules,
        }
    }

    /// Load, compile and validate settings from a file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let file: SettingsFile = ConfigStore::new().load(path)?;
        tracing::debug!(path = %path, rules = file.rules.len(), "Loaded import settings");
        Self::from_file(file)
    }

    /// Compile and validate parsed settings.
    ///
    /// # Errors
    ///
    /// Fails on the first rule that does not compile, or that names a
    /// bucket template missing from `templates`.
    pub fn from_file(file: SettingsFile) -> Result<Self> {
        for (index, rule) in file.rules.iter().enumerate() {
            if let Some(name) = &rule.bucket_template
                && !file.templates.contains_key(name)
            {
                tracing::warn!(rule = index, template = %name, "Unknown bucket template");
                return Err(Error::TemplateNotFound { name: name.clone() });
            }
        }

        let rules = RuleSet::compile(file.rules)?;

        Ok(Self {
            allow_bucket_creation: file.allow_bucket_creation,
            settings_prefix: file.settings_prefix,
            raw_address_prefix: file.raw_address_prefix,
            max_workers: file.max_workers,
            templates: file.templates,
            rules,
        })
    }

    pub fn with_bucket_creation(mut self, allow: bool) -> Self {
        self.allow_bucket_creation = allow;
        self
    }

    pub fn with_template(mut self, name: impl Into<String>, settings: BucketSettings) -> Self {
        self.templates.insert(name.into(), settings);
        self
    }

    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn template(&self, name: &str) -> Option<&BucketSettings> {
        self.templates.get(name)
    }

    /// Worker count for the plan phase, never zero and never above `jobs`.
    pub fn worker_count(&self, jobs: usize) -> usize {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let cap = if self.max_workers == 0 {
            available
        } else {
            self.max_workers.min(available)
        };
        cap.min(jobs).max(1)
    }
}
