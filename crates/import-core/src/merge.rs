//! Catalog entry merge policy
//!
//! Applies one create-or-update operation to the catalog. Changes are
//! accumulated into a caller-owned dirty flag, so re-running an identical
//! batch reports a clean catalog and a bucket created before a later failure
//! is still persisted.

use crate::catalog::{BucketSettings, Catalog};
use crate::config::ImportSettings;
use crate::operation::Resolution;
use crate::rule::{BucketRef, GroupBootstrap, LabelWriteMode, Rule};
use crate::{Error, Result};
use import_fs::AssetPath;

/// Create or update the entry for `asset_id` according to `rule`.
///
/// `dirty` is set as soon as the catalog changes and stays set if a later
/// step fails.
///
/// # Errors
///
/// - [`Error::TemplateNotFound`] if the rule's bucket template is unknown;
///   nothing is mutated in that case
/// - [`Error::BucketNotFound`] if the bucket is missing and creation is off
/// - [`Error::CatalogMutationFailed`] if the catalog rejects a call
pub fn apply_create_or_update(
    catalog: &mut dyn Catalog,
    settings: &ImportSettings,
    path: &AssetPath,
    asset_id: &str,
    rule: &Rule,
    resolution: &Resolution,
    dirty: &mut bool,
) -> Result<()> {
    let bucket = match &resolution.bucket {
        BucketRef::Default => catalog.default_bucket().to_string(),
        BucketRef::Named(name) => name.clone(),
    };

    // Resolve the template before the bucket is touched
    let missing = catalog.find_bucket(&bucket).is_none();
    let bootstrap = match rule.bootstrap() {
        GroupBootstrap::None => false,
        GroupBootstrap::OnCreateOnly => missing,
        GroupBootstrap::AlwaysOverwrite => true,
    };
    let template = match rule.bucket_template() {
        Some(name) if bootstrap => Some(settings.template(name).ok_or_else(|| {
            Error::TemplateNotFound {
                name: name.to_string(),
            }
        })?),
        _ => None,
    };

    *dirty |= ensure_bucket(catalog, settings, &bucket, path)?;

    if let Some(template) = template {
        *dirty |= catalog.apply_bucket_template(&bucket, template)?;
    }

    let before = catalog.entry(asset_id).cloned();
    let entry = catalog.create_or_move_entry(asset_id, &bucket)?;

    if should_overwrite_address(&entry.address, path, rule, &settings.raw_address_prefix) {
        entry.address = resolution.address.clone();
    }

    if rule.label_mode() == LabelWriteMode::Replace {
        entry.labels.clear();
    }
    for label in rule.label_refs() {
        entry.labels.insert(label.clone());
    }
    for label in &resolution.dynamic_labels {
        entry.labels.insert(label.clone());
    }
    entry.path = path.as_str().to_string();

    if before.as_ref() != Some(&*entry) {
        *dirty = true;
    }

    tracing::info!(
        path = %path,
        address = %entry.address,
        labels = ?entry.labels,
        "Entry created/updated"
    );

    for label in &resolution.dynamic_labels {
        *dirty |= catalog.register_label(label);
    }

    Ok(())
}

/// Find `bucket`, creating it from the default bucket's schema if allowed.
/// Returns true if the bucket was created.
fn ensure_bucket(
    catalog: &mut dyn Catalog,
    settings: &ImportSettings,
    bucket: &str,
    path: &AssetPath,
) -> Result<bool> {
    if catalog.find_bucket(bucket).is_some() {
        return Ok(false);
    }

    if !settings.allow_bucket_creation {
        return Err(Error::BucketNotFound {
            bucket: bucket.to_string(),
            path: path.to_string(),
        });
    }

    let default = catalog.default_bucket().to_string();
    let schema = catalog
        .find_bucket(&default)
        .map(|b| b.settings.clone())
        .unwrap_or_else(BucketSettings::new);
    catalog.create_bucket(bucket, schema)?;
    tracing::info!(bucket, path = %path, "Bucket created");
    Ok(true)
}

/// Decide whether a rule may replace an entry's current address.
///
/// Blank addresses and addresses that still look like a raw path are
/// replaced freely. Anything else is treated as a manual edit and kept,
/// unless the rule is simplified or carries its own address template.
pub fn should_overwrite_address(
    current: &str,
    path: &AssetPath,
    rule: &Rule,
    raw_address_prefix: &str,
) -> bool {
    current.is_empty()
        || current == path.as_str()
        || (!raw_address_prefix.is_empty() && current.starts_with(raw_address_prefix))
        || rule.simplified()
        || rule.has_address_template()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Bucket, Entry};
    use crate::matcher::RuleSet;
    use crate::memory::{DEFAULT_BUCKET, MemoryCatalog};
    use crate::planner::resolve;
    use crate::rule::RuleDefinition;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn apply(
        catalog: &mut MemoryCatalog,
        settings: &ImportSettings,
        rule: &Rule,
        path: &str,
    ) -> Result<bool> {
        let path = AssetPath::file(path);
        let resolution = resolve(rule, &path).unwrap();
        let mut dirty = false;
        apply_create_or_update(catalog, settings, &path, "id", rule, &resolution, &mut dirty)
            .map(|()| dirty)
    }

    fn settings() -> ImportSettings {
        ImportSettings::new(RuleSet::default())
    }

    fn labels(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn creates_entry_in_default_bucket() {
        let mut catalog = MemoryCatalog::default();
        let rule = RuleDefinition::regex(".*").compile().unwrap();

        assert!(apply(&mut catalog, &settings(), &rule, "Assets/a.png").unwrap());

        let entry = catalog.entry("id").unwrap();
        assert_eq!(entry.bucket, DEFAULT_BUCKET);
        assert_eq!(entry.address, "Assets/a.png");
    }

    #[test]
    fn second_identical_apply_is_clean() {
        let mut catalog = MemoryCatalog::default();
        let rule = RuleDefinition::regex(r".*/(\w+)\.png")
            .bucket("Images")
            .dynamic_labels(["$1"])
            .compile()
            .unwrap();

        assert!(apply(&mut catalog, &settings(), &rule, "Assets/a.png").unwrap());
        assert!(!apply(&mut catalog, &settings(), &rule, "Assets/a.png").unwrap());
    }

    #[test]
    fn missing_bucket_without_creation_fails() {
        let mut catalog = MemoryCatalog::default();
        let rule = RuleDefinition::regex(".*").bucket("Nope").compile().unwrap();
        let settings = settings().with_bucket_creation(false);

        let err = apply(&mut catalog, &settings, &rule, "a.png").unwrap_err();

        assert!(matches!(err, Error::BucketNotFound { bucket, .. } if bucket == "Nope"));
        assert!(catalog.entry("id").is_none());
    }

    #[test]
    fn records_import_path() {
        let mut catalog = MemoryCatalog::default();
        let rule = RuleDefinition::regex(".*").compile().unwrap();

        apply(&mut catalog, &settings(), &rule, "Assets/a.png").unwrap();
        assert_eq!(catalog.entry_at("Assets/a.png").unwrap().asset_id, "id");

        assert!(apply(&mut catalog, &settings(), &rule, "Assets/b.png").unwrap());
        assert!(catalog.entry_at("Assets/a.png").is_none());
        assert_eq!(catalog.entry("id").unwrap().path, "Assets/b.png");
    }

    #[test]
    fn unknown_template_fails_before_bucket_is_created() {
        let mut catalog = MemoryCatalog::default();
        let rule = RuleDefinition::regex(".*")
            .bucket("Images")
            .bootstrap(GroupBootstrap::OnCreateOnly, "remote")
            .compile()
            .unwrap();
        let path = AssetPath::file("a.png");
        let resolution = resolve(&rule, &path).unwrap();
        let mut dirty = false;

        let err = apply_create_or_update(
            &mut catalog,
            &settings(),
            &path,
            "id",
            &rule,
            &resolution,
            &mut dirty,
        )
        .unwrap_err();

        assert!(matches!(err, Error::TemplateNotFound { name } if name == "remote"));
        assert!(!dirty);
        assert!(catalog.find_bucket("Images").is_none());
    }

    /// Accepts buckets but rejects every entry.
    struct RejectEntries(MemoryCatalog);

    impl Catalog for RejectEntries {
        fn default_bucket(&self) -> &str {
            self.0.default_bucket()
        }
        fn find_bucket(&self, name: &str) -> Option<&Bucket> {
            self.0.find_bucket(name)
        }
        fn create_bucket(&mut self, name: &str, schema: BucketSettings) -> Result<()> {
            self.0.create_bucket(name, schema)
        }
        fn apply_bucket_template(&mut self, name: &str, template: &BucketSettings) -> Result<bool> {
            self.0.apply_bucket_template(name, template)
        }
        fn entry(&self, asset_id: &str) -> Option<&Entry> {
            self.0.entry(asset_id)
        }
        fn entry_at(&self, path: &str) -> Option<&Entry> {
            self.0.entry_at(path)
        }
        fn create_or_move_entry(&mut self, _asset_id: &str, _bucket: &str) -> Result<&mut Entry> {
            Err(Error::catalog("entries are read-only"))
        }
        fn remove_entry(&mut self, asset_id: &str) -> bool {
            self.0.remove_entry(asset_id)
        }
        fn register_label(&mut self, label: &str) -> bool {
            self.0.register_label(label)
        }
    }

    #[test]
    fn bucket_created_before_failure_stays_dirty() {
        let mut catalog = RejectEntries(MemoryCatalog::default());
        let rule = RuleDefinition::regex(".*").bucket("Images").compile().unwrap();
        let path = AssetPath::file("a.png");
        let resolution = resolve(&rule, &path).unwrap();
        let mut dirty = false;

        let result = apply_create_or_update(
            &mut catalog,
            &settings(),
            &path,
            "id",
            &rule,
            &resolution,
            &mut dirty,
        );

        assert!(matches!(result, Err(Error::CatalogMutationFailed { .. })));
        assert!(dirty);
        assert!(catalog.find_bucket("Images").is_some());
    }

    #[test]
    fn new_bucket_copies_default_schema() {
        let mut catalog = MemoryCatalog::default();
        let mut schema = BucketSettings::new();
        schema.insert("packing".into(), serde_json::json!("together"));
        catalog.insert_bucket(DEFAULT_BUCKET, schema.clone());
        let rule = RuleDefinition::regex(".*").bucket("Images").compile().unwrap();

        apply(&mut catalog, &settings(), &rule, "a.png").unwrap();

        assert_eq!(catalog.find_bucket("Images").unwrap().settings, schema);
    }

    fn remote() -> BucketSettings {
        let mut template = BucketSettings::new();
        template.insert("compression".into(), serde_json::json!("lz4"));
        template
    }

    #[test]
    fn on_create_only_skips_existing_bucket() {
        let mut catalog = MemoryCatalog::default();
        catalog.insert_bucket("Images", BucketSettings::new());
        let rule = RuleDefinition::regex(".*")
            .bucket("Images")
            .bootstrap(GroupBootstrap::OnCreateOnly, "remote")
            .compile()
            .unwrap();
        let settings = settings().with_template("remote", remote());

        apply(&mut catalog, &settings, &rule, "a.png").unwrap();

        assert!(catalog.find_bucket("Images").unwrap().settings.is_empty());
    }

    #[test]
    fn on_create_only_applies_to_new_bucket() {
        let mut catalog = MemoryCatalog::default();
        let rule = RuleDefinition::regex(".*")
            .bucket("Images")
            .bootstrap(GroupBootstrap::OnCreateOnly, "remote")
            .compile()
            .unwrap();
        let settings = settings().with_template("remote", remote());

        apply(&mut catalog, &settings, &rule, "a.png").unwrap();

        assert_eq!(catalog.find_bucket("Images").unwrap().settings, remote());
    }

    #[test]
    fn always_overwrite_reapplies_to_existing_bucket() {
        let mut catalog = MemoryCatalog::default();
        let mut edited = BucketSettings::new();
        edited.insert("compression".into(), serde_json::json!("none"));
        catalog.insert_bucket("Images", edited);
        let rule = RuleDefinition::regex(".*")
            .bucket("Images")
            .bootstrap(GroupBootstrap::AlwaysOverwrite, "remote")
            .compile()
            .unwrap();
        let settings = settings().with_template("remote", remote());

        apply(&mut catalog, &settings, &rule, "a.png").unwrap();

        assert_eq!(catalog.find_bucket("Images").unwrap().settings, remote());
    }

    #[test]
    fn manual_address_is_preserved() {
        let mut catalog = MemoryCatalog::default();
        let mut entry = Entry::new("id", DEFAULT_BUCKET);
        entry.address = "hero".into();
        catalog.insert_entry(entry);
        let rule = RuleDefinition::regex(".*").compile().unwrap();

        apply(&mut catalog, &settings(), &rule, "Assets/hero.prefab").unwrap();

        assert_eq!(catalog.entry("id").unwrap().address, "hero");
    }

    #[test]
    fn raw_path_address_is_replaced() {
        let mut catalog = MemoryCatalog::default();
        let mut entry = Entry::new("id", DEFAULT_BUCKET);
        entry.address = "Assets/old/hero.prefab".into();
        catalog.insert_entry(entry);
        let rule = RuleDefinition::regex(".*").compile().unwrap();

        apply(&mut catalog, &settings(), &rule, "Assets/new/hero.prefab").unwrap();

        assert_eq!(catalog.entry("id").unwrap().address, "Assets/new/hero.prefab");
    }

    #[test]
    fn address_template_overrides_manual_address() {
        let mut catalog = MemoryCatalog::default();
        let mut entry = Entry::new("id", DEFAULT_BUCKET);
        entry.address = "hero".into();
        catalog.insert_entry(entry);
        let rule = RuleDefinition::regex(r".*/(\w+)\.prefab")
            .address("prefab/$1")
            .compile()
            .unwrap();

        apply(&mut catalog, &settings(), &rule, "Assets/hero.prefab").unwrap();

        assert_eq!(catalog.entry("id").unwrap().address, "prefab/hero");
    }

    #[test]
    fn simplified_overrides_manual_address() {
        let mut catalog = MemoryCatalog::default();
        let mut entry = Entry::new("id", DEFAULT_BUCKET);
        entry.address = "custom".into();
        catalog.insert_entry(entry);
        let rule = RuleDefinition::regex(".*").simplified(true).compile().unwrap();

        apply(&mut catalog, &settings(), &rule, "Assets/hero.prefab").unwrap();

        assert_eq!(catalog.entry("id").unwrap().address, "hero");
    }

    #[test]
    fn replace_mode_drops_old_labels() {
        let mut catalog = MemoryCatalog::default();
        let mut entry = Entry::new("id", DEFAULT_BUCKET);
        entry.labels = labels(&["old"]);
        catalog.insert_entry(entry);
        let rule = RuleDefinition::regex(r".*/(\w+)/.*")
            .labels(["ui"])
            .dynamic_labels(["$1"])
            .label_mode(LabelWriteMode::Replace)
            .compile()
            .unwrap();

        apply(&mut catalog, &settings(), &rule, "Assets/icons/a.png").unwrap();

        assert_eq!(catalog.entry("id").unwrap().labels, labels(&["icons", "ui"]));
        assert!(catalog.labels().contains("icons"));
        assert!(!catalog.labels().contains("ui"));
    }

    #[test]
    fn replace_mode_with_no_labels_clears() {
        let mut catalog = MemoryCatalog::default();
        let mut entry = Entry::new("id", DEFAULT_BUCKET);
        entry.labels = labels(&["old", "older"]);
        catalog.insert_entry(entry);
        let rule = RuleDefinition::regex(".*")
            .label_mode(LabelWriteMode::Replace)
            .compile()
            .unwrap();

        assert!(apply(&mut catalog, &settings(), &rule, "a.png").unwrap());

        assert!(catalog.entry("id").unwrap().labels.is_empty());
    }

    #[test]
    fn merge_mode_keeps_old_labels() {
        let mut catalog = MemoryCatalog::default();
        let mut entry = Entry::new("id", DEFAULT_BUCKET);
        entry.labels = labels(&["old"]);
        catalog.insert_entry(entry);
        let rule = RuleDefinition::regex(".*").labels(["ui"]).compile().unwrap();

        apply(&mut catalog, &settings(), &rule, "a.png").unwrap();

        assert_eq!(catalog.entry("id").unwrap().labels, labels(&["old", "ui"]));
    }
}
