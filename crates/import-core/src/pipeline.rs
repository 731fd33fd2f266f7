//! Batch pipeline
//!
//! A batch runs in two phases:
//!
//! 1. **Plan** (parallel): each created or moved path is inspected, matched
//!    and resolved on a bounded worker pool. Workers only read, so no locks
//!    are taken. A failure degrades that path to a no-op and never touches
//!    its siblings.
//! 2. **Apply** (serial): planned operations are applied to the catalog one
//!    at a time in input order, accumulating a single dirty flag.

use crate::catalog::Catalog;
use crate::config::ImportSettings;
use crate::identity::AssetIdentity;
use crate::inspect::{PathInspector, PathKind};
use crate::merge::apply_create_or_update;
use crate::operation::{OperationKind, PlannedOperation};
use crate::planner::Planner;
use crate::{Error, Result};
use import_fs::AssetPath;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;

/// The changed paths of one batch, as reported by the host.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub created: Vec<String>,
    pub deleted: Vec<String>,
    /// Destinations of moves, index-aligned with `moved_from`
    pub moved_to: Vec<String>,
    pub moved_from: Vec<String>,
    /// Paths to leave alone this batch, e.g. an asset open in an editor
    pub excluded: BTreeSet<String>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.created.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn deleted<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deleted.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn moved(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.moved_from.push(from.into());
        self.moved_to.push(to.into());
        self
    }

    pub fn exclude(mut self, path: impl Into<String>) -> Self {
        self.excluded.insert(path.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty() && self.moved_to.is_empty()
    }

    /// True if the batch only touches the host's own settings assets.
    pub fn is_settings_pass(&self, settings_prefix: &str) -> bool {
        let under = |p: &String| AssetPath::parse(p).starts_with(settings_prefix);
        !self.created.is_empty()
            && self.created.iter().all(under)
            && !self.deleted.is_empty()
            && self.deleted.iter().all(under)
    }

    /// Created paths then moved paths, each with its prior path.
    fn targets(&self) -> Vec<(&str, Option<&str>)> {
        if self.moved_from.len() != self.moved_to.len() {
            tracing::warn!(
                moved_to = self.moved_to.len(),
                moved_from = self.moved_from.len(),
                "Moved path lists are not aligned"
            );
        }

        let mut targets = Vec::with_capacity(self.created.len() + self.moved_to.len());
        targets.extend(self.created.iter().map(|p| (p.as_str(), None)));
        targets.extend(
            self.moved_to
                .iter()
                .enumerate()
                .map(|(i, p)| (p.as_str(), self.moved_from.get(i).map(String::as_str))),
        );
        targets
    }
}

/// A path whose operation failed, isolated from the rest of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathFailure {
    pub path: String,
    pub error: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// True if any catalog mutation happened; callers persist when set
    pub dirty: bool,
    /// Entries created or changed; unchanged entries are not counted
    pub updated: usize,
    pub removed: usize,
    /// True if the batch was skipped as a settings-only pass
    pub skipped: bool,
    pub failures: Vec<PathFailure>,
}

impl BatchReport {
    fn fail(&mut self, path: impl Into<String>, error: &Error) {
        let path = path.into();
        tracing::warn!(path = %path, error = %error, "Import failed for path");
        self.failures.push(PathFailure {
            path,
            error: error.to_string(),
        });
    }
}

/// Runs batches against a catalog with fixed settings and collaborators.
pub struct Importer<'a> {
    settings: &'a ImportSettings,
    inspector: &'a dyn PathInspector,
    identity: &'a dyn AssetIdentity,
}

impl<'a> Importer<'a> {
    pub fn new(
        settings: &'a ImportSettings,
        inspector: &'a dyn PathInspector,
        identity: &'a dyn AssetIdentity,
    ) -> Self {
        Self {
            settings,
            inspector,
            identity,
        }
    }

    /// Run one batch: plan in parallel, then apply serially.
    ///
    /// # Errors
    ///
    /// Only [`Error::MissingConfiguration`] is returned, when the settings
    /// hold no rules. Every per-path failure lands in
    /// [`BatchReport::failures`].
    pub fn run(&self, changes: &ChangeSet, catalog: &mut dyn Catalog) -> Result<BatchReport> {
        self.ensure_rules()?;

        let mut report = BatchReport::default();
        if changes.is_settings_pass(&self.settings.settings_prefix) {
            tracing::debug!("Skipping settings-only batch");
            report.skipped = true;
            return Ok(report);
        }

        let planned = self.plan_changes(changes, &mut report);

        for op in &planned {
            let mut changed = false;
            let outcome = self.apply(op, catalog, &mut changed);
            report.dirty |= changed;
            match outcome {
                Ok(()) if changed => match op.kind {
                    OperationKind::CreateOrUpdate { .. } => report.updated += 1,
                    OperationKind::Remove => report.removed += 1,
                    OperationKind::NoOp => {}
                },
                Ok(()) => {}
                Err(e) => report.fail(op.path.as_str(), &e),
            }
        }

        tracing::debug!(
            dirty = report.dirty,
            updated = report.updated,
            removed = report.removed,
            failures = report.failures.len(),
            "Batch complete"
        );
        Ok(report)
    }

    /// Plan a batch without touching any catalog.
    ///
    /// Failed paths are planned as no-ops.
    pub fn plan(&self, changes: &ChangeSet) -> Result<Vec<PlannedOperation<'a>>> {
        self.ensure_rules()?;
        let mut report = BatchReport::default();
        Ok(self.plan_changes(changes, &mut report))
    }

    fn ensure_rules(&self) -> Result<()> {
        if self.settings.rules().is_empty() {
            return Err(Error::MissingConfiguration {
                message: "no import rules configured".to_string(),
            });
        }
        Ok(())
    }

    fn plan_changes(&self, changes: &ChangeSet, report: &mut BatchReport) -> Vec<PlannedOperation<'a>> {
        let planner = Planner::new(self.settings.rules());
        let targets = changes.targets();

        let outcomes = self.plan_parallel(&targets, &changes.excluded, planner);

        let mut planned = Vec::with_capacity(outcomes.len() + changes.deleted.len());
        for (op, failure) in outcomes {
            if let Some((path, error)) = failure {
                report.fail(path, &error);
            }
            planned.push(op);
        }

        // Deleted paths are gone from disk; they only need the ownership check
        planned.extend(
            changes
                .deleted
                .iter()
                .map(|path| planner.plan_deleted(AssetPath::parse(path))),
        );

        planned
    }

    fn plan_parallel(
        &self,
        targets: &[(&str, Option<&str>)],
        excluded: &BTreeSet<String>,
        planner: Planner<'a>,
    ) -> Vec<(PlannedOperation<'a>, Option<(String, Error)>)> {
        let excluded: BTreeSet<String> = excluded
            .iter()
            .map(|p| AssetPath::parse(p).as_str().to_string())
            .collect();
        let plan_all = || {
            targets
                .par_iter()
                .map(|(path, prior)| self.plan_one(planner, &excluded, path, *prior))
                .collect::<Vec<_>>()
        };

        let workers = self.settings.worker_count(targets.len());
        match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(plan_all),
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to the global worker pool");
                plan_all()
            }
        }
    }

    fn plan_one(
        &self,
        planner: Planner<'a>,
        excluded: &BTreeSet<String>,
        raw: &str,
        prior: Option<&str>,
    ) -> (PlannedOperation<'a>, Option<(String, Error)>) {
        let fallback = AssetPath::parse(raw);

        if excluded.contains(fallback.as_str()) {
            tracing::debug!(path = raw, "Excluded from batch");
            return (PlannedOperation::noop(fallback), None);
        }

        let kind = match self.inspector.inspect(raw) {
            Ok(kind) => kind,
            Err(e) => return (PlannedOperation::noop(fallback), Some((raw.to_string(), e))),
        };

        let path = AssetPath::new(raw, kind == PathKind::Directory);
        let prior = prior.map(AssetPath::parse);

        match planner.plan(path, prior.as_ref()) {
            Ok(op) => (op, None),
            Err(e) => (PlannedOperation::noop(fallback), Some((raw.to_string(), e))),
        }
    }

    fn apply(
        &self,
        op: &PlannedOperation<'_>,
        catalog: &mut dyn Catalog,
        changed: &mut bool,
    ) -> Result<()> {
        match &op.kind {
            OperationKind::NoOp => Ok(()),
            OperationKind::CreateOrUpdate { rule, resolution } => {
                let asset_id = self.asset_id(&op.path)?;
                apply_create_or_update(
                    catalog,
                    self.settings,
                    &op.path,
                    &asset_id,
                    rule,
                    resolution,
                    changed,
                )
            }
            OperationKind::Remove => {
                *changed = self.remove(op, catalog)?;
                Ok(())
            }
        }
    }

    /// Remove the entry owned by `op.path`. Returns true if one was removed.
    ///
    /// A deleted asset usually can no longer be identified from disk, so when
    /// the identity resolver has no entry to offer, the catalog is asked for
    /// the entry last imported from the path, or from where a move started.
    fn remove(&self, op: &PlannedOperation<'_>, catalog: &mut dyn Catalog) -> Result<bool> {
        let resolved = self.identity.asset_id(&op.path).filter(|id| !id.is_empty());
        let recorded = std::iter::once(&op.path)
            .chain(op.prior.as_ref())
            .find_map(|path| catalog.entry_at(path.as_str()))
            .map(|entry| entry.asset_id.clone());

        let asset_id = match (resolved, recorded) {
            (Some(id), _) if catalog.entry(&id).is_some() => id,
            (_, Some(id)) => id,
            // Identified, but never imported
            (Some(_), None) => return Ok(false),
            (None, None) => {
                return Err(Error::catalog(format!(
                    "no asset identifier or catalog entry for {}",
                    op.path
                )));
            }
        };

        let removed = catalog.remove_entry(&asset_id);
        if removed {
            tracing::info!(path = %op.path, asset_id = %asset_id, "Entry removed");
        }
        Ok(removed)
    }

    fn asset_id(&self, path: &AssetPath) -> Result<String> {
        self.identity
            .asset_id(path)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::catalog(format!("no asset identifier for {}", path)))
    }
}
