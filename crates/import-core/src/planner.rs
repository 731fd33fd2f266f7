//! Operation planning
//!
//! Matching is evaluated independently for the current path and, for moves,
//! the prior path. The outcomes are deliberately asymmetric:
//!
//! | current matches | prior matches | result         |
//! |-----------------|---------------|----------------|
//! | yes             | any           | CreateOrUpdate |
//! | no              | yes           | Remove         |
//! | no              | no / none     | NoOp           |
//!
//! An entry is only ever removed for a path some rule used to own, so
//! entries created by hand are never touched.

use crate::matcher::RuleSet;
use crate::operation::{PlannedOperation, Resolution};
use crate::rule::Rule;
use crate::Result;
use import_fs::AssetPath;

/// Pure, read-only planner over a rule set. Safe to share across threads.
#[derive(Debug, Clone, Copy)]
pub struct Planner<'r> {
    rules: &'r RuleSet,
}

impl<'r> Planner<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Plan a created or moved path.
    ///
    /// `prior` is re-typed to match `path`, so a moved directory is matched
    /// as a directory at both ends.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnresolvedPlaceholder`] if the matched rule
    /// cannot expand one of its templates for this path.
    pub fn plan(&self, path: AssetPath, prior: Option<&AssetPath>) -> Result<PlannedOperation<'r>> {
        if let Some(rule) = self.rules.find_match(&path) {
            let resolution = resolve(rule, &path)?;
            return Ok(PlannedOperation::create_or_update(path, rule, resolution));
        }

        if let Some(prior) = prior {
            let prior = prior.with_dir(path.is_dir());
            if self.rules.find_match(&prior).is_some() {
                tracing::debug!(path = %path, from = %prior, "Moved out of rule coverage");
                return Ok(PlannedOperation::remove(path).with_prior(Some(prior)));
            }
        }

        Ok(PlannedOperation::noop(path))
    }

    /// Plan a deleted path: remove if a rule owns it, otherwise ignore.
    pub fn plan_deleted(&self, path: AssetPath) -> PlannedOperation<'r> {
        if self.rules.find_match(&path).is_some() {
            PlannedOperation::remove(path)
        } else {
            PlannedOperation::noop(path)
        }
    }
}

/// Resolve bucket, address and dynamic labels of `rule` for `path`.
pub fn resolve(rule: &Rule, path: &AssetPath) -> Result<Resolution> {
    Ok(Resolution {
        bucket: rule.resolve_bucket(path)?,
        address: rule.resolve_address(path)?,
        dynamic_labels: rule.resolve_dynamic_labels(path)?,
    })
}
