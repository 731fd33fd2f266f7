//! Planned operations
//!
//! The planner's only output. Each operation is created once per input
//! path, never mutated, and consumed exactly once by the apply phase.

use crate::rule::{BucketRef, Rule};
use import_fs::AssetPath;
use serde::Serialize;

/// Values resolved from the matched rule's templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub bucket: BucketRef,
    pub address: String,
    /// Expanded dynamic labels, in declared order
    pub dynamic_labels: Vec<String>,
}

/// What the apply phase should do with one path.
#[derive(Debug, Clone)]
pub enum OperationKind<'r> {
    /// Create the entry, or move/update it, using the resolved values
    CreateOrUpdate {
        rule: &'r Rule,
        resolution: Resolution,
    },
    /// Remove the entry; the path left every rule's coverage
    Remove,
    NoOp,
}

/// A decided action for one asset path.
#[derive(Debug, Clone)]
pub struct PlannedOperation<'r> {
    pub path: AssetPath,
    /// Where a moved asset came from
    pub prior: Option<AssetPath>,
    pub kind: OperationKind<'r>,
}

impl<'r> PlannedOperation<'r> {
    pub fn create_or_update(path: AssetPath, rule: &'r Rule, resolution: Resolution) -> Self {
        Self {
            path,
            prior: None,
            kind: OperationKind::CreateOrUpdate { rule, resolution },
        }
    }

    pub fn remove(path: AssetPath) -> Self {
        Self {
            path,
            prior: None,
            kind: OperationKind::Remove,
        }
    }

    pub fn noop(path: AssetPath) -> Self {
        Self {
            path,
            prior: None,
            kind: OperationKind::NoOp,
        }
    }

    pub fn with_prior(mut self, prior: Option<AssetPath>) -> Self {
        self.prior = prior;
        self
    }

    pub fn is_noop(&self) -> bool {
        matches!(self.kind, OperationKind::NoOp)
    }

    pub fn matched_rule(&self) -> Option<&'r Rule> {
        match &self.kind {
            OperationKind::CreateOrUpdate { rule, .. } => Some(*rule),
            _ => None,
        }
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        match &self.kind {
            OperationKind::CreateOrUpdate { resolution, .. } => Some(resolution),
            _ => None,
        }
    }

    /// Labels this operation would write: fixed labels then dynamic ones.
    pub fn resolved_labels(&self) -> Vec<String> {
        match &self.kind {
            OperationKind::CreateOrUpdate { rule, resolution } => {
                let mut labels = rule.label_refs().to_vec();
                for label in &resolution.dynamic_labels {
                    if !labels.contains(label) {
                        labels.push(label.clone());
                    }
                }
                labels
            }
            _ => Vec::new(),
        }
    }

    /// A detached, serializable view for reports and dry runs.
    pub fn summary(&self) -> OperationSummary {
        let (action, rule, bucket, address) = match &self.kind {
            OperationKind::CreateOrUpdate { rule, resolution } => (
                "create-or-update",
                Some(rule.display_name().to_string()),
                Some(resolution.bucket.to_string()),
                Some(resolution.address.clone()),
            ),
            OperationKind::Remove => ("remove", None, None, None),
            OperationKind::NoOp => ("noop", None, None, None),
        };
        OperationSummary {
            path: self.path.to_string(),
            action,
            rule,
            bucket,
            address,
            labels: self.resolved_labels(),
        }
    }
}

/// Serializable description of a [`PlannedOperation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationSummary {
    pub path: String,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}
