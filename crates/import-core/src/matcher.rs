//! First-match-wins rule selection

use crate::rule::{Rule, RuleDefinition};
use crate::Result;
use import_fs::AssetPath;

/// An ordered list of compiled rules.
///
/// Order is significant: overlapping patterns are resolved by position, so
/// this stays a plain list and is scanned front to back.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile definitions in order, stopping at the first invalid one.
    pub fn compile(definitions: impl IntoIterator<Item = RuleDefinition>) -> Result<Self> {
        let rules = definitions
            .into_iter()
            .map(RuleDefinition::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// The first rule whose pattern matches `path`, if any.
    pub fn find_match(&self, path: &AssetPath) -> Option<&Rule> {
        find_match(path, &self.rules)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Linear scan in declared order; the first match wins.
pub fn find_match<'r>(path: &AssetPath, rules: &'r [Rule]) -> Option<&'r Rule> {
    let found = rules.iter().find(|rule| rule.is_match(path));
    if let Some(rule) = found {
        tracing::debug!(path = %path, rule = rule.display_name(), "Rule matched");
    }
    found
}
