//! Import rules
//!
//! A [`RuleDefinition`] is the serializable form found in settings files.
//! Compiling it yields an immutable [`Rule`] with its pattern and templates
//! parsed and cross-checked, so a rule that loads can only fail at resolve
//! time on path-dependent placeholders.

use crate::template::Template;
use crate::{Error, Result};
use import_fs::AssetPath;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a rule pattern is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Regular expression, matched against the whole path
    #[default]
    Regex,
    /// `*` matches any run of characters, `?` exactly one
    Wildcard,
}

/// Whether matched labels are added to or replace an entry's labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelWriteMode {
    #[default]
    Merge,
    Replace,
}

/// When a rule's bucket template is applied to its resolved bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupBootstrap {
    #[default]
    None,
    /// Only when the importer creates the bucket
    OnCreateOnly,
    /// Every time the rule matches, even for existing buckets
    AlwaysOverwrite,
}

/// Bucket an entry is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum BucketRef {
    /// The catalog's default bucket
    Default,
    Named(String),
}

impl fmt::Display for BucketRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketRef::Default => write!(f, "<default>"),
            BucketRef::Named(name) => write!(f, "{}", name),
        }
    }
}

/// A rule as written in a settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Optional display name used in logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub pattern: String,
    #[serde(default)]
    pub match_type: MatchType,
    /// Bucket name template; empty means the default bucket
    #[serde(default)]
    pub bucket: String,
    /// Address template; empty means the asset path
    #[serde(default)]
    pub address: String,
    /// Labels always applied on match
    #[serde(default)]
    pub labels: Vec<String>,
    /// Label templates expanded per match
    #[serde(default)]
    pub dynamic_labels: Vec<String>,
    #[serde(default)]
    pub label_mode: LabelWriteMode,
    #[serde(default)]
    pub bootstrap: GroupBootstrap,
    /// Name of a bucket template from the settings `templates` table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_template: Option<String>,
    /// Always recompute the address, and use the bare file name when no
    /// address template is given
    #[serde(default)]
    pub simplified: bool,
}

impl RuleDefinition {
    /// Start a regular-expression rule.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            name: None,
            pattern: pattern.into(),
            match_type: MatchType::Regex,
            bucket: String::new(),
            address: String::new(),
            labels: Vec::new(),
            dynamic_labels: Vec::new(),
            label_mode: LabelWriteMode::Merge,
            bootstrap: GroupBootstrap::None,
            bucket_template: None,
            simplified: false,
        }
    }

    /// Start a wildcard rule.
    pub fn wildcard(pattern: impl Into<String>) -> Self {
        Self {
            match_type: MatchType::Wildcard,
            ..Self::regex(pattern)
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bucket(mut self, template: impl Into<String>) -> Self {
        self.bucket = template.into();
        self
    }

    pub fn address(mut self, template: impl Into<String>) -> Self {
        self.address = template.into();
        self
    }

    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn dynamic_labels<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dynamic_labels = templates.into_iter().map(Into::into).collect();
        self
    }

    pub fn label_mode(mut self, mode: LabelWriteMode) -> Self {
        self.label_mode = mode;
        self
    }

    pub fn bootstrap(mut self, mode: GroupBootstrap, template: impl Into<String>) -> Self {
        self.bootstrap = mode;
        self.bucket_template = Some(template.into());
        self
    }

    pub fn simplified(mut self, simplified: bool) -> Self {
        self.simplified = simplified;
        self
    }

    /// Compile into a [`Rule`].
    ///
    /// # Errors
    ///
    /// Fails if the pattern does not compile, a template is malformed or
    /// references a capture group the pattern lacks, or a bootstrap mode is
    /// set without a bucket template.
    pub fn compile(self) -> Result<Rule> {
        let source = match self.match_type {
            MatchType::Regex => self.pattern.clone(),
            MatchType::Wildcard => wildcard_to_regex(&self.pattern),
        };
        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| Error::InvalidPattern {
            pattern: self.pattern.clone(),
            source: e,
        })?;

        let bucket = Template::parse(&self.bucket)?;
        let address = Template::parse(&self.address)?;
        let dynamic_labels = self
            .dynamic_labels
            .iter()
            .map(|t| Template::parse(t))
            .collect::<Result<Vec<_>>>()?;

        for template in [&bucket, &address].into_iter().chain(dynamic_labels.iter()) {
            template.check_groups(&regex)?;
        }

        if self.bootstrap != GroupBootstrap::None && self.bucket_template.is_none() {
            return Err(Error::InvalidSettings {
                message: format!(
                    "rule '{}' sets bootstrap {:?} without a bucket_template",
                    self.pattern, self.bootstrap
                ),
            });
        }

        let mut label_refs = Vec::with_capacity(self.labels.len());
        for label in &self.labels {
            if !label_refs.contains(label) {
                label_refs.push(label.clone());
            }
        }

        Ok(Rule {
            definition: self,
            regex,
            bucket,
            address,
            dynamic_labels,
            label_refs,
        })
    }
}

/// A compiled, immutable import rule.
#[derive(Debug, Clone)]
pub struct Rule {
    definition: RuleDefinition,
    regex: Regex,
    bucket: Template,
    address: Template,
    dynamic_labels: Vec<Template>,
    label_refs: Vec<String>,
}

impl Rule {
    /// Name for logs: the configured name, or the pattern.
    pub fn display_name(&self) -> &str {
        self.definition
            .name
            .as_deref()
            .unwrap_or(&self.definition.pattern)
    }

    pub fn definition(&self) -> &RuleDefinition {
        &self.definition
    }

    pub fn label_refs(&self) -> &[String] {
        &self.label_refs
    }

    pub fn label_mode(&self) -> LabelWriteMode {
        self.definition.label_mode
    }

    pub fn bootstrap(&self) -> GroupBootstrap {
        self.definition.bootstrap
    }

    pub fn bucket_template(&self) -> Option<&str> {
        self.definition.bucket_template.as_deref()
    }

    pub fn simplified(&self) -> bool {
        self.definition.simplified
    }

    /// True if the rule carries a non-blank address template.
    pub fn has_address_template(&self) -> bool {
        !self.address.is_blank()
    }

    /// True if the pattern matches the whole of `path`'s match key.
    pub fn is_match(&self, path: &AssetPath) -> bool {
        self.regex.is_match(&path.match_key())
    }

    /// Resolve the bucket for `path`.
    ///
    /// An empty template, or one that expands to whitespace, selects the
    /// catalog's default bucket. Names are trimmed.
    pub fn resolve_bucket(&self, path: &AssetPath) -> Result<BucketRef> {
        if self.bucket.is_empty() {
            return Ok(BucketRef::Default);
        }
        let key = path.match_key();
        let captures = self.captures(&key, path)?;
        let name = self.bucket.expand(&captures, path)?;
        let name = name.trim();
        if name.is_empty() {
            Ok(BucketRef::Default)
        } else {
            Ok(BucketRef::Named(name.to_string()))
        }
    }

    /// Resolve the address for `path`.
    ///
    /// Without a template the address is the path itself, or its file stem
    /// for simplified rules. Directory paths never keep a trailing `/`.
    pub fn resolve_address(&self, path: &AssetPath) -> Result<String> {
        if self.address.is_empty() {
            return Ok(if self.definition.simplified {
                path.file_stem().to_string()
            } else {
                path.as_str().to_string()
            });
        }
        let key = path.match_key();
        let captures = self.captures(&key, path)?;
        self.address.expand(&captures, path)
    }

    /// Expand every dynamic label template, in declared order.
    pub fn resolve_dynamic_labels(&self, path: &AssetPath) -> Result<Vec<String>> {
        if self.dynamic_labels.is_empty() {
            return Ok(Vec::new());
        }
        let key = path.match_key();
        let captures = self.captures(&key, path)?;
        self.dynamic_labels
            .iter()
            .map(|template| template.expand(&captures, path))
            .collect()
    }

    fn captures<'k>(&self, key: &'k str, path: &AssetPath) -> Result<Captures<'k>> {
        self.regex.captures(key).ok_or_else(|| Error::PatternMismatch {
            pattern: self.definition.pattern.clone(),
            path: path.to_string(),
        })
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Translate a wildcard pattern into regex source.
fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if c == '*' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out
}
