//! Placeholder templates
//!
//! A template is literal text with placeholders expanded against the
//! capture groups of a rule match:
//!
//! | syntax        | expands to                                        |
//! |---------------|---------------------------------------------------|
//! | `$N`, `${N}`  | numbered capture group `N` (`0` is the whole path) |
//! | `${name}`     | named capture group                               |
//! | `${PATH[i]}`  | `i`-th path segment, negative counts from the end |
//! | `$$`          | a literal `$`                                     |
//!
//! Expansion is a single left-to-right pass. Substituted text is never
//! re-scanned, so placeholders cannot nest.

use crate::{Error, Result};
use import_fs::AssetPath;
use regex::{Captures, Regex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Index(usize),
    Name(String),
    PathSegment(isize),
}

/// A parsed placeholder template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

impl Template {
    /// Parse a template string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTemplate`] for a dangling `$`, an unclosed
    /// `${` or a placeholder body that is neither a number, a name nor a
    /// `PATH[i]` reference.
    pub fn parse(source: &str) -> Result<Self> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(pos) = rest.find('$') {
            literal.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            let (piece, consumed) = if let Some(tail) = after.strip_prefix('$') {
                literal.push('$');
                rest = tail;
                continue;
            } else if let Some(body) = after.strip_prefix('{') {
                let end = body
                    .find('}')
                    .ok_or_else(|| invalid(source, "unclosed '${'"))?;
                (parse_braced(source, &body[..end])?, end + 2)
            } else {
                let digits = after.chars().take_while(char::is_ascii_digit).count();
                if digits == 0 {
                    return Err(invalid(source, "'$' must be followed by a group or '$'"));
                }
                let index = after[..digits]
                    .parse()
                    .map_err(|_| invalid(source, "group index out of range"))?;
                (Piece::Index(index), digits)
            };

            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(piece);
            rest = &after[consumed..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            pieces,
        })
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if the template has no content at all.
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// True if the template is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// Check that every group placeholder exists in `regex`.
    ///
    /// Path-segment placeholders depend on the concrete path and are only
    /// checked during expansion.
    pub fn check_groups(&self, regex: &Regex) -> Result<()> {
        for piece in &self.pieces {
            match piece {
                Piece::Index(index) if *index >= regex.captures_len() => {
                    return Err(self.unresolved(format!("${}", index)));
                }
                Piece::Name(name) if !regex.capture_names().flatten().any(|n| n == name) => {
                    return Err(self.unresolved(format!("${{{}}}", name)));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Expand against a match of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedPlaceholder`] if a group is missing or did
    /// not participate in the match, or a path index is out of range.
    pub fn expand(&self, captures: &Captures<'_>, path: &AssetPath) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());

        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Index(index) => {
                    let group = captures
                        .get(*index)
                        .ok_or_else(|| self.unresolved(format!("${}", index)))?;
                    out.push_str(group.as_str());
                }
                Piece::Name(name) => {
                    let group = captures
                        .name(name)
                        .ok_or_else(|| self.unresolved(format!("${{{}}}", name)))?;
                    out.push_str(group.as_str());
                }
                Piece::PathSegment(index) => {
                    let segments = path.segments();
                    let resolved = if *index < 0 {
                        segments.len().checked_sub(index.unsigned_abs())
                    } else {
                        Some(*index as usize)
                    };
                    let segment = resolved
                        .and_then(|i| segments.get(i))
                        .ok_or_else(|| self.unresolved(format!("${{PATH[{}]}}", index)))?;
                    out.push_str(segment);
                }
            }
        }

        Ok(out)
    }

    fn unresolved(&self, placeholder: String) -> Error {
        Error::UnresolvedPlaceholder {
            template: self.source.clone(),
            placeholder,
        }
    }
}

/// Expand `template` against a match in one call.
pub fn resolve(template: &str, captures: &Captures<'_>, path: &AssetPath) -> Result<String> {
    Template::parse(template)?.expand(captures, path)
}

fn parse_braced(source: &str, body: &str) -> Result<Piece> {
    if let Some(index) = body
        .strip_prefix("PATH[")
        .and_then(|inner| inner.strip_suffix(']'))
    {
        return index
            .trim()
            .parse()
            .map(Piece::PathSegment)
            .map_err(|_| invalid(source, "PATH index must be an integer"));
    }

    if !body.is_empty() && body.chars().all(|c| c.is_ascii_digit()) {
        return body
            .parse()
            .map(Piece::Index)
            .map_err(|_| invalid(source, "group index out of range"));
    }

    let mut chars = body.chars();
    let valid_name = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid_name {
        Ok(Piece::Name(body.to_string()))
    } else {
        Err(invalid(source, &format!("'{}' is not a group reference", body)))
    }
}

fn invalid(template: &str, message: &str) -> Error {
    Error::InvalidTemplate {
        template: template.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(template: &str, pattern: &str, path: &str) -> Result<String> {
        let regex = Regex::new(pattern).unwrap();
        let path = AssetPath::file(path);
        let captures = regex.captures(path.as_str()).unwrap();
        resolve(template, &captures, &path)
    }

    #[test]
    fn literal_template_is_unchanged() {
        assert_eq!(expand("Sprites", ".*", "a.png").unwrap(), "Sprites");
    }

    #[test]
    fn numbered_and_braced_groups() {
        let out = expand("$1-${2}", r"^(\w+)/(\w+)\.png$", "ui/button.png").unwrap();
        assert_eq!(out, "ui-button");
    }

    #[test]
    fn group_zero_is_whole_match() {
        assert_eq!(expand("$0", r"^.*$", "x/y.png").unwrap(), "x/y.png");
    }

    #[test]
    fn named_group() {
        let out = expand("${kind}", r"^Assets/(?P<kind>\w+)/.*$", "Assets/Audio/a.wav").unwrap();
        assert_eq!(out, "Audio");
    }

    #[test]
    fn digits_after_group_are_consumed() {
        // `$12` is group twelve, never group one followed by '2'
        let err = expand("$12", r"^(a)$", "a").unwrap_err();
        assert!(matches!(err, Error::UnresolvedPlaceholder { placeholder, .. } if placeholder == "$12"));
    }

    #[test]
    fn path_segments_positive_and_negative() {
        let pattern = r"^.*$";
        assert_eq!(expand("${PATH[0]}", pattern, "Assets/Art/a.png").unwrap(), "Assets");
        assert_eq!(expand("${PATH[-1]}", pattern, "Assets/Art/a.png").unwrap(), "a.png");
        assert_eq!(expand("${PATH[-2]}", pattern, "Assets/Art/a.png").unwrap(), "Art");
    }

    #[test]
    fn path_segment_out_of_range_is_unresolved() {
        let err = expand("${PATH[5]}", r"^.*$", "a/b").unwrap_err();
        assert!(matches!(err, Error::UnresolvedPlaceholder { .. }));
        let err = expand("${PATH[-3]}", r"^.*$", "a/b").unwrap_err();
        assert!(matches!(err, Error::UnresolvedPlaceholder { .. }));
    }

    #[test]
    fn missing_group_is_an_error_not_empty() {
        let err = expand("$2", r"^(\w+)$", "abc").unwrap_err();
        assert!(matches!(err, Error::UnresolvedPlaceholder { .. }));
    }

    #[test]
    fn non_participating_group_is_unresolved() {
        let err = expand("$2", r"^(a)|(b)$", "a").unwrap_err();
        assert!(matches!(err, Error::UnresolvedPlaceholder { .. }));
    }

    #[test]
    fn dollar_escape() {
        assert_eq!(expand("$$1", r"^(x)$", "x").unwrap(), "$1");
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        let out = expand("$1", r"^(.*)$", "price$1").unwrap();
        assert_eq!(out, "price$1");
    }

    #[test]
    fn malformed_templates_are_rejected() {
        assert!(matches!(Template::parse("${1"), Err(Error::InvalidTemplate { .. })));
        assert!(matches!(Template::parse("a$"), Err(Error::InvalidTemplate { .. })));
        assert!(matches!(Template::parse("$x"), Err(Error::InvalidTemplate { .. })));
        assert!(matches!(Template::parse("${PATH[x]}"), Err(Error::InvalidTemplate { .. })));
        assert!(matches!(Template::parse("${a-b}"), Err(Error::InvalidTemplate { .. })));
    }

    #[test]
    fn check_groups_against_pattern() {
        let regex = Regex::new(r"^(?P<kind>\w+)/(\w+)$").unwrap();
        assert!(Template::parse("$1 $2 ${kind} ${PATH[9]}").unwrap().check_groups(&regex).is_ok());
        assert!(Template::parse("$3").unwrap().check_groups(&regex).is_err());
        assert!(Template::parse("${other}").unwrap().check_groups(&regex).is_err());
    }

    #[test]
    fn blank_detection() {
        assert!(Template::parse("").unwrap().is_empty());
        assert!(Template::parse("  ").unwrap().is_blank());
        assert!(!Template::parse("  ").unwrap().is_empty());
    }
}
