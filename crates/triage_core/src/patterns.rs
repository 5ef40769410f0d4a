//! Rule-set schema and the ordered pattern collection.
//!
//! Rule files are JSON with a top-level `version`, a `patterns` array
//! and an optional `settings` block. Local and remote files share the
//! shape. Array order is match priority: the first pattern in set
//! order wins, and merging never resorts entries. The optional
//! `priority` and `tests` fields are metadata for the offline
//! validator; the matcher ignores them.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Severity
// ============================================================================

/// How bad a recognized failure is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

// ============================================================================
// Rule file schema
// ============================================================================

/// One diagnosis rule: a regex plus the explanation attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPattern {
    /// Stable identifier, unique within a file.
    pub id: String,
    /// Reporting category, e.g. `"Docker"` or `"Tests"`.
    pub category: String,
    /// Regex source, matched against normalized lines.
    pub pattern: String,
    /// JS-style flag letters, usually `"i"`.
    #[serde(default)]
    pub flags: String,
    /// Plain-English one-line explanation of the failure.
    pub root_cause: String,
    /// Actionable fix text shown to the user.
    pub suggestion: String,
    pub severity: Severity,
    /// Validator metadata, unused at match time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Self-test cases for the offline validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<PatternTests>,
}

/// Example lines a pattern must and must not match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternTests {
    #[serde(default)]
    pub should_match: Vec<String>,
    #[serde(default)]
    pub should_not_match: Vec<String>,
}

/// Optional per-file settings block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSettings {
    /// Categories a file claims to cover, checked by the validator.
    #[serde(default)]
    pub category_priority: Vec<String>,
}

/// A complete rule file, local or remote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternFile {
    pub version: String,
    pub patterns: Vec<ErrorPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<PatternSettings>,
}

// ============================================================================
// Regex compilation
// ============================================================================

/// A pattern entry that cannot be turned into a usable regex.
#[derive(Debug, thiserror::Error)]
pub enum PatternCompileError {
    #[error("unknown regex flag '{0}'")]
    UnknownFlag(char),
    #[error("invalid regex: {0}")]
    BadPattern(#[from] regex::Error),
}

/// Compile a rule regex with its JS-style flag letters.
///
/// `i`, `m` and `s` map onto the matching builder options. `g`, `u`
/// and `y` change nothing for a single match test and are accepted as
/// no-ops. Any other letter is an error, and a file entry carrying one
/// is skipped at match time.
pub fn compile_pattern(pattern: &str, flags: &str) -> Result<Regex, PatternCompileError> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'g' | 'u' | 'y' => {}
            other => return Err(PatternCompileError::UnknownFlag(other)),
        }
    }
    Ok(builder.build()?)
}

impl ErrorPattern {
    /// Compile this entry's regex with its flags applied.
    pub fn compile(&self) -> Result<Regex, PatternCompileError> {
        compile_pattern(&self.pattern, &self.flags)
    }
}

// ============================================================================
// Pattern set
// ============================================================================

/// An ordered collection of rules, ready for matching.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<ErrorPattern>,
}

impl PatternSet {
    pub fn new(patterns: Vec<ErrorPattern>) -> Self {
        Self { patterns }
    }

    /// Combine local and remote rules with local precedence.
    ///
    /// Local entries keep their order and always win: a remote entry is
    /// appended only when no local entry already uses its id. Remote
    /// entries keep their relative order after the local block.
    pub fn merged(local: Vec<ErrorPattern>, remote: Vec<ErrorPattern>) -> Self {
        let local_ids: HashSet<String> = local.iter().map(|p| p.id.clone()).collect();
        let mut patterns = local;
        patterns.extend(remote.into_iter().filter(|p| !local_ids.contains(&p.id)));
        Self { patterns }
    }

    pub fn patterns(&self) -> &[ErrorPattern] {
        &self.patterns
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.patterns.iter().any(|p| p.id == id)
    }
}

impl From<Vec<ErrorPattern>> for PatternSet {
    fn from(patterns: Vec<ErrorPattern>) -> Self {
        Self::new(patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(id: &str, regex: &str) -> ErrorPattern {
        ErrorPattern {
            id: id.to_string(),
            category: "Tests".to_string(),
            pattern: regex.to_string(),
            flags: "i".to_string(),
            root_cause: format!("{id} root cause"),
            suggestion: format!("{id} suggestion"),
            severity: Severity::Critical,
            priority: None,
            tags: Vec::new(),
            tests: None,
        }
    }

    #[test]
    fn test_parse_full_rule_file() {
        let json = r#"{
            "version": "2.0.0",
            "patterns": [
                {
                    "id": "docker-auth",
                    "category": "Docker",
                    "pattern": "unauthorized.*registry",
                    "flags": "i",
                    "rootCause": "Registry authentication failed",
                    "suggestion": "Check the registry credentials",
                    "severity": "critical",
                    "priority": 10,
                    "tags": ["docker", "auth"],
                    "tests": {
                        "shouldMatch": ["unauthorized: access to registry denied"],
                        "shouldNotMatch": ["push succeeded"]
                    }
                }
            ],
            "settings": { "categoryPriority": ["Docker"] }
        }"#;

        let file: PatternFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.version, "2.0.0");
        assert_eq!(file.patterns.len(), 1);

        let p = &file.patterns[0];
        assert_eq!(p.id, "docker-auth");
        assert_eq!(p.root_cause, "Registry authentication failed");
        assert_eq!(p.severity, Severity::Critical);
        assert_eq!(p.priority, Some(10));
        assert_eq!(p.tags, vec!["docker", "auth"]);
        let tests = p.tests.as_ref().unwrap();
        assert_eq!(tests.should_match.len(), 1);
        assert_eq!(tests.should_not_match.len(), 1);
        assert_eq!(file.settings.unwrap().category_priority, vec!["Docker"]);
    }

    #[test]
    fn test_parse_applies_defaults_for_optional_fields() {
        let json = r#"{
            "version": "1.0.0",
            "patterns": [
                {
                    "id": "bare",
                    "category": "Generic",
                    "pattern": "oops",
                    "rootCause": "Something broke",
                    "suggestion": "Look closer",
                    "severity": "warning"
                }
            ]
        }"#;

        let file: PatternFile = serde_json::from_str(json).unwrap();
        let p = &file.patterns[0];
        assert_eq!(p.flags, "");
        assert_eq!(p.priority, None);
        assert!(p.tags.is_empty());
        assert!(p.tests.is_none());
        assert!(file.settings.is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_severity() {
        let json = r#"{
            "version": "1.0.0",
            "patterns": [
                {
                    "id": "bad",
                    "category": "Generic",
                    "pattern": "oops",
                    "rootCause": "x",
                    "suggestion": "y",
                    "severity": "catastrophic"
                }
            ]
        }"#;

        assert!(serde_json::from_str::<PatternFile>(json).is_err());
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"critical\"");
        assert_eq!(Severity::Warning.as_str(), "warning");
        assert_eq!(Severity::Info.as_str(), "info");
    }

    #[test]
    fn test_compile_honors_i_flag() {
        let re = compile_pattern("unauthorized", "i").unwrap();
        assert!(re.is_match("UNAUTHORIZED: access denied"));

        let re = compile_pattern("unauthorized", "").unwrap();
        assert!(!re.is_match("UNAUTHORIZED: access denied"));
    }

    #[test]
    fn test_compile_honors_m_and_s_flags() {
        let re = compile_pattern("^error", "m").unwrap();
        assert!(re.is_match("line one\nerror on line two"));

        let re = compile_pattern("start.end", "s").unwrap();
        assert!(re.is_match("start\nend"));
    }

    #[test]
    fn test_compile_accepts_global_sticky_unicode_as_noops() {
        let re = compile_pattern("timeout", "giuy").unwrap();
        assert!(re.is_match("operation timeout"));
        assert!(re.is_match("operation timeout again"));
    }

    #[test]
    fn test_compile_rejects_unknown_flag() {
        match compile_pattern("timeout", "ix") {
            Err(PatternCompileError::UnknownFlag('x')) => {}
            other => panic!("expected UnknownFlag, got {other:?}"),
        }
    }

    #[test]
    fn test_compile_rejects_bad_regex() {
        assert!(matches!(
            compile_pattern("unclosed(group", "i"),
            Err(PatternCompileError::BadPattern(_))
        ));
    }

    #[test]
    fn test_merged_keeps_local_precedence() {
        let local = vec![pattern("a", "aaa"), pattern("b", "bbb")];
        let remote = vec![pattern("b", "REMOTE"), pattern("c", "ccc")];

        let set = PatternSet::merged(local, remote);
        let ids: Vec<&str> = set.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        // The local "b" body survives, not the remote one.
        assert_eq!(set.patterns()[1].pattern, "bbb");
    }

    #[test]
    fn test_merged_with_empty_sides() {
        let set = PatternSet::merged(Vec::new(), vec![pattern("r", "rrr")]);
        assert_eq!(set.len(), 1);
        assert!(set.contains_id("r"));

        let set = PatternSet::merged(vec![pattern("l", "lll")], Vec::new());
        assert_eq!(set.len(), 1);

        let set = PatternSet::merged(Vec::new(), Vec::new());
        assert!(set.is_empty());
    }

    #[test]
    fn test_merged_preserves_remote_relative_order() {
        let local = vec![pattern("x", "xxx")];
        let remote = vec![pattern("r2", "r2"), pattern("r1", "r1"), pattern("x", "dup")];

        let set = PatternSet::merged(local, remote);
        let ids: Vec<&str> = set.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "r2", "r1"]);
    }
}
