//! Offline rule-set validation.
//!
//! The checks maintainers run before shipping a rule file: structural
//! problems, regexes that do not compile, self-test cases, category
//! coverage and overlapping rules. Nothing here runs at match time;
//! the matcher quietly skips entries the validator would reject.

use crate::patterns::{PatternFile, PatternTests};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Legal JS-style flag letters.
static FLAGS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[gimsuy]*$").unwrap());

/// Outcome of validating one rule file.
///
/// `errors` are problems that make a rule unusable or wrong; any error
/// fails validation. `warnings` are advisory.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub patterns_checked: usize,
    pub tests_passed: usize,
    pub tests_failed: usize,
    pub tests_skipped: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run every check against a parsed rule file.
pub fn validate_file(file: &PatternFile) -> ValidationReport {
    let mut report = ValidationReport { patterns_checked: file.patterns.len(), ..Default::default() };

    check_structure(file, &mut report);
    check_regexes(file, &mut report);
    run_self_tests(file, &mut report);
    check_category_coverage(file, &mut report);
    check_conflicts(file, &mut report);

    report
}

fn check_structure(file: &PatternFile, report: &mut ValidationReport) {
    let mut seen_ids: HashSet<&str> = HashSet::new();

    for p in &file.patterns {
        let id = if p.id.is_empty() { "UNKNOWN" } else { p.id.as_str() };

        let required = [
            ("id", &p.id),
            ("category", &p.category),
            ("pattern", &p.pattern),
            ("rootCause", &p.root_cause),
            ("suggestion", &p.suggestion),
        ];
        for (field, value) in required {
            if value.is_empty() {
                report.errors.push(format!("[{id}] Missing required field: '{field}'"));
            }
        }

        if !p.id.is_empty() && !seen_ids.insert(p.id.as_str()) {
            report.errors.push(format!("[{id}] Duplicate ID found"));
        }

        if !FLAGS_RE.is_match(&p.flags) {
            report.errors.push(format!("[{id}] Invalid regex flags: '{}'", p.flags));
        }

        if let Some(priority) = p.priority {
            if !(1..=100).contains(&priority) {
                report
                    .warnings
                    .push(format!("[{id}] Priority {priority} is outside recommended range 1-100"));
            }
        }

        if p.tests.as_ref().map_or(true, |t| t.should_match.is_empty()) {
            report.warnings.push(format!(
                "[{id}] No test cases defined, add tests.shouldMatch and tests.shouldNotMatch"
            ));
        }
    }
}

fn check_regexes(file: &PatternFile, report: &mut ValidationReport) {
    for p in &file.patterns {
        if let Err(e) = p.compile() {
            report.errors.push(format!("[{}] Invalid regex: {e}", p.id));
        }
    }
}

fn run_self_tests(file: &PatternFile, report: &mut ValidationReport) {
    for p in &file.patterns {
        let Some(PatternTests { should_match, should_not_match }) = &p.tests else {
            report.tests_skipped += 1;
            continue;
        };

        // Compile failures are already reported above.
        let Ok(regex) = p.compile() else { continue };

        for case in should_match {
            if regex.is_match(case) {
                report.tests_passed += 1;
            } else {
                report.errors.push(format!("[{}] shouldMatch FAILED: \"{case}\"", p.id));
                report.tests_failed += 1;
            }
        }

        for case in should_not_match {
            if !regex.is_match(case) {
                report.tests_passed += 1;
            } else {
                report.errors.push(format!(
                    "[{}] shouldNotMatch FAILED (matched but should not): \"{case}\"",
                    p.id
                ));
                report.tests_failed += 1;
            }
        }
    }
}

fn check_category_coverage(file: &PatternFile, report: &mut ValidationReport) {
    let declared: HashSet<&str> = file
        .settings
        .as_ref()
        .map(|s| s.category_priority.iter().map(String::as_str).collect())
        .unwrap_or_default();

    let mut seen: HashSet<&str> = HashSet::new();
    for p in &file.patterns {
        // First-appearance order keeps the report stable.
        if !seen.insert(p.category.as_str()) {
            continue;
        }
        if !declared.contains(p.category.as_str()) {
            report.warnings.push(format!(
                "Category '{}' is used in patterns but not in settings.categoryPriority",
                p.category
            ));
        }
    }
}

fn check_conflicts(file: &PatternFile, report: &mut ValidationReport) {
    for (i, a) in file.patterns.iter().enumerate() {
        let Some(a_tests) = &a.tests else { continue };
        if a_tests.should_match.is_empty() {
            continue;
        }

        for b in &file.patterns[i + 1..] {
            if b.tests.is_none() {
                continue;
            }
            let Ok(regex_b) = b.compile() else { continue };

            for case in &a_tests.should_match {
                if regex_b.is_match(case) {
                    report.warnings.push(format!(
                        "[{}] and [{}] both match: \"{case}\", check priority ordering",
                        a.id, b.id
                    ));
                }
            }
        }
    }
}
