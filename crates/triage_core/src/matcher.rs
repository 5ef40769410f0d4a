//! Ordered pattern matching over normalized log lines.
//!
//! The outer loop walks patterns in set order, the inner loop walks
//! lines in log order. Set order is the primary tie-break: a later
//! pattern never wins over an earlier one, even when it matches an
//! earlier line.

use crate::patterns::{PatternSet, Severity};

/// One log line after normalization, with its position in the raw log.
#[derive(Debug, Clone)]
pub struct NormalizedLine {
    pub text: String,
    /// 1-based line number in the original log.
    pub number: usize,
}

/// The first pattern hit, with everything the report needs.
#[derive(Debug, Clone)]
pub struct MatchHit {
    pub pattern_id: String,
    pub category: String,
    pub root_cause: String,
    pub suggestion: String,
    pub severity: Severity,
    /// The normalized line that matched.
    pub line: String,
    /// 1-based number of the matching line in the raw log.
    pub line_number: usize,
}

/// Scan every line with every pattern and return the first hit.
///
/// Empty lines never match. Entries whose regex or flags fail to
/// compile are skipped; the offline validator is where those get
/// reported.
pub fn find_first_match(patterns: &PatternSet, lines: &[NormalizedLine]) -> Option<MatchHit> {
    for pattern in patterns.iter() {
        let regex = match pattern.compile() {
            Ok(regex) => regex,
            Err(_) => continue,
        };

        for line in lines {
            if line.text.is_empty() {
                continue;
            }
            if regex.is_match(&line.text) {
                return Some(MatchHit {
                    pattern_id: pattern.id.clone(),
                    category: pattern.category.clone(),
                    root_cause: pattern.root_cause.clone(),
                    suggestion: pattern.suggestion.clone(),
                    severity: pattern.severity,
                    line: line.text.clone(),
                    line_number: line.number,
                });
            }
        }
    }
    None
}
