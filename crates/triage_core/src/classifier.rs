//! Three-tier failure classification.
//!
//! Tier 1 walks the rule set over every normalized line. Tier 2 asks
//! the inference endpoint, when a client is supplied and at least one
//! line looked like an error. Tier 3 is the generic unknown record.
//! Exactly one record always comes back; nothing here can fail.

use crate::ai::InferenceClient;
use crate::matcher::{find_first_match, NormalizedLine};
use crate::normalize::{looks_like_error, normalize_line};
use crate::observer::Observer;
use crate::patterns::{PatternSet, Severity};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `matchedPattern` sentinel for tier 2 records.
pub const MATCHED_AI_GENERATED: &str = "ai-generated";

/// `matchedPattern` sentinel for tier 3 records.
pub const MATCHED_NONE: &str = "none";

/// `failedStep` fallback when nothing names the step.
pub const UNKNOWN_STEP: &str = "Unknown step";

/// Step name from an `##[error]` annotation or a `Run <step> failed`
/// line. Matched against raw lines so the annotation marker is still
/// present.
static STEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)##\[error\].*step[:\s]+(.+)|Run (.+) failed").unwrap());

/// The complete diagnosis for one failed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureAnalysis {
    pub root_cause: String,
    pub failed_step: String,
    pub suggestion: String,
    /// Normalized lines that looked like errors, in log order.
    pub error_lines: Vec<String>,
    /// The normalized line behind the diagnosis. For tier 2 and 3 this
    /// is the first error line, or empty when there is none.
    pub exact_match_line: String,
    /// 1-based line number of the match, 0 when no rule matched.
    pub exact_match_line_number: usize,
    pub total_lines: usize,
    pub severity: Severity,
    /// Rule id, or the `ai-generated` / `none` sentinel.
    pub matched_pattern: String,
    pub category: String,
    pub ai_generated: bool,
}

/// Classify a failed run's log text.
///
/// `inference` enables tier 2; pass `None` to go straight from rules
/// to the generic record. `step_hint` is used verbatim when the caller
/// already knows which step failed.
pub async fn classify(
    logs: &str,
    patterns: &PatternSet,
    inference: Option<&InferenceClient>,
    step_hint: Option<&str>,
    observer: &dyn Observer,
) -> FailureAnalysis {
    let raw_lines: Vec<&str> = logs.lines().collect();
    let total_lines = raw_lines.len();

    let normalized: Vec<NormalizedLine> = raw_lines
        .iter()
        .enumerate()
        .map(|(i, raw)| NormalizedLine { text: normalize_line(raw), number: i + 1 })
        .collect();

    let error_lines: Vec<String> = normalized
        .iter()
        .filter(|line| looks_like_error(&line.text))
        .map(|line| line.text.clone())
        .collect();

    observer.info(&format!(
        "📋 Scanned {} log lines, found {} error lines",
        total_lines,
        error_lines.len()
    ));

    // Tier 1: ordered rules over every normalized line, not just the
    // error-ish ones.
    if let Some(hit) = find_first_match(patterns, &normalized) {
        observer.info(&format!(
            "✅ Matched pattern: {} ({}) at line {}",
            hit.pattern_id, hit.category, hit.line_number
        ));
        return FailureAnalysis {
            root_cause: hit.root_cause,
            failed_step: resolve_failed_step(step_hint, &raw_lines),
            suggestion: hit.suggestion,
            error_lines,
            exact_match_line: hit.line,
            exact_match_line_number: hit.line_number,
            total_lines,
            severity: hit.severity,
            matched_pattern: hit.pattern_id,
            category: hit.category,
            ai_generated: false,
        };
    }

    // Tier 2: inference, only with a client and some error material.
    if let Some(client) = inference {
        if !error_lines.is_empty() {
            observer.info("⚠️ No pattern matched — trying AI fallback...");
            if let Some(ai) = client.suggest(&error_lines, observer).await {
                let first_error = error_lines.first().cloned().unwrap_or_default();
                return FailureAnalysis {
                    root_cause: ai.root_cause,
                    failed_step: resolve_failed_step(step_hint, &raw_lines),
                    suggestion: format!(
                        "{} *(AI-generated, confidence: {})*",
                        ai.suggestion,
                        ai.confidence.as_str()
                    ),
                    error_lines,
                    exact_match_line: first_error,
                    exact_match_line_number: 0,
                    total_lines,
                    severity: Severity::Warning,
                    matched_pattern: MATCHED_AI_GENERATED.to_string(),
                    category: "AI Analysis".to_string(),
                    ai_generated: true,
                };
            }
        }
    }

    // Tier 3: generic record. Always available.
    let first_error = error_lines.first().cloned().unwrap_or_default();
    FailureAnalysis {
        root_cause: "Unknown failure — could not automatically detect root cause".to_string(),
        failed_step: resolve_failed_step(step_hint, &raw_lines),
        suggestion: "Review the error lines below. Consider adding a custom pattern to patterns.json to handle this error in future runs.".to_string(),
        error_lines,
        exact_match_line: first_error,
        exact_match_line_number: 0,
        total_lines,
        severity: Severity::Warning,
        matched_pattern: MATCHED_NONE.to_string(),
        category: "Unknown".to_string(),
        ai_generated: false,
    }
}

fn resolve_failed_step(step_hint: Option<&str>, raw_lines: &[&str]) -> String {
    if let Some(hint) = step_hint {
        return hint.to_string();
    }
    extract_failed_step(raw_lines).unwrap_or_else(|| UNKNOWN_STEP.to_string())
}

/// Scan raw lines for something that names the failed step.
fn extract_failed_step(raw_lines: &[&str]) -> Option<String> {
    for line in raw_lines {
        if let Some(caps) = STEP_RE.captures(line) {
            if let Some(name) = caps.get(1).or_else(|| caps.get(2)) {
                let step = normalize_line(name.as_str());
                if !step.is_empty() {
                    return Some(step);
                }
            }
        }
    }
    None
}
