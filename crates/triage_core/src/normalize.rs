//! Raw log line normalization.
//!
//! CI runners decorate every line with a timestamp prefix, ANSI color
//! escapes and `##[...]` annotation markers. Every later stage (rule
//! matching, the error-line sample sent to inference, reporting) works
//! on the stripped text, so this runs first for every line.

use regex::Regex;
use std::sync::LazyLock;

/// Leading ISO-8601 timestamp, e.g. `2026-02-22T19:12:50.8020453Z `.
static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T[\d:.]+Z\s+").unwrap());

/// ANSI escape sequences for colors and cursor movement, e.g. `\x1b[36;1m`.
static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[mGKHF]").unwrap());

/// Runner annotation markers: `##[error]`, `##[group]` and friends.
static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"##\[(?:error|warning|debug|group|endgroup)\]").unwrap());

/// Keywords that make a normalized line part of the error sample.
static ERROR_HINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)error|failed|fatal|exception|FAIL|ERR!").unwrap());

/// Strip runner decoration from a raw log line.
///
/// Removes the leading timestamp, all ANSI escapes and all annotation
/// markers, then trims surrounding whitespace. Normalizing an already
/// normalized line returns it unchanged.
pub fn normalize_line(raw: &str) -> String {
    let stripped = TIMESTAMP_RE.replace(raw, "");
    let stripped = ANSI_RE.replace_all(&stripped, "");
    let stripped = ANNOTATION_RE.replace_all(&stripped, "");
    stripped.trim().to_string()
}

/// True when a normalized line is non-empty and contains an error-ish
/// keyword. This is the coarse filter that builds the sample forwarded
/// to the inference tier; rule matching scans every line regardless.
pub fn looks_like_error(normalized: &str) -> bool {
    !normalized.is_empty() && ERROR_HINT_RE.is_match(normalized)
}
