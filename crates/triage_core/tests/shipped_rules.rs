//! Keeps the shipped `patterns.json` aligned with the built-in rule set.
//!
//! The JSON file is the editable starting point users copy for their own
//! repos; it must stay a superset of the compiled-in defaults (same rules,
//! same order, plus priorities and self-tests).

use std::path::Path;
use triage_core::{builtin_patterns, read_pattern_file, validate_file};

fn shipped() -> triage_core::PatternFile {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../patterns.json");
    read_pattern_file(&path).expect("patterns.json parses")
}

#[test]
fn shipped_rules_pass_validation() {
    let file = shipped();
    let report = validate_file(&file);

    assert!(report.is_ok(), "errors: {:#?}", report.errors);
    assert_eq!(report.tests_failed, 0);
    assert_eq!(report.tests_skipped, 0, "every shipped rule carries self-tests");
    assert!(report.tests_passed > 0);
}

#[test]
fn shipped_rules_mirror_the_builtin_set() {
    let file = shipped();
    let builtin = builtin_patterns();

    assert_eq!(file.patterns.len(), builtin.len());
    for (shipped, builtin) in file.patterns.iter().zip(&builtin) {
        assert_eq!(shipped.id, builtin.id);
        assert_eq!(shipped.category, builtin.category);
        assert_eq!(shipped.pattern, builtin.pattern);
        assert_eq!(shipped.flags, builtin.flags);
        assert_eq!(shipped.root_cause, builtin.root_cause, "rule {}", builtin.id);
        assert_eq!(shipped.suggestion, builtin.suggestion, "rule {}", builtin.id);
        assert_eq!(shipped.severity, builtin.severity, "rule {}", builtin.id);
        assert_eq!(shipped.tags, builtin.tags, "rule {}", builtin.id);
    }
}

#[test]
fn shipped_priorities_follow_set_order() {
    let file = shipped();
    let priorities: Vec<u32> = file.patterns.iter().filter_map(|p| p.priority).collect();

    assert_eq!(priorities.len(), file.patterns.len(), "every shipped rule has a priority");
    assert!(priorities.windows(2).all(|w| w[0] < w[1]), "priorities ascend with set order");
}

#[test]
fn shipped_settings_cover_every_category() {
    let file = shipped();
    let report = validate_file(&file);

    assert!(
        !report.warnings.iter().any(|w| w.contains("categoryPriority")),
        "uncovered category: {:?}",
        report.warnings
    );
}
