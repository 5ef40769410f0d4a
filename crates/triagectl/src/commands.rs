//! Command handlers for triagectl.

use crate::config::TriageConfig;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::warn;
use triage_core::{
    classify, read_pattern_file, validate_file, InferenceClient, PatternStore, TracingObserver,
};

/// Classify a failure log and print the diagnosis as JSON on stdout.
#[allow(clippy::too_many_arguments)]
pub async fn analyze(
    config_path: Option<&Path>,
    log_file: Option<PathBuf>,
    patterns: Option<PathBuf>,
    remote_url: Option<String>,
    ai: bool,
    step: Option<String>,
    pretty: bool,
) -> Result<()> {
    let config = TriageConfig::load(config_path)?;
    let logs = read_logs(log_file.as_deref())?;

    let mut store = PatternStore::new();
    if let Some(path) = patterns.or_else(|| config.patterns.local_path.clone()) {
        store = store.with_local_file(path);
    }
    if let Some(url) = remote_url.or_else(|| config.patterns.remote_url.clone()) {
        store = store.with_remote_url(url);
    }

    let observer = TracingObserver;
    let rule_set = store.load(&observer).await;
    let inference = build_inference(&config, ai);

    let analysis = classify(&logs, &rule_set, inference.as_ref(), step.as_deref(), &observer).await;

    let json = if pretty {
        serde_json::to_string_pretty(&analysis)?
    } else {
        serde_json::to_string(&analysis)?
    };
    println!("{json}");

    Ok(())
}

fn read_logs(log_file: Option<&Path>) -> Result<String> {
    match log_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read log from stdin")?;
            Ok(buf)
        }
    }
}

/// Build the inference client when the AI tier is requested and a
/// credential is actually available.
fn build_inference(config: &TriageConfig, ai_flag: bool) -> Option<InferenceClient> {
    if !(ai_flag || config.ai.enabled) {
        return None;
    }

    let env_var = &config.ai.token_env;
    let credential = match std::env::var(env_var) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            warn!("AI tier requested but {env_var} is not set, continuing without it");
            return None;
        }
    };

    let mut client = InferenceClient::new(credential);
    if let Some(endpoint) = config.ai.endpoint.clone() {
        client = client.with_endpoint(endpoint);
    }
    if let Some(model) = config.ai.model.clone() {
        client = client.with_model(model);
    }
    Some(client)
}

/// Check a rule file offline. Returns whether it passed.
pub fn validate(file: &Path) -> Result<bool> {
    let parsed = read_pattern_file(file)?;
    let report = validate_file(&parsed);

    println!("📋 Checked {} patterns from {}", report.patterns_checked, file.display());
    println!("✅ {} test cases passed", report.tests_passed);
    if report.tests_skipped > 0 {
        println!("⏭️  {} patterns skipped (no tests defined)", report.tests_skipped);
    }

    for warning in &report.warnings {
        println!("⚠️  {warning}");
    }
    for error in &report.errors {
        println!("❌ {error}");
    }

    if report.is_ok() {
        println!("✅ Rule file is valid");
    } else {
        println!("❌ {} problems found", report.errors.len());
    }
    Ok(report.is_ok())
}
