//! Pattern store: local rules plus optional remote rules.
//!
//! The local side is authoritative. Remote rules are fetched best
//! effort under a short timeout and merged behind the local ones;
//! any network or parse problem degrades to whatever loaded locally.
//! Loading never fails, it only narrows.

use crate::builtin::builtin_patterns;
use crate::observer::Observer;
use crate::patterns::{ErrorPattern, PatternFile, PatternSet};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Budget for the remote rule fetch. Classification of a failed run
/// should never hang on a slow rule server.
pub const REMOTE_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Read and parse a rule file from disk.
pub fn read_pattern_file(path: &Path) -> Result<PatternFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file: PatternFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(file)
}

/// Loads the effective rule set for one classification run.
pub struct PatternStore {
    local_path: Option<PathBuf>,
    remote_url: Option<String>,
    client: reqwest::Client,
    fetch_timeout: Duration,
}

impl Default for PatternStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternStore {
    /// Create a store that serves the built-in rules.
    pub fn new() -> Self {
        Self {
            local_path: None,
            remote_url: None,
            client: reqwest::Client::builder()
                .timeout(REMOTE_FETCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
            fetch_timeout: REMOTE_FETCH_TIMEOUT,
        }
    }

    /// Use a local rule file instead of the built-in rules.
    pub fn with_local_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = Some(path.into());
        self
    }

    /// Also fetch rules from a remote URL and merge them behind the
    /// local ones.
    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = Some(url.into());
        self
    }

    /// Override the remote fetch budget.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        self
    }

    /// Load the effective rule set.
    ///
    /// Local rules keep their file order and always win over remote
    /// rules with the same id. A configured-but-unreadable local file
    /// contributes nothing; the built-in rules step in only when no
    /// local file is configured at all.
    pub async fn load(&self, observer: &dyn Observer) -> PatternSet {
        let local = self.load_local(observer);

        match &self.remote_url {
            Some(url) => {
                let remote = self.fetch_remote(url, observer).await;
                let local_count = local.len();
                let set = PatternSet::merged(local, remote);
                observer.info(&format!(
                    "📋 Using {} total patterns ({} local + {} remote)",
                    set.len(),
                    local_count,
                    set.len() - local_count
                ));
                set
            }
            None => PatternSet::new(local),
        }
    }

    fn load_local(&self, observer: &dyn Observer) -> Vec<ErrorPattern> {
        match &self.local_path {
            Some(path) => match read_pattern_file(path) {
                Ok(file) => {
                    observer.info(&format!(
                        "✅ Loaded {} patterns from {} (v{})",
                        file.patterns.len(),
                        path.display(),
                        file.version
                    ));
                    file.patterns
                }
                Err(e) => {
                    observer.warn(&format!(
                        "⚠️ Could not load local patterns from {}: {e:#}",
                        path.display()
                    ));
                    Vec::new()
                }
            },
            None => {
                let patterns = builtin_patterns();
                observer.info(&format!("📦 Using {} built-in patterns", patterns.len()));
                patterns
            }
        }
    }

    async fn fetch_remote(&self, url: &str, observer: &dyn Observer) -> Vec<ErrorPattern> {
        observer.info(&format!("🌐 Fetching remote patterns from {url}..."));
        match self.request_pattern_file(url).await {
            Ok(file) => {
                observer.info(&format!(
                    "✅ Loaded {} remote patterns (v{})",
                    file.patterns.len(),
                    file.version
                ));
                file.patterns
            }
            Err(e) => {
                observer.warn(&format!("⚠️ Could not fetch remote patterns: {e}"));
                Vec::new()
            }
        }
    }

    async fn request_pattern_file(&self, url: &str) -> std::result::Result<PatternFile, String> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {}", e))?;

        let file: PatternFile = serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse remote rule file: {}", e))?;

        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{CapturingObserver, NullObserver};
    use std::io::Write;

    #[test]
    fn test_store_defaults() {
        let store = PatternStore::new();
        assert!(store.local_path.is_none());
        assert!(store.remote_url.is_none());
        assert_eq!(store.fetch_timeout, REMOTE_FETCH_TIMEOUT);
    }

    #[test]
    fn test_builder_chain() {
        let store = PatternStore::new()
            .with_local_file("/tmp/rules.json")
            .with_remote_url("https://rules.example.com/patterns.json")
            .with_fetch_timeout(Duration::from_millis(250));
        assert_eq!(store.local_path.as_deref(), Some(Path::new("/tmp/rules.json")));
        assert_eq!(
            store.remote_url.as_deref(),
            Some("https://rules.example.com/patterns.json")
        );
        assert_eq!(store.fetch_timeout, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_load_serves_builtin_without_local_file() {
        let store = PatternStore::new();
        let set = store.load(&NullObserver).await;
        assert_eq!(set.len(), builtin_patterns().len());
        assert!(set.contains_id("docker-auth"));
    }

    #[tokio::test]
    async fn test_load_reads_local_file_instead_of_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "version": "9.9.9",
                "patterns": [{{
                    "id": "only-rule",
                    "category": "Tests",
                    "pattern": "boom",
                    "flags": "i",
                    "rootCause": "It went boom",
                    "suggestion": "Do not go boom",
                    "severity": "critical"
                }}]
            }}"#
        )
        .unwrap();

        let observer = CapturingObserver::new();
        let store = PatternStore::new().with_local_file(file.path());
        let set = store.load(&observer).await;

        assert_eq!(set.len(), 1);
        assert!(set.contains_id("only-rule"));
        assert!(!set.contains_id("docker-auth"));
        assert!(observer.infos().iter().any(|m| m.contains("Loaded 1 patterns") && m.contains("v9.9.9")));
    }

    #[tokio::test]
    async fn test_missing_local_file_degrades_to_empty() {
        let observer = CapturingObserver::new();
        let store = PatternStore::new().with_local_file("/definitely/not/here/rules.json");
        let set = store.load(&observer).await;

        assert!(set.is_empty());
        assert!(observer.warned_about("Could not load local patterns"));
    }

    #[tokio::test]
    async fn test_malformed_local_file_degrades_to_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json at all").unwrap();

        let observer = CapturingObserver::new();
        let store = PatternStore::new().with_local_file(file.path());
        let set = store.load(&observer).await;

        assert!(set.is_empty());
        assert!(observer.warned_about("Could not load local patterns"));
    }

    #[tokio::test]
    async fn test_local_file_with_wrong_shape_degrades_to_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        // Valid JSON, wrong schema: severity out of range.
        write!(
            file,
            r#"{{
                "version": "1.0.0",
                "patterns": [{{
                    "id": "x",
                    "category": "c",
                    "pattern": "p",
                    "rootCause": "r",
                    "suggestion": "s",
                    "severity": "apocalyptic"
                }}]
            }}"#
        )
        .unwrap();

        let observer = CapturingObserver::new();
        let store = PatternStore::new().with_local_file(file.path());
        let set = store.load(&observer).await;

        assert!(set.is_empty());
        assert!(observer.warned_about("Could not load local patterns"));
    }
}
