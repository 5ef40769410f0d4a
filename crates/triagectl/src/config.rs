//! Triagectl configuration.
//!
//! Optional TOML file at `~/.config/logtriage/config.toml`. Every
//! setting has a default; command-line flags override file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default environment variable holding the inference credential.
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub patterns: PatternsConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    /// Local rule file; unset means the built-in rules.
    pub local_path: Option<PathBuf>,

    /// Remote rule URL, merged behind the local rules.
    pub remote_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Whether the AI fallback tier is on without the `--ai` flag.
    pub enabled: bool,

    /// Environment variable the bearer credential is read from.
    pub token_env: String,

    /// Override the chat-completions endpoint.
    pub endpoint: Option<String>,

    /// Override the model name.
    pub model: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            endpoint: None,
            model: None,
        }
    }
}

impl TriageConfig {
    /// User config path: ~/.config/logtriage/config.toml
    pub fn user_config_path() -> Result<PathBuf> {
        let config_dir = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg)
        } else {
            let home = std::env::var("HOME").context("HOME is not set")?;
            Path::new(&home).join(".config")
        };
        Ok(config_dir.join("logtriage").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// Priority:
    /// 1. Explicit path from the command line
    /// 2. User config (~/.config/logtriage/config.toml)
    /// 3. Defaults
    ///
    /// A missing user config is fine; a missing explicit path is an
    /// error, the caller asked for that exact file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }

        if let Ok(user_path) = Self::user_config_path() {
            if user_path.exists() {
                return Self::read(&user_path);
            }
        }

        Ok(Self::default())
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: TriageConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TriageConfig::default();
        assert!(config.patterns.local_path.is_none());
        assert!(config.patterns.remote_url.is_none());
        assert!(!config.ai.enabled);
        assert_eq!(config.ai.token_env, "GITHUB_TOKEN");
        assert!(config.ai.endpoint.is_none());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[patterns]
local_path = "/etc/logtriage/patterns.json"
remote_url = "https://rules.example.com/patterns.json"

[ai]
enabled = true
token_env = "MODELS_TOKEN"
model = "openai/gpt-4o"
"#
        )
        .unwrap();

        let config = TriageConfig::load(Some(file.path())).unwrap();
        assert_eq!(
            config.patterns.local_path.as_deref(),
            Some(Path::new("/etc/logtriage/patterns.json"))
        );
        assert_eq!(
            config.patterns.remote_url.as_deref(),
            Some("https://rules.example.com/patterns.json")
        );
        assert!(config.ai.enabled);
        assert_eq!(config.ai.token_env, "MODELS_TOKEN");
        assert_eq!(config.ai.model.as_deref(), Some("openai/gpt-4o"));
        assert!(config.ai.endpoint.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[ai]\nenabled = true\n").unwrap();

        let config = TriageConfig::load(Some(file.path())).unwrap();
        assert!(config.ai.enabled);
        assert_eq!(config.ai.token_env, "GITHUB_TOKEN");
        assert!(config.patterns.local_path.is_none());
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = TriageConfig::load(Some(file.path())).unwrap();
        assert!(!config.ai.enabled);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = TriageConfig::load(Some(Path::new("/not/a/real/config.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "this is not toml = = =").unwrap();

        let err = TriageConfig::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_user_config_path_shape() {
        let path = TriageConfig::user_config_path().unwrap();
        assert!(path.ends_with("logtriage/config.toml"));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = TriageConfig::default();
        config.ai.enabled = true;
        config.patterns.remote_url = Some("https://rules.example.com/p.json".to_string());

        let toml = toml::to_string(&config).unwrap();
        let parsed: TriageConfig = toml::from_str(&toml).unwrap();
        assert!(parsed.ai.enabled);
        assert_eq!(parsed.patterns.remote_url, config.patterns.remote_url);
    }
}
