//! Configuration file schema.
//!
//! Settings are read from `codecritic.yaml` or `.codecritic.yaml` in the
//! working directory, or from an explicit `--config` path. Every field has a
//! default, so an empty file is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::classifier::DEFAULT_MAX_TOKENS;
use crate::history::History;

/// File names probed, in order, when no path is given.
pub const CONFIG_FILE_NAMES: &[&str] = &["codecritic.yaml", ".codecritic.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Deadline for one analysis, in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    /// Glob patterns for paths to skip when analyzing a directory
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            classifier: ClassifierConfig::default(),
            history: HistoryConfig::default(),
            excluded_paths: Vec::new(),
        }
    }
}

/// Remote quality classifier.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Inference endpoint accepting `{"inputs": text}`
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Input budget in whitespace-delimited tokens (default: 512)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Request timeout in milliseconds (default: 5000)
    #[serde(default = "default_classifier_timeout")]
    pub timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            max_tokens: default_max_tokens(),
            timeout_ms: default_classifier_timeout(),
        }
    }
}

/// Analysis history sink.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub enabled: bool,
    /// JSONL file; defaults to the platform data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

fn default_classifier_timeout() -> u64 {
    5000
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parse a configuration from YAML text. Empty text is the default.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// First config file present in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Load and validate the explicit file, else the discovered one, else
    /// the defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(dir),
        };
        let config = match path {
            Some(path) => Self::parse_file(&path)?,
            None => Self::default(),
        };
        validate(&config)?;
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Compiled matcher for `excluded_paths`.
    pub fn excluded_matcher(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            builder.add(Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        self.excluded_matcher()
            .map(|set| set.is_match(path))
            .unwrap_or(false)
    }

    /// History store to write to, when enabled.
    pub fn history_store(&self) -> Option<History> {
        if !self.history.enabled {
            return None;
        }
        self.history_location().map(History::new)
    }

    /// Configured history file, else the default location.
    pub fn history_location(&self) -> Option<PathBuf> {
        self.history.path.clone().or_else(History::default_location)
    }
}

/// Validate a configuration for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.timeout_secs == 0 {
        anyhow::bail!("timeout_secs must be at least 1");
    }

    let classifier = &config.classifier;
    if classifier.enabled {
        match classifier.endpoint.as_deref() {
            None | Some("") => anyhow::bail!("classifier.endpoint is required when the classifier is enabled"),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                anyhow::bail!("invalid classifier.endpoint {:?}, must be an http(s) URL", url)
            }
            Some(_) => {}
        }
    }
    if classifier.max_tokens == 0 {
        anyhow::bail!("classifier.max_tokens must be at least 1");
    }

    for pattern in &config.excluded_paths {
        Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
timeout_secs: 3
classifier:
  enabled: true
  endpoint: "http://localhost:8080/classify"
history:
  enabled: true
  path: /tmp/history.jsonl
excluded_paths:
  - "**/vendor/**"
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert!(config.classifier.enabled);
        assert_eq!(config.classifier.max_tokens, 512);
        assert_eq!(config.classifier.timeout_ms, 5000);
        assert_eq!(config.history_location(), Some(PathBuf::from("/tmp/history.jsonl")));
        assert!(validate(&config).is_ok());
        assert!(config.is_path_excluded(Path::new("src/vendor/lib.js")));
        assert!(!config.is_path_excluded(Path::new("src/app.js")));
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert!(!config.classifier.enabled);
        assert!(config.history_store().is_none());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config::from_yaml("timeout_secs: 0").unwrap();
        assert!(validate(&config).is_err());

        let config = Config::from_yaml("classifier:\n  enabled: true").unwrap();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("endpoint is required"));

        let config =
            Config::from_yaml("classifier:\n  enabled: true\n  endpoint: ftp://x").unwrap();
        assert!(validate(&config).is_err());

        let config = Config::from_yaml("excluded_paths: ['[']").unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_discover_prefers_plain_name() {
        let dir = TempDir::new().unwrap();
        assert!(Config::discover(dir.path()).is_none());
        fs::write(dir.path().join(".codecritic.yaml"), "timeout_secs: 4").unwrap();
        fs::write(dir.path().join("codecritic.yaml"), "timeout_secs: 7").unwrap();
        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.timeout_secs, 7);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        fs::write(&path, "timeout_secs: 2\nhistory:\n  enabled: true").unwrap();
        let config = Config::load(Some(&path), Path::new("/nonexistent")).unwrap();
        assert_eq!(config.timeout_secs, 2);
        assert!(config.history.enabled);

        assert!(Config::load(Some(&dir.path().join("missing.yaml")), dir.path()).is_err());
    }
}
