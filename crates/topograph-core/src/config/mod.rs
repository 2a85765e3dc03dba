//! Configuration management for topograph.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `topograph.toml` file
//! 3. User config `~/.config/topograph/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Thresholds and suggestion commands used by the analysis rules.
    pub analysis: AnalysisConfig,

    /// How resources are named in marker messages.
    pub namer: NamerConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./topograph.toml` (project local)
    /// 2. `~/.config/topograph/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_file(DEFAULT_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(DEFAULT_CONFIG_DIR).join(DEFAULT_USER_CONFIG_FILE);
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Self::default().with_env_overrides()
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)?.with_env_overrides()
    }

    /// Parse configuration from TOML text without environment overrides.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the analysis rules cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.restart_threshold < 0 {
            return Err(ConfigError::Invalid(format!(
                "analysis.restart_threshold must not be negative, got {}",
                self.analysis.restart_threshold
            )));
        }
        if !(1..=MAX_RESTART_WINDOW_MINUTES).contains(&self.analysis.restart_window_minutes) {
            return Err(ConfigError::Invalid(format!(
                "analysis.restart_window_minutes must be between 1 and {}, got {}",
                MAX_RESTART_WINDOW_MINUTES, self.analysis.restart_window_minutes
            )));
        }
        Ok(())
    }

    /// Apply `TOPOGRAPH_*` environment variable overrides, then validate.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`, then validate.
    ///
    /// Numeric values that do not parse are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(threshold) = lookup("TOPOGRAPH_RESTART_THRESHOLD") {
            if let Ok(n) = threshold.parse() {
                self.analysis.restart_threshold = n;
            }
        }
        if let Some(window) = lookup("TOPOGRAPH_RESTART_WINDOW_MINUTES") {
            if let Ok(n) = window.parse() {
                self.analysis.restart_window_minutes = n;
            }
        }
        if let Some(cmd) = lookup("TOPOGRAPH_LOGS_COMMAND") {
            self.analysis.logs_command = cmd;
        }
        if let Some(cmd) = lookup("TOPOGRAPH_SET_PROBE_COMMAND") {
            self.analysis.set_probe_command = cmd;
        }
        if let Some(cmd) = lookup("TOPOGRAPH_AUTOSCALE_COMMAND") {
            self.analysis.autoscale_command = cmd;
        }

        if let Some(ns) = lookup("TOPOGRAPH_NAMESPACE") {
            self.namer.current_namespace = ns;
        }

        self.validate()?;
        Ok(self)
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Analysis rule configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Restart count above which a container is reported as restarting.
    pub restart_threshold: i32,

    /// How far back from `now` a restart or crash counts as recent.
    pub restart_window_minutes: i64,

    /// Command suggested for reading container logs.
    pub logs_command: String,

    /// Command suggested for adding probes.
    pub set_probe_command: String,

    /// Command suggested for creating autoscalers.
    pub autoscale_command: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            restart_threshold: DEFAULT_RESTART_THRESHOLD,
            restart_window_minutes: DEFAULT_RESTART_WINDOW_MINUTES,
            logs_command: DEFAULT_LOGS_COMMAND.to_string(),
            set_probe_command: DEFAULT_SET_PROBE_COMMAND.to_string(),
            autoscale_command: DEFAULT_AUTOSCALE_COMMAND.to_string(),
        }
    }
}

impl AnalysisConfig {
    /// The restart window as a duration, saturating for values `validate`
    /// would reject.
    pub fn restart_window(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.restart_window_minutes.clamp(0, MAX_RESTART_WINDOW_MINUTES))
            .unwrap_or_else(chrono::Duration::zero)
    }
}

/// Resource naming configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamerConfig {
    /// Namespace whose resources are named without a namespace suffix.
    pub current_namespace: String,
}

impl Default for NamerConfig {
    fn default() -> Self {
        Self {
            current_namespace: DEFAULT_CURRENT_NAMESPACE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.restart_threshold, DEFAULT_RESTART_THRESHOLD);
        assert_eq!(config.analysis.restart_window_minutes, DEFAULT_RESTART_WINDOW_MINUTES);
        assert_eq!(config.analysis.set_probe_command, DEFAULT_SET_PROBE_COMMAND);
        assert_eq!(config.namer.current_namespace, DEFAULT_CURRENT_NAMESPACE);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[analysis]"));
        assert!(toml_str.contains("[namer]"));
        assert!(toml_str.contains("restart_threshold = 5"));
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[analysis]
restart_threshold = 3
logs_command = "kubectl logs"

[namer]
current_namespace = "shop"
"#;
        let config = Config::from_toml_str(toml_str).unwrap();
        assert_eq!(config.analysis.restart_threshold, 3);
        assert_eq!(config.analysis.logs_command, "kubectl logs");
        assert_eq!(config.analysis.restart_window_minutes, DEFAULT_RESTART_WINDOW_MINUTES);
        assert_eq!(config.namer.current_namespace, "shop");
    }

    #[test]
    fn test_invalid_window_rejected() {
        let err = Config::from_toml_str("[analysis]\nrestart_window_minutes = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_restart_window_duration() {
        let config = AnalysisConfig::default();
        assert_eq!(config.restart_window(), chrono::Duration::minutes(10));
    }

    #[test]
    fn test_unbounded_window_does_not_panic() {
        let config = AnalysisConfig {
            restart_window_minutes: i64::MAX,
            ..AnalysisConfig::default()
        };
        assert_eq!(config.restart_window(), chrono::Duration::minutes(MAX_RESTART_WINDOW_MINUTES));
    }
}
