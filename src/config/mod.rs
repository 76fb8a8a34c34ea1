//! Configuration module for pond-rs
//!
//! Engine settings are read from a TOML file. Every field has a default, so a
//! missing file or a partial file is fine.
//!
//! # Config Location
//!
//! The default file lives in the platform config directory:
//! - **Linux**: `~/.config/pond-rs/config.toml`
//! - **macOS**: `~/Library/Application Support/pond-rs/config.toml`
//! - **Windows**: `%APPDATA%\pond-rs\config.toml`
//!
//! # Example
//!
//! ```toml
//! [runner]
//! max_chain_len = 256
//! force_flush = true
//!
//! [logging]
//! filter = "info,pond_rs=debug"
//! ```

use crate::error::{PondError, Result, ResultExt};
use crate::pipeline::resolver::DEFAULT_MAX_CHAIN_LEN;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "pond-rs";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default capacity reserved for collected results
pub const DEFAULT_RESULTS_CAPACITY: usize = 1024;

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Get the default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID).join(CONFIG_FILE))
}

// ==================== Runner ====================

/// Settings applied to every `Runner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Longest chain the resolver accepts
    pub max_chain_len: usize,

    /// Initial capacity of the collected results buffer
    pub results_capacity: usize,

    /// Flush buffered state when a bounded input is exhausted
    pub force_flush: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_chain_len: DEFAULT_MAX_CHAIN_LEN,
            results_capacity: DEFAULT_RESULTS_CAPACITY,
            force_flush: false,
        }
    }
}

// ==================== Logging ====================

/// Logging settings consumed by [`crate::logging::init`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `POND_LOG` / `RUST_LOG` take precedence
    pub filter: String,

    /// Colorize console output
    pub ansi: bool,

    /// Also write a daily-rolling log file into this directory
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            ansi: true,
            directory: None,
        }
    }
}

// ==================== Engine ====================

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub runner: RunnerConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(PondError::from)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PondError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load from `path` if given, else from the default location; defaults on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(p) => p,
            None => return Self::default(),
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save config as TOML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)
                    .map_err(PondError::from)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| PondError::Serialization(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(PondError::from)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.runner.max_chain_len, DEFAULT_MAX_CHAIN_LEN);
        assert!(!config.runner.force_flush);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml("[runner]\nforce_flush = true\n").unwrap();
        assert!(config.runner.force_flush);
        assert_eq!(config.runner.results_capacity, DEFAULT_RESULTS_CAPACITY);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = EngineConfig::from_toml("[runner\n").unwrap_err();
        assert!(matches!(err, PondError::Config(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = EngineConfig::default();
        config.runner.max_chain_len = 8;
        config.logging.directory = Some(dir.path().join("logs"));
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(EngineConfig::load_or_default(Some(&path)), config);
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[runner\n").unwrap();

        let err = EngineConfig::load(&path).unwrap_err();
        match &err {
            PondError::WithContext { context, source } => {
                assert!(context.contains(&path.display().to_string()));
                assert!(matches!(**source, PondError::Config(_)));
            }
            other => panic!("unexpected error {:?}", other),
        }

        let missing = EngineConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(missing.to_string().starts_with("Failed to read"));
        assert_eq!(EngineConfig::load_or_default(Some(&path)), EngineConfig::default());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_or_default(Some(&dir.path().join("missing.toml")));
        assert_eq!(config, EngineConfig::default());
    }
}
