//! Orchestrator configuration
//!
//! Loaded from an optional YAML file, then overridden by the CLI. The
//! derived pipeline and transfer paths are deliberately absent: they are
//! fixed by [`crate::paths`].

use crate::error::ConfigError;
use crate::paths::MigrationPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Metadata engine executable; defaults to `<base>/bin/metadata-migration`
    pub metadata_command: Option<PathBuf>,
    /// Monitor poll cadence in milliseconds
    pub poll_interval_ms: u64,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl OrchestratorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a YAML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::InvalidYaml` if it does not parse
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::InvalidYaml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable values
    ///
    /// # Errors
    /// `ConfigError::InvalidSetting` naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                key: "log_level",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// With metadata engine executable
    #[inline]
    #[must_use]
    pub fn with_metadata_command(mut self, command: impl Into<PathBuf>) -> Self {
        self.metadata_command = Some(command.into());
        self
    }

    /// With poll interval
    #[inline]
    #[must_use]
    pub fn with_poll_interval_ms(mut self, millis: u64) -> Self {
        self.poll_interval_ms = millis;
        self
    }

    /// With log level
    #[inline]
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// With JSON logging
    #[inline]
    #[must_use]
    pub fn with_log_json(mut self, json: bool) -> Self {
        self.log_json = json;
        self
    }

    /// Monitor poll interval
    #[inline]
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Metadata engine to run for `paths`
    #[must_use]
    pub fn metadata_program(&self, paths: &MigrationPaths) -> PathBuf {
        self.metadata_command
            .clone()
            .unwrap_or_else(|| paths.metadata_executable())
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            metadata_command: None,
            poll_interval_ms: 1000,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = OrchestratorConfig::new();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert_eq!(
            config.metadata_program(&MigrationPaths::new("base")),
            PathBuf::from("base/bin/metadata-migration")
        );
    }

    #[test]
    fn builders_override() {
        let config = OrchestratorConfig::new()
            .with_metadata_command("/usr/local/bin/meta")
            .with_poll_interval_ms(250)
            .with_log_level("debug")
            .with_log_json(true);

        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(
            config.metadata_program(&MigrationPaths::new("base")),
            PathBuf::from("/usr/local/bin/meta")
        );
        assert!(config.log_json);
    }

    #[test]
    fn loads_partial_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orchestrator.yaml");
        std::fs::write(&path, "poll_interval_ms: 500\nlog_json: true\n").unwrap();

        let config = OrchestratorConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.poll_interval_ms, 500);
        assert!(config.log_json);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.metadata_command, None);
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orchestrator.yaml");
        std::fs::write(&path, "poll_interval_ms: 0\n").unwrap();

        let err = OrchestratorConfig::from_yaml_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { key: "poll_interval_ms", .. }));
    }

    #[test]
    fn reports_bad_yaml_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orchestrator.yaml");
        std::fs::write(&path, "poll_interval_ms: [nope\n").unwrap();
        assert!(matches!(
            OrchestratorConfig::from_yaml_file(&path),
            Err(ConfigError::InvalidYaml { .. })
        ));

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            OrchestratorConfig::from_yaml_file(&missing),
            Err(ConfigError::Io { .. })
        ));
    }
}
