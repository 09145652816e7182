//! Error types for the fetch orchestrator
//!
//! One error enum per stage, wrapped by [`MigrationError`]:
//! - Configuration and inline pipeline failures
//! - Metadata migration failures
//! - Transfer process launch failures
//! - Monitoring failures
//!
//! Stage errors are surfaced unchanged; the orchestrator never retries.

use std::path::PathBuf;

/// Stage that produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Configuration loading, before any stage ran
    Configuration,
    /// Metadata migration
    Metadata,
    /// Transfer process launch
    Launch,
    /// Transfer monitoring
    Monitor,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Configuration => "configuration",
            Stage::Metadata => "metadata",
            Stage::Launch => "launch",
            Stage::Monitor => "monitor",
        };
        f.write_str(name)
    }
}

/// Main orchestrator error type
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Metadata stage failed
    #[error("metadata migration failed: {0}")]
    Metadata(#[from] MetadataError),

    /// Transfer process could not be started
    #[error("transfer launch failed: {0}")]
    Launch(#[from] LaunchError),

    /// Monitor stage failed
    #[error("migration monitor failed: {0}")]
    Monitor(#[from] MonitorError),
}

impl MigrationError {
    /// Stage the error originated from
    #[inline]
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Config(_) => Stage::Configuration,
            Self::Metadata(_) => Stage::Metadata,
            Self::Launch(_) => Stage::Launch,
            Self::Monitor(_) => Stage::Monitor,
        }
    }

    /// Process exit code the CLI uses for any failed run
    pub const EXIT_CODE: i32 = 1;
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read or written
    #[error("{}: {source}", .path.display())]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid YAML
    #[error("invalid YAML in {}: {source}", .path.display())]
    InvalidYaml {
        /// Offending path
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_yaml::Error,
    },

    /// Inline pipeline is not valid base64
    #[error("inline pipeline is not valid base64: {0}")]
    InvalidInlinePipeline(#[from] base64::DecodeError),

    /// Inline pipeline decoded to non UTF-8 bytes
    #[error("inline pipeline is not valid UTF-8: {0}")]
    InlinePipelineEncoding(#[from] std::string::FromUtf8Error),

    /// A setting has an unusable value
    #[error("invalid setting {key}: {reason}")]
    InvalidSetting {
        /// Setting name
        key: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Metadata migration errors
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// Engine input/output could not be accessed
    #[error("{}: {source}", .path.display())]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Engine exited unsuccessfully
    #[error("engine exited with {}: {stderr}", display_code(.exit_code.as_ref()))]
    EngineFailed {
        /// Exit code, `None` if killed by a signal
        exit_code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// Engine summary could not be parsed
    #[error("invalid engine summary: {0}")]
    InvalidSummary(#[from] serde_json::Error),
}

/// Transfer process launch errors
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// Executable does not exist
    #[error("executable not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Executable exists but cannot be executed
    #[error("executable not runnable: {}", .0.display())]
    NotExecutable(PathBuf),

    /// Spawn failed for another reason
    #[error("failed to spawn {}: {source}", .path.display())]
    Spawn {
        /// Executable path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// Monitoring errors
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Transfer process ended abnormally before reaching the target count
    #[error("transfer process failed with {}", display_code(.exit_code.as_ref()))]
    ProcessFailed {
        /// Exit code, `None` if killed by a signal
        exit_code: Option<i32>,
    },

    /// Target cluster could not be queried
    #[error("target {host} unreachable: {reason}")]
    TargetUnreachable {
        /// Target endpoint
        host: String,
        /// Probe failure description
        reason: String,
    },

    /// Process handle could not be observed or signalled
    #[error("process handle error: {0}")]
    Handle(#[from] std::io::Error),
}

fn display_code(code: Option<&i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "signal".to_string(),
    }
}
