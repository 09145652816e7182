//! Metadata migration stage
//!
//! The metadata engine is a black box behind [`MetadataMigration`]. The
//! bundled [`CommandMetadataMigration`] runs it as an external command:
//!
//! ```text
//! <program> <config_file_path> <pipeline_config_path> [--report]
//! ```
//!
//! The command prints a JSON summary on stdout, e.g.
//! `{"target_doc_count": 10, "index_names": ["index1", "index2"]}`.
//! Anything on stderr (including the change report) is forwarded to the log.

use crate::error::MetadataError;
use crate::types::{MetadataMigrationParams, MetadataMigrationResult};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Metadata stage capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataMigration: Send + Sync {
    /// Migrate index metadata and summarize what still needs transfer
    ///
    /// # Errors
    /// Any IO, engine or cluster failure; never retried by the caller.
    async fn run(
        &self,
        params: &MetadataMigrationParams,
    ) -> Result<MetadataMigrationResult, MetadataError>;
}

/// Runs the metadata engine as an external command
#[derive(Debug, Clone)]
pub struct CommandMetadataMigration {
    program: PathBuf,
}

impl CommandMetadataMigration {
    /// Create stage running `program`
    #[inline]
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Engine executable
    #[inline]
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, params: &MetadataMigrationParams) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(params.config_file_path())
            .arg(params.pipeline_config_path());
        if params.report {
            cmd.arg("--report");
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl MetadataMigration for CommandMetadataMigration {
    async fn run(
        &self,
        params: &MetadataMigrationParams,
    ) -> Result<MetadataMigrationResult, MetadataError> {
        if !params.config_file_path().is_file() {
            return Err(MetadataError::Io {
                path: params.config_file_path().to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "config file not found"),
            });
        }

        tracing::debug!(program = %self.program.display(), ?params, "Running metadata engine");

        let output = self
            .command(params)
            .output()
            .await
            .map_err(|source| MetadataError::Io {
                path: self.program.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            tracing::info!(target: "metadata_engine", "{line}");
        }

        if !output.status.success() {
            return Err(MetadataError::EngineFailed {
                exit_code: output.status.code(),
                stderr,
            });
        }

        let result: MetadataMigrationResult = serde_json::from_slice(&output.stdout)?;
        tracing::debug!(
            target_doc_count = result.target_doc_count,
            indices = result.index_names.len(),
            "Metadata engine finished"
        );
        Ok(result)
    }
}
