//! Fetch migration orchestrator
//!
//! Sequences the three stages of a migration:
//! - Metadata migration, which decides whether documents need transfer
//! - Transfer process launch
//! - Transfer monitoring
//!
//! The gate after the metadata stage is the only branch point: a result
//! with no documents ends the run successfully without launching anything.

use crate::config::OrchestratorConfig;
use crate::error::{ConfigError, MigrationError};
use crate::metadata::{CommandMetadataMigration, MetadataMigration};
use crate::monitor::{MigrationMonitor, ProcessExitMonitor};
use crate::paths::MigrationPaths;
use crate::pipeline::write_inline_pipeline;
use crate::process::{ProcessLauncher, TransferLauncher};
use crate::state::{RunState, RunTrail};
use crate::types::{MetadataMigrationParams, MigrationMonitorParams, RunOutcome};
use std::path::Path;
use std::sync::Arc;
use tracing::Instrument;

/// The migration orchestrator
///
/// Holds the three stage capabilities; each run is independent.
#[derive(Clone)]
pub struct FetchOrchestrator {
    metadata: Arc<dyn MetadataMigration>,
    launcher: Arc<dyn TransferLauncher>,
    monitor: Arc<dyn MigrationMonitor>,
}

impl std::fmt::Debug for FetchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOrchestrator").finish_non_exhaustive()
    }
}

impl FetchOrchestrator {
    /// Create orchestrator from stage implementations
    #[inline]
    #[must_use]
    pub fn new(
        metadata: Arc<dyn MetadataMigration>,
        launcher: Arc<dyn TransferLauncher>,
        monitor: Arc<dyn MigrationMonitor>,
    ) -> Self {
        Self {
            metadata,
            launcher,
            monitor,
        }
    }

    /// Production wiring for a base path
    ///
    /// Uses the command-backed metadata engine, a real process launcher and
    /// the process-exit monitor. No progress probe is wired, so the monitor
    /// completes on transfer process exit.
    ///
    /// # Errors
    /// `ConfigError::InvalidSetting` if `config` fails validation.
    pub fn from_config(config: &OrchestratorConfig, base_path: &Path) -> Result<Self, ConfigError> {
        config.validate()?;
        let paths = MigrationPaths::new(base_path);
        Ok(Self::new(
            Arc::new(CommandMetadataMigration::new(config.metadata_program(&paths))),
            Arc::new(ProcessLauncher::new()),
            Arc::new(ProcessExitMonitor::new(config.poll_interval())),
        ))
    }

    /// Metadata stage parameters for a run
    ///
    /// Always `{config_file, <base>/pipelines/pipeline.yaml, report: true}`.
    #[must_use]
    pub fn metadata_params(paths: &MigrationPaths, config_file: &Path) -> MetadataMigrationParams {
        MetadataMigrationParams::new(config_file, paths.pipeline_config(), true)
    }

    /// Run a migration
    ///
    /// # Arguments
    /// * `base_path` - Install root holding `pipelines/` and `bin/`
    /// * `config_file` - Pipeline configuration read by the metadata engine
    /// * `target_host` - Target cluster endpoint handed to the monitor
    ///
    /// # Errors
    /// The first failing stage's error, unchanged. Nothing is retried.
    pub async fn run(
        &self,
        base_path: impl AsRef<Path>,
        config_file: impl AsRef<Path>,
        target_host: &str,
    ) -> Result<RunOutcome, MigrationError> {
        let mut trail = RunTrail::new();
        self.run_with_trail(base_path.as_ref(), config_file.as_ref(), target_host, &mut trail)
            .await
    }

    /// Write an inline pipeline to `config_file`, then run
    ///
    /// `inline` is a base64 pipeline definition; `None` runs against the
    /// existing `config_file`.
    ///
    /// # Errors
    /// `MigrationError::Config` if the pipeline cannot be decoded or written,
    /// in which case no stage is called. Otherwise as [`FetchOrchestrator::run`].
    pub async fn run_with_inline_pipeline(
        &self,
        base_path: impl AsRef<Path>,
        config_file: impl AsRef<Path>,
        target_host: &str,
        inline: Option<&str>,
    ) -> Result<RunOutcome, MigrationError> {
        let config_file = config_file.as_ref();
        if let Some(encoded) = inline {
            write_inline_pipeline(encoded, config_file).map_err(|err| {
                let err = MigrationError::from(err);
                tracing::error!(stage = %err.stage(), error = %err, "Migration run failed");
                err
            })?;
        }
        self.run(base_path, config_file, target_host).await
    }

    /// Run a migration, recording visited states in `trail`
    ///
    /// # Errors
    /// See [`FetchOrchestrator::run`].
    pub async fn run_with_trail(
        &self,
        base_path: &Path,
        config_file: &Path,
        target_host: &str,
        trail: &mut RunTrail,
    ) -> Result<RunOutcome, MigrationError> {
        let span = tracing::info_span!(
            "fetch_migration",
            base_path = %base_path.display(),
            target_host
        );

        let result = self
            .run_stages(base_path, config_file, target_host, trail)
            .instrument(span)
            .await;

        if let Err(err) = &result {
            tracing::error!(stage = %err.stage(), error = %err, "Migration run failed");
            trail.advance(RunState::Failed);
        }
        result
    }

    async fn run_stages(
        &self,
        base_path: &Path,
        config_file: &Path,
        target_host: &str,
        trail: &mut RunTrail,
    ) -> Result<RunOutcome, MigrationError> {
        let paths = MigrationPaths::new(base_path);

        // 1. Metadata migration
        let params = Self::metadata_params(&paths, config_file);
        let metadata = self.metadata.run(&params).await?;
        trail.advance(RunState::MetadataDone);

        // 2. Gate
        if !metadata.requires_transfer() {
            tracing::info!(
                indices = metadata.index_names.len(),
                "No documents to migrate, skipping transfer"
            );
            trail.advance(RunState::Skipped);
            return Ok(RunOutcome::Skipped { metadata });
        }
        if metadata.index_names.is_empty() {
            tracing::warn!(
                target_doc_count = metadata.target_doc_count,
                "Documents reported without any index names"
            );
        }
        tracing::info!(
            target_doc_count = metadata.target_doc_count,
            indices = ?metadata.index_names,
            "Documents require transfer"
        );

        // 3. Launch transfer
        let process = self.launcher.launch(&paths.transfer_executable())?;
        trail.advance(RunState::TransferRunning);

        // 4. Monitor until finished; the handle is moved in
        let monitor_params = MigrationMonitorParams::new(metadata.target_doc_count, target_host);
        trail.advance(RunState::Monitoring);
        let report = self.monitor.run(&monitor_params, process).await?;
        trail.advance(RunState::Done);

        tracing::info!(completion = ?report.completion, exit_code = ?report.exit_code, "Migration complete");
        Ok(RunOutcome::Completed { metadata, report })
    }
}
