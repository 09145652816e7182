//! Migration monitor stage
//!
//! Watches a running transfer until the target reports enough documents or
//! the transfer process exits. How progress is measured is left to a
//! [`ProgressProbe`]; without one, only process exit is observed.

use crate::error::MonitorError;
use crate::process::{ProcessStatus, TransferProcess};
use crate::types::{MigrationMonitorParams, MonitorReport};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Monitor stage capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MigrationMonitor: Send + Sync {
    /// Block until the transfer is finished
    ///
    /// Takes ownership of the process handle; the handle's lifetime ends
    /// when this returns.
    ///
    /// # Errors
    /// - `MonitorError::ProcessFailed` if the process exits unsuccessfully
    ///   before the target count is reached
    /// - `MonitorError::TargetUnreachable` if progress cannot be queried
    async fn run(
        &self,
        params: &MigrationMonitorParams,
        process: Box<dyn TransferProcess>,
    ) -> Result<MonitorReport, MonitorError>;
}

/// Source of migrated document counts on the target cluster
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressProbe: Send + Sync {
    /// Documents currently present on `host` for this migration
    ///
    /// # Errors
    /// `MonitorError::TargetUnreachable` if the host cannot be queried.
    async fn documents_migrated(&self, host: &str) -> Result<u64, MonitorError>;
}

/// Polling monitor driven by the process handle and an optional probe
///
/// Without an injected [`ProgressProbe`] the target host and document count
/// are only logged; completion is decided by the transfer process exit
/// status alone, and `MonitorError::TargetUnreachable` cannot occur.
#[derive(Clone)]
pub struct ProcessExitMonitor {
    poll_interval: Duration,
    probe: Option<Arc<dyn ProgressProbe>>,
}

impl std::fmt::Debug for ProcessExitMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessExitMonitor")
            .field("poll_interval", &self.poll_interval)
            .field("probe", &self.probe.is_some())
            .finish()
    }
}

impl ProcessExitMonitor {
    /// Shortest accepted poll interval
    pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

    /// Create monitor polling every `poll_interval`
    ///
    /// A zero interval is raised to [`ProcessExitMonitor::MIN_POLL_INTERVAL`].
    #[inline]
    #[must_use]
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval: poll_interval.max(Self::MIN_POLL_INTERVAL),
            probe: None,
        }
    }

    /// With progress probe
    #[inline]
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn ProgressProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Poll interval
    #[inline]
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Default for ProcessExitMonitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl MigrationMonitor for ProcessExitMonitor {
    async fn run(
        &self,
        params: &MigrationMonitorParams,
        mut process: Box<dyn TransferProcess>,
    ) -> Result<MonitorReport, MonitorError> {
        tracing::info!(
            host = %params.host,
            target_doc_count = params.target_doc_count,
            pid = ?process.id(),
            "Monitoring transfer"
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut documents = None;

        loop {
            ticker.tick().await;

            if let Some(probe) = &self.probe {
                let migrated = probe.documents_migrated(&params.host).await?;
                documents = Some(migrated);
                tracing::debug!(migrated, target = params.target_doc_count, "Transfer progress");

                if migrated >= params.target_doc_count {
                    tracing::info!(migrated, "Target document count reached");
                    let status = process.terminate().await?;
                    return Ok(MonitorReport::target_reached(migrated)
                        .with_exit_code(status.exit_code()));
                }
            }

            match process.try_status()? {
                ProcessStatus::Running => {}
                status if status.succeeded() => {
                    tracing::info!("Transfer process exited successfully");
                    return Ok(MonitorReport::process_exited(status.exit_code())
                        .with_documents(documents));
                }
                status => {
                    tracing::error!(exit_code = ?status.exit_code(), "Transfer process failed");
                    return Err(MonitorError::ProcessFailed {
                        exit_code: status.exit_code(),
                    });
                }
            }
        }
    }
}
