//! Testing utilities for the fetch migration workspace
//!
//! Recording fakes for the three stage capabilities. Every call is appended
//! to a shared [`CallLog`] so tests can assert on the exact downstream
//! sequence a run produced.

#![allow(missing_docs)]

use async_trait::async_trait;
use fetch_orchestrator::{
    FetchOrchestrator, LaunchError, MetadataError, MetadataMigration, MetadataMigrationParams,
    MetadataMigrationResult, MigrationMonitor, MigrationMonitorParams, MonitorError,
    MonitorReport, ProcessStatus, TransferLauncher, TransferProcess,
};
use parking_lot::Mutex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A single stage invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Metadata(MetadataMigrationParams),
    Launch(PathBuf),
    Monitor {
        params: MigrationMonitorParams,
        process_id: Option<u32>,
    },
}

/// Shared, ordered record of stage calls
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn record(&self, call: Call) {
        self.0.lock().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    pub fn launches(&self) -> usize {
        self.0.lock().iter().filter(|c| matches!(c, Call::Launch(_))).count()
    }

    pub fn monitors(&self) -> usize {
        self.0
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::Monitor { .. }))
            .count()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Process handle with a fixed id and outcome
#[derive(Debug, Clone, Copy)]
pub struct FakeProcess {
    pub id: u32,
    pub outcome: ProcessStatus,
}

#[async_trait]
impl TransferProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(self.id)
    }

    fn try_status(&mut self) -> io::Result<ProcessStatus> {
        Ok(self.outcome)
    }

    async fn wait(&mut self) -> io::Result<ProcessStatus> {
        Ok(self.outcome)
    }

    async fn terminate(&mut self) -> io::Result<ProcessStatus> {
        Ok(self.outcome)
    }
}

pub struct RecordingMetadata {
    log: CallLog,
    result: MetadataMigrationResult,
    failure: Option<String>,
}

#[async_trait]
impl MetadataMigration for RecordingMetadata {
    async fn run(
        &self,
        params: &MetadataMigrationParams,
    ) -> Result<MetadataMigrationResult, MetadataError> {
        self.log.record(Call::Metadata(params.clone()));
        match &self.failure {
            Some(reason) => Err(MetadataError::EngineFailed {
                exit_code: Some(1),
                stderr: reason.clone(),
            }),
            None => Ok(self.result.clone()),
        }
    }
}

pub struct RecordingLauncher {
    log: CallLog,
    next_id: AtomicU32,
    fail: bool,
    outcome: ProcessStatus,
}

impl TransferLauncher for RecordingLauncher {
    fn launch(&self, executable: &Path) -> Result<Box<dyn TransferProcess>, LaunchError> {
        self.log.record(Call::Launch(executable.to_path_buf()));
        if self.fail {
            return Err(LaunchError::NotFound(executable.to_path_buf()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeProcess {
            id,
            outcome: self.outcome,
        }))
    }
}

pub struct RecordingMonitor {
    log: CallLog,
}

#[async_trait]
impl MigrationMonitor for RecordingMonitor {
    async fn run(
        &self,
        params: &MigrationMonitorParams,
        mut process: Box<dyn TransferProcess>,
    ) -> Result<MonitorReport, MonitorError> {
        self.log.record(Call::Monitor {
            params: params.clone(),
            process_id: process.id(),
        });
        let status = process.wait().await?;
        if status.succeeded() {
            Ok(MonitorReport::process_exited(status.exit_code()))
        } else {
            Err(MonitorError::ProcessFailed {
                exit_code: status.exit_code(),
            })
        }
    }
}

/// Builder wiring recording fakes into an orchestrator
#[derive(Debug, Clone)]
pub struct StageFakes {
    result: MetadataMigrationResult,
    metadata_failure: Option<String>,
    launch_fails: bool,
    process_outcome: ProcessStatus,
    first_process_id: u32,
}

impl StageFakes {
    pub fn new() -> Self {
        Self {
            result: MetadataMigrationResult::default(),
            metadata_failure: None,
            launch_fails: false,
            process_outcome: ProcessStatus::Exited(Some(0)),
            first_process_id: 1000,
        }
    }

    pub fn metadata_result(mut self, result: MetadataMigrationResult) -> Self {
        self.result = result;
        self
    }

    pub fn fail_metadata(mut self, reason: impl Into<String>) -> Self {
        self.metadata_failure = Some(reason.into());
        self
    }

    pub fn fail_launch(mut self) -> Self {
        self.launch_fails = true;
        self
    }

    pub fn process_outcome(mut self, outcome: ProcessStatus) -> Self {
        self.process_outcome = outcome;
        self
    }

    pub fn first_process_id(mut self, id: u32) -> Self {
        self.first_process_id = id;
        self
    }

    pub fn build(self) -> (FetchOrchestrator, CallLog) {
        let log = CallLog::default();
        let orchestrator = FetchOrchestrator::new(
            Arc::new(RecordingMetadata {
                log: log.clone(),
                result: self.result,
                failure: self.metadata_failure,
            }),
            Arc::new(RecordingLauncher {
                log: log.clone(),
                next_id: AtomicU32::new(self.first_process_id),
                fail: self.launch_fails,
                outcome: self.process_outcome,
            }),
            Arc::new(RecordingMonitor { log: log.clone() }),
        );
        (orchestrator, log)
    }
}

impl Default for StageFakes {
    fn default() -> Self {
        Self::new()
    }
}

pub fn setup_orchestrator(result: MetadataMigrationResult) -> (FetchOrchestrator, CallLog) {
    StageFakes::new().metadata_result(result).build()
}
