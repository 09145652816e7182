//! Data contracts passed between migration stages
//!
//! Defines the values that flow forward through a run:
//! - Metadata stage request and result
//! - Monitor stage request
//! - Monitor report and overall run outcome

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Request parameters for the metadata migration stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataMigrationParams {
    /// Pipeline configuration the metadata engine reads
    pub config_file_path: PathBuf,
    /// Location the engine writes the transfer pipeline to
    pub pipeline_config_path: PathBuf,
    /// Whether a human-readable change report is requested
    pub report: bool,
}

impl MetadataMigrationParams {
    /// Create new metadata params
    #[inline]
    #[must_use]
    pub fn new(
        config_file_path: impl Into<PathBuf>,
        pipeline_config_path: impl Into<PathBuf>,
        report: bool,
    ) -> Self {
        Self {
            config_file_path: config_file_path.into(),
            pipeline_config_path: pipeline_config_path.into(),
            report,
        }
    }

    /// Input config path
    #[inline]
    #[must_use]
    pub fn config_file_path(&self) -> &Path {
        &self.config_file_path
    }

    /// Output pipeline path
    #[inline]
    #[must_use]
    pub fn pipeline_config_path(&self) -> &Path {
        &self.pipeline_config_path
    }
}

/// Summary returned by the metadata migration stage
///
/// The default value means "nothing to migrate".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataMigrationResult {
    /// Total documents that still need transfer
    #[serde(default)]
    pub target_doc_count: u64,
    /// Indices that still need transfer
    #[serde(default)]
    pub index_names: BTreeSet<String>,
}

impl MetadataMigrationResult {
    /// Create new result
    #[must_use]
    pub fn new<I, S>(target_doc_count: u64, index_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target_doc_count,
            index_names: index_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether any document needs transfer
    ///
    /// Only the document count gates the transfer; `index_names` is informational.
    #[inline]
    #[must_use]
    pub fn requires_transfer(&self) -> bool {
        self.target_doc_count > 0
    }
}

/// Request parameters for the migration monitor stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationMonitorParams {
    /// Document count at which the transfer is considered complete
    pub target_doc_count: u64,
    /// Target cluster endpoint
    pub host: String,
}

impl MigrationMonitorParams {
    /// Create new monitor params
    #[inline]
    #[must_use]
    pub fn new(target_doc_count: u64, host: impl Into<String>) -> Self {
        Self {
            target_doc_count,
            host: host.into(),
        }
    }
}

/// How the monitor decided the transfer was finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    /// The target reported at least `target_doc_count` documents
    TargetReached,
    /// The transfer process exited successfully on its own
    ProcessExited,
}

/// Report returned by a successful monitor stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorReport {
    /// What ended the monitoring session
    pub completion: Completion,
    /// Exit code of the transfer process, when it had exited
    pub exit_code: Option<i32>,
    /// Last document count observed on the target, if probed
    pub documents_migrated: Option<u64>,
}

impl MonitorReport {
    /// Report for a process that exited on its own
    #[inline]
    #[must_use]
    pub fn process_exited(exit_code: Option<i32>) -> Self {
        Self {
            completion: Completion::ProcessExited,
            exit_code,
            documents_migrated: None,
        }
    }

    /// Report for a target that reached its document count
    #[inline]
    #[must_use]
    pub fn target_reached(documents_migrated: u64) -> Self {
        Self {
            completion: Completion::TargetReached,
            exit_code: None,
            documents_migrated: Some(documents_migrated),
        }
    }

    /// Attach observed document count
    #[inline]
    #[must_use]
    pub fn with_documents(mut self, documents: Option<u64>) -> Self {
        self.documents_migrated = documents;
        self
    }

    /// Attach exit code
    #[inline]
    #[must_use]
    pub fn with_exit_code(mut self, exit_code: Option<i32>) -> Self {
        self.exit_code = exit_code;
        self
    }
}

/// Successful outcome of an orchestrator run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Metadata stage found nothing to transfer
    Skipped {
        /// Result returned by the metadata stage
        metadata: MetadataMigrationResult,
    },
    /// Transfer launched and monitored to completion
    Completed {
        /// Result returned by the metadata stage
        metadata: MetadataMigrationResult,
        /// Report returned by the monitor stage
        report: MonitorReport,
    },
}

impl RunOutcome {
    /// Whether the transfer stages were skipped
    #[inline]
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Metadata result of the run
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &MetadataMigrationResult {
        match self {
            Self::Skipped { metadata } | Self::Completed { metadata, .. } => metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_result_is_empty() {
        let result = MetadataMigrationResult::default();
        assert_eq!(result.target_doc_count, 0);
        assert!(result.index_names.is_empty());
        assert!(!result.requires_transfer());
    }

    #[test]
    fn count_alone_gates_transfer() {
        let no_indices = MetadataMigrationResult::new(5, Vec::<String>::new());
        assert!(no_indices.requires_transfer());

        let no_docs = MetadataMigrationResult::new(0, ["index1"]);
        assert!(!no_docs.requires_transfer());
    }

    #[test]
    fn index_names_are_deduplicated() {
        let result = MetadataMigrationResult::new(3, ["a", "b", "a"]);
        assert_eq!(result.index_names.len(), 2);
    }

    #[test]
    fn result_parses_from_engine_summary() {
        let result: MetadataMigrationResult =
            serde_json::from_str(r#"{"target_doc_count": 10, "index_names": ["index1", "index2"]}"#)
                .unwrap();
        assert_eq!(result, MetadataMigrationResult::new(10, ["index1", "index2"]));

        let empty: MetadataMigrationResult = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, MetadataMigrationResult::default());
    }

    #[test]
    fn outcome_exposes_metadata() {
        let outcome = RunOutcome::Skipped {
            metadata: MetadataMigrationResult::default(),
        };
        assert!(outcome.is_skipped());
        assert_eq!(outcome.metadata().target_doc_count, 0);
    }
}
