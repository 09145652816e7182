//! Fetch Migration Orchestrator
//!
//! Coordinates a migration between two search clusters:
//! - Migrates index metadata and decides whether documents need transfer
//! - Launches the document transfer engine as a child process
//! - Monitors the transfer until it completes or fails
//!
//! # Example
//!
//! ```rust,ignore
//! use fetch_orchestrator::{FetchOrchestrator, OrchestratorConfig};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OrchestratorConfig::new();
//! let base = Path::new("/code/data-prepper");
//! let orchestrator = FetchOrchestrator::from_config(&config, base)?;
//!
//! let outcome = orchestrator
//!     .run(base, "/code/input.yaml", "https://target:9200")
//!     .await?;
//! println!("skipped: {}", outcome.is_skipped());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod monitor;
pub mod orchestrator;
pub mod paths;
pub mod pipeline;
pub mod process;
pub mod state;
pub mod types;

pub use config::OrchestratorConfig;
pub use error::{ConfigError, LaunchError, MetadataError, MigrationError, MonitorError, Stage};
pub use metadata::{CommandMetadataMigration, MetadataMigration};
pub use monitor::{MigrationMonitor, ProcessExitMonitor, ProgressProbe};
pub use orchestrator::FetchOrchestrator;
pub use paths::{MigrationPaths, TRANSFER_TOOL_NAME};
pub use process::{ChildProcess, ProcessLauncher, ProcessStatus, TransferLauncher, TransferProcess};
pub use state::{RunState, RunTrail};
pub use types::{
    Completion, MetadataMigrationParams, MetadataMigrationResult, MigrationMonitorParams,
    MonitorReport, RunOutcome,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring an orchestrator
    pub use crate::{
        FetchOrchestrator, MetadataMigration, MetadataMigrationParams, MetadataMigrationResult,
        MigrationError, MigrationMonitor, MigrationMonitorParams, MonitorReport, RunOutcome,
        TransferLauncher, TransferProcess,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
