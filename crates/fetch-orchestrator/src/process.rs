//! Transfer process launch and handle
//!
//! The transfer engine is an external executable. The orchestrator only
//! sees it through [`TransferProcess`], a narrow handle exposing identity,
//! completion and outcome.

use crate::error::LaunchError;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Observed state of a transfer process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Still running
    Running,
    /// Exited; `None` when terminated by a signal
    Exited(Option<i32>),
}

impl ProcessStatus {
    /// Whether the process is still running
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Whether the process exited with code 0
    #[inline]
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Exited(Some(0)))
    }

    /// Exit code, if the process exited normally
    #[inline]
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => *code,
            Self::Running => None,
        }
    }
}

/// Handle to a launched transfer process
#[async_trait]
pub trait TransferProcess: Send {
    /// OS process id while the process is known to be alive
    fn id(&self) -> Option<u32>;

    /// Non-blocking status check
    fn try_status(&mut self) -> io::Result<ProcessStatus>;

    /// Wait for the process to exit
    async fn wait(&mut self) -> io::Result<ProcessStatus>;

    /// Stop the process and wait for it; no-op if already exited
    async fn terminate(&mut self) -> io::Result<ProcessStatus>;
}

/// Starts the transfer executable
#[cfg_attr(test, mockall::automock)]
pub trait TransferLauncher: Send + Sync {
    /// Start `executable` with no arguments and return immediately
    ///
    /// # Errors
    /// - `LaunchError::NotFound` if the executable does not exist
    /// - `LaunchError::NotExecutable` if it cannot be run
    /// - `LaunchError::Spawn` for any other spawn failure
    fn launch(&self, executable: &Path) -> Result<Box<dyn TransferProcess>, LaunchError>;
}

/// Child process backed handle
#[derive(Debug)]
pub struct ChildProcess {
    child: Child,
    executable: PathBuf,
}

impl ChildProcess {
    /// Executable this process was started from
    #[inline]
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

#[async_trait]
impl TransferProcess for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn try_status(&mut self) -> io::Result<ProcessStatus> {
        Ok(match self.child.try_wait()? {
            Some(status) => ProcessStatus::Exited(status.code()),
            None => ProcessStatus::Running,
        })
    }

    async fn wait(&mut self) -> io::Result<ProcessStatus> {
        let status = self.child.wait().await?;
        Ok(ProcessStatus::Exited(status.code()))
    }

    async fn terminate(&mut self) -> io::Result<ProcessStatus> {
        if let Some(status) = self.child.try_wait()? {
            return Ok(ProcessStatus::Exited(status.code()));
        }
        tracing::info!(executable = %self.executable.display(), "Terminating transfer process");
        self.child.kill().await?;
        self.wait().await
    }
}

/// Launches the transfer executable as a child process
///
/// Stdout and stderr are inherited. The child is killed if its handle is
/// dropped while still running, so an aborted run never leaves it behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    /// Create new launcher
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Spawn and return the concrete handle
    ///
    /// # Errors
    /// See [`TransferLauncher::launch`].
    pub fn spawn(&self, executable: &Path) -> Result<ChildProcess, LaunchError> {
        if !executable.exists() {
            return Err(LaunchError::NotFound(executable.to_path_buf()));
        }

        let child = Command::new(executable)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => LaunchError::NotFound(executable.to_path_buf()),
                io::ErrorKind::PermissionDenied => {
                    LaunchError::NotExecutable(executable.to_path_buf())
                }
                _ => LaunchError::Spawn {
                    path: executable.to_path_buf(),
                    source,
                },
            })?;

        tracing::info!(
            executable = %executable.display(),
            pid = ?child.id(),
            "Launched transfer process"
        );

        Ok(ChildProcess {
            child,
            executable: executable.to_path_buf(),
        })
    }
}

impl TransferLauncher for ProcessLauncher {
    fn launch(&self, executable: &Path) -> Result<Box<dyn TransferProcess>, LaunchError> {
        Ok(Box::new(self.spawn(executable)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_helpers() {
        assert!(ProcessStatus::Running.is_running());
        assert!(ProcessStatus::Exited(Some(0)).succeeded());
        assert!(!ProcessStatus::Exited(Some(2)).succeeded());
        assert!(!ProcessStatus::Exited(None).succeeded());
        assert_eq!(ProcessStatus::Exited(Some(2)).exit_code(), Some(2));
        assert_eq!(ProcessStatus::Running.exit_code(), None);
    }

    #[tokio::test]
    async fn missing_executable_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin").join("data-prepper");

        let result = ProcessLauncher::new().launch(&path);
        assert!(matches!(result, Err(LaunchError::NotFound(p)) if p == path));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_executable_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data-prepper");
        std::fs::write(&path, "not a program").unwrap();

        let result = ProcessLauncher::new().launch(&path);
        assert!(matches!(result, Err(LaunchError::NotExecutable(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn launched_process_reports_exit() {
        // sh reads an empty stdin and exits cleanly
        let mut process = ProcessLauncher::new().spawn(Path::new("/bin/sh")).unwrap();
        assert_eq!(process.executable(), Path::new("/bin/sh"));

        let status = process.wait().await.unwrap();
        assert!(status.succeeded());

        // Terminating an exited process is a no-op
        let status = process.terminate().await.unwrap();
        assert_eq!(status, ProcessStatus::Exited(Some(0)));
    }
}
