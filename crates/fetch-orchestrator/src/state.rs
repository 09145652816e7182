//! Run state machine
//!
//! ```text
//! Start -> MetadataDone -> Skipped
//!                       -> TransferRunning -> Monitoring -> Done
//! any non-terminal state -> Failed
//! ```

use serde::{Deserialize, Serialize};

/// Orchestrator run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Nothing has run yet
    Start,
    /// Metadata stage returned a result
    MetadataDone,
    /// Nothing to transfer (terminal)
    Skipped,
    /// Transfer process launched
    TransferRunning,
    /// Monitor stage in progress
    Monitoring,
    /// Transfer monitored to completion (terminal)
    Done,
    /// A stage failed (terminal)
    Failed,
}

impl RunState {
    /// Whether no further transitions are allowed
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Skipped | Self::Done | Self::Failed)
    }

    /// Whether the state is a successful terminal
    #[inline]
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Skipped | Self::Done)
    }

    /// Check a transition against the state graph
    #[must_use]
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::{Done, Failed, MetadataDone, Monitoring, Skipped, Start, TransferRunning};
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Start, MetadataDone)
            | (MetadataDone, Skipped | TransferRunning)
            | (TransferRunning, Monitoring)
            | (Monitoring, Done) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::MetadataDone => "metadata_done",
            Self::Skipped => "skipped",
            Self::TransferRunning => "transfer_running",
            Self::Monitoring => "monitoring",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Records the states a single run passes through
#[derive(Debug, Clone)]
pub struct RunTrail {
    states: Vec<RunState>,
}

impl RunTrail {
    /// New trail at `Start`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: vec![RunState::Start],
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn current(&self) -> RunState {
        self.states.last().copied().unwrap_or(RunState::Start)
    }

    /// Move to `next`, logging the transition
    ///
    /// Illegal transitions are ignored and logged; the orchestrator only
    /// issues legal ones.
    pub fn advance(&mut self, next: RunState) {
        let current = self.current();
        if current.can_transition_to(next) {
            tracing::info!(from = %current, to = %next, "Run state changed");
            self.states.push(next);
        } else {
            tracing::warn!(from = %current, to = %next, "Ignoring illegal run transition");
        }
    }

    /// All visited states in order
    #[inline]
    #[must_use]
    pub fn states(&self) -> &[RunState] {
        &self.states
    }
}

impl Default for RunTrail {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_paths_are_legal() {
        assert!(RunState::Start.can_transition_to(RunState::MetadataDone));
        assert!(RunState::MetadataDone.can_transition_to(RunState::Skipped));
        assert!(RunState::MetadataDone.can_transition_to(RunState::TransferRunning));
        assert!(RunState::TransferRunning.can_transition_to(RunState::Monitoring));
        assert!(RunState::Monitoring.can_transition_to(RunState::Done));
    }

    #[test]
    fn failure_reachable_from_non_terminal_only() {
        for state in [
            RunState::Start,
            RunState::MetadataDone,
            RunState::TransferRunning,
            RunState::Monitoring,
        ] {
            assert!(state.can_transition_to(RunState::Failed), "{state}");
        }
        for state in [RunState::Skipped, RunState::Done, RunState::Failed] {
            assert!(!state.can_transition_to(RunState::Failed), "{state}");
        }
    }

    #[test]
    fn skipping_stages_is_illegal() {
        assert!(!RunState::Start.can_transition_to(RunState::TransferRunning));
        assert!(!RunState::MetadataDone.can_transition_to(RunState::Monitoring));
        assert!(!RunState::Skipped.can_transition_to(RunState::TransferRunning));
    }

    #[test]
    fn terminal_states() {
        assert!(RunState::Skipped.is_success());
        assert!(RunState::Done.is_success());
        assert!(!RunState::Failed.is_success());
        assert!(RunState::Failed.is_terminal());
        assert!(!RunState::Monitoring.is_terminal());
    }

    #[test]
    fn trail_records_transitions() {
        let mut trail = RunTrail::new();
        trail.advance(RunState::MetadataDone);
        trail.advance(RunState::Skipped);

        assert_eq!(trail.current(), RunState::Skipped);
        assert_eq!(
            trail.states(),
            &[RunState::Start, RunState::MetadataDone, RunState::Skipped]
        );
    }
}
