//! Bootstrap State Management and Phase Tracking
//!
//! - `BootstrapPhase`: discrete steps of a bootstrap run
//! - `BootstrapState`: current phase plus timing and failure details
//! - `BootstrapReport`: what a run actually did, and what it skipped

use crate::error::BuildError;
use crate::models::Tool;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

/// Phase of a bootstrap run. Phases advance strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BootstrapPhase {
    /// Toolchain root creation
    Preparation,

    /// NASM installer (Windows hosts only, no-op elsewhere)
    Nasm,

    /// binutils download, extract, configure, make, install
    Binutils,

    /// GCC download, extract, configure, make, install
    Gcc,

    Completed,

    Failed,
}

impl BootstrapPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BootstrapPhase::Preparation => "preparation",
            BootstrapPhase::Nasm => "nasm",
            BootstrapPhase::Binutils => "binutils",
            BootstrapPhase::Gcc => "gcc",
            BootstrapPhase::Completed => "completed",
            BootstrapPhase::Failed => "failed",
        }
    }

    /// Get all valid phase transitions FROM this phase.
    pub fn valid_next_phases(&self) -> Vec<BootstrapPhase> {
        match self {
            BootstrapPhase::Preparation => vec![BootstrapPhase::Nasm, BootstrapPhase::Failed],
            BootstrapPhase::Nasm => vec![BootstrapPhase::Binutils, BootstrapPhase::Failed],
            BootstrapPhase::Binutils => vec![BootstrapPhase::Gcc, BootstrapPhase::Failed],
            BootstrapPhase::Gcc => vec![BootstrapPhase::Completed, BootstrapPhase::Failed],
            BootstrapPhase::Completed => vec![],
            // A failed run can be started over; every step is idempotent
            BootstrapPhase::Failed => vec![BootstrapPhase::Preparation],
        }
    }

    pub fn can_transition_to(&self, next: BootstrapPhase) -> bool {
        self.valid_next_phases().contains(&next)
    }

    /// Phase that builds the given tool.
    pub fn for_tool(tool: Tool) -> BootstrapPhase {
        match tool {
            Tool::Nasm => BootstrapPhase::Nasm,
            Tool::Binutils => BootstrapPhase::Binutils,
            Tool::Gcc => BootstrapPhase::Gcc,
        }
    }
}

impl std::fmt::Display for BootstrapPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state of one run, owned by the `Bootstrapper`.
#[derive(Debug, Clone)]
pub struct BootstrapState {
    pub phase: BootstrapPhase,
    pub start_time: SystemTime,
    pub last_update_time: SystemTime,
    /// Error message if the run failed
    pub error: Option<String>,
    /// Every phase entered, in order, starting with `Preparation`
    pub history: Vec<BootstrapPhase>,
}

impl Default for BootstrapState {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapState {
    pub fn new() -> Self {
        let now = SystemTime::now();
        BootstrapState {
            phase: BootstrapPhase::Preparation,
            start_time: now,
            last_update_time: now,
            error: None,
            history: vec![BootstrapPhase::Preparation],
        }
    }

    /// Attempt to transition to the next phase.
    pub fn transition_to(&mut self, next: BootstrapPhase) -> Result<(), BuildError> {
        if !self.phase.can_transition_to(next) {
            return Err(BuildError::InvalidTransition(format!(
                "{} -> {}",
                self.phase, next
            )));
        }
        self.phase = next;
        self.history.push(next);
        self.last_update_time = SystemTime::now();
        Ok(())
    }

    /// Record an error and mark the run as failed.
    pub fn record_error(&mut self, error: String) {
        self.error = Some(error);
        if self.phase != BootstrapPhase::Failed {
            self.phase = BootstrapPhase::Failed;
            self.history.push(BootstrapPhase::Failed);
        }
        self.last_update_time = SystemTime::now();
    }

    pub fn elapsed_since_start(&self) -> Result<std::time::Duration, std::time::SystemTimeError> {
        self.start_time.elapsed()
    }
}

/// Outcome of a successful bootstrap run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Tools whose archive or installer was fetched during this run
    pub downloaded: Vec<Tool>,
    /// Tools whose archive was unpacked during this run
    pub extracted: Vec<Tool>,
    /// Directories created during this run
    pub created_dirs: Vec<PathBuf>,
    /// External commands executed, in order (display form)
    pub commands_run: Vec<String>,
    /// Steps skipped because their output already existed
    pub skipped: Vec<String>,
    /// Phases entered, in order
    pub phases: Vec<BootstrapPhase>,
}

impl BootstrapReport {
    /// True when the run neither downloaded, extracted nor created anything.
    pub fn is_no_op_acquisition(&self) -> bool {
        self.downloaded.is_empty() && self.extracted.is_empty() && self.created_dirs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        assert!(BootstrapPhase::Preparation.can_transition_to(BootstrapPhase::Nasm));
        assert!(BootstrapPhase::Binutils.can_transition_to(BootstrapPhase::Gcc));
        assert!(!BootstrapPhase::Preparation.can_transition_to(BootstrapPhase::Gcc));
        assert!(!BootstrapPhase::Gcc.can_transition_to(BootstrapPhase::Binutils));
        assert!(BootstrapPhase::Completed.valid_next_phases().is_empty());
    }

    #[test]
    fn test_full_run_history() {
        let mut state = BootstrapState::new();
        for phase in [
            BootstrapPhase::Nasm,
            BootstrapPhase::Binutils,
            BootstrapPhase::Gcc,
            BootstrapPhase::Completed,
        ] {
            state.transition_to(phase).expect("valid transition");
        }
        assert_eq!(state.phase, BootstrapPhase::Completed);
        assert_eq!(state.history.len(), 5);
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut state = BootstrapState::new();
        let err = state.transition_to(BootstrapPhase::Completed).unwrap_err();
        assert!(matches!(err, BuildError::InvalidTransition(_)));
        assert_eq!(state.phase, BootstrapPhase::Preparation);
    }

    #[test]
    fn test_record_error_marks_failed() {
        let mut state = BootstrapState::new();
        state.transition_to(BootstrapPhase::Nasm).unwrap();
        state.record_error("make exited with 2".to_string());

        assert_eq!(state.phase, BootstrapPhase::Failed);
        assert_eq!(state.error.as_deref(), Some("make exited with 2"));
        assert!(state.transition_to(BootstrapPhase::Preparation).is_ok());
    }

    #[test]
    fn test_for_tool() {
        assert_eq!(BootstrapPhase::for_tool(Tool::Gcc), BootstrapPhase::Gcc);
        assert_eq!(BootstrapPhase::for_tool(Tool::Nasm).to_string(), "nasm");
    }
}
