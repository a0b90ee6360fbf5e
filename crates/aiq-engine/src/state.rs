// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-iteration state machine and its outcome.

use aiq_types::{ControlResult, RequestId, Sequence};

use crate::error::EngineError;

/// Progress of one control iteration.
///
/// `Idle -> Wait` or `Idle -> Run -> ResultSet -> Done`; `Error` is terminal for the
/// iteration only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AiqState {
    #[default]
    Idle,
    Wait,
    Run,
    ResultSet,
    Done,
    Error,
}

impl AiqState {
    pub fn is_success(&self) -> bool {
        matches!(self, AiqState::Done | AiqState::Wait)
    }
}

/// What one `run_iteration` call did.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationOutcome {
    pub request_id: RequestId,
    /// Final state
    pub state: AiqState,
    /// Every state entered after `Idle`, in order
    pub path: Vec<AiqState>,
    /// Sequence of the newest committed result, read even when the iteration failed
    pub effective_sequence: Option<Sequence>,
    /// Sequences committed by this iteration, oldest first
    pub committed: Vec<Sequence>,
    /// The algorithm core was invoked (not replayed, not skipped)
    pub algorithm_ran: bool,
    pub error: Option<EngineError>,
}

impl IterationOutcome {
    pub(crate) fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            state: AiqState::Idle,
            path: Vec::new(),
            effective_sequence: None,
            committed: Vec::new(),
            algorithm_ran: false,
            error: None,
        }
    }

    pub(crate) fn enter(&mut self, state: AiqState) {
        self.state = state;
        self.path.push(state);
    }

    pub(crate) fn fail(&mut self, error: EngineError) {
        self.error = Some(error);
        self.enter(AiqState::Error);
    }

    pub fn is_success(&self) -> bool {
        self.state.is_success()
    }
}

/// The last iteration that actually invoked the algorithm core.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningHistory {
    pub result: ControlResult,
    pub request_id: RequestId,
    /// Statistics consumed, `None` when the algorithm ran open-loop
    pub stats_sequence: Option<Sequence>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_states() {
        assert!(AiqState::Done.is_success());
        assert!(AiqState::Wait.is_success());
        assert!(!AiqState::Error.is_success());
        assert!(!AiqState::ResultSet.is_success());
        assert!(!AiqState::Idle.is_success());
    }

    #[test]
    fn test_outcome_tracks_path() {
        let mut outcome = IterationOutcome::new(7);
        outcome.enter(AiqState::Run);
        outcome.fail(EngineError::Algorithm("diverged".to_string()));
        assert_eq!(outcome.path, vec![AiqState::Run, AiqState::Error]);
        assert!(!outcome.is_success());
        assert!(outcome.error.is_some());
    }
}
