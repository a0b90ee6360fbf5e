// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run decision, cadence and skip-frame scheduling.
//!
//! Two independent gates:
//! - cadence (`AiqParam::run3a_cadence`) decides whether an iteration acts at all
//! - running interval (`EngineConfig::running_interval`) decides whether an acting
//!   iteration recomputes or replays the last computed result

use aiq_types::{RequestId, Sequence, TuningMode};
use tracing::warn;

/// Results committed as skip frames after a pipe switch
pub const PIPE_SWITCH_SKIP_FRAMES: u32 = 3;

/// Why an iteration runs or waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunDecision {
    ForcedPerFrame,
    ForcedFirstRun,
    Run,
    CadenceSkip { cadence: i64 },
    NoStatistics,
    NoNewStatistics { stats_sequence: Sequence },
    StaleExposure { applied_delay: u32 },
}

impl RunDecision {
    pub fn should_run(&self) -> bool {
        matches!(
            self,
            RunDecision::ForcedPerFrame | RunDecision::ForcedFirstRun | RunDecision::Run
        )
    }
}

/// Inputs of the run decision for one iteration
#[derive(Debug, Clone, Copy)]
pub struct RunInputs {
    pub request_id: RequestId,
    pub per_frame_control: bool,
    pub first_run: bool,
    /// Cadence from the current parameter snapshot, possibly misconfigured
    pub cadence: i32,
    pub stats_sequence: Option<Sequence>,
    /// Statistics consumed by the last computed iteration
    pub last_consumed_stats: Option<Sequence>,
    pub applied_delay: u32,
    pub max_applied_delay: u32,
}

/// Cadence clamped to at least 1
pub fn effective_cadence(cadence: i32) -> i64 {
    if cadence < 1 {
        warn!("[AIQ-ENGINE] Invalid 3A cadence {}, using 1", cadence);
        1
    } else {
        i64::from(cadence)
    }
}

pub fn decide_run(inputs: &RunInputs) -> RunDecision {
    if inputs.per_frame_control {
        return RunDecision::ForcedPerFrame;
    }
    if inputs.first_run {
        return RunDecision::ForcedFirstRun;
    }

    let cadence = effective_cadence(inputs.cadence);
    if inputs.request_id.rem_euclid(cadence) != 0 {
        return RunDecision::CadenceSkip { cadence };
    }

    let Some(stats_sequence) = inputs.stats_sequence else {
        return RunDecision::NoStatistics;
    };
    if inputs.last_consumed_stats == Some(stats_sequence) {
        return RunDecision::NoNewStatistics { stats_sequence };
    }
    if inputs.applied_delay > inputs.max_applied_delay {
        return RunDecision::StaleExposure {
            applied_delay: inputs.applied_delay,
        };
    }

    RunDecision::Run
}

/// Recompute (true) or replay the last computed result (false)
pub fn should_recompute(request_id: RequestId, running_interval: i64, first_run: bool) -> bool {
    first_run || request_id.rem_euclid(running_interval.max(1)) == 0
}

/// Skip frames to commit ahead of a new result
///
/// A pipe switch against the newest committed result settles over
/// [`PIPE_SWITCH_SKIP_FRAMES`] frames. The very first result under per-frame control is
/// applied before streaming starts and covers `initial_skip_frames` frames.
pub fn skip_frame_count(
    first_run: bool,
    per_frame_control: bool,
    initial_skip_frames: u32,
    committed_mode: Option<TuningMode>,
    new_mode: TuningMode,
) -> u32 {
    if !first_run {
        match committed_mode {
            Some(mode) if mode != new_mode => PIPE_SWITCH_SKIP_FRAMES,
            _ => 0,
        }
    } else if per_frame_control {
        initial_skip_frames
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mature(request_id: RequestId) -> RunInputs {
        RunInputs {
            request_id,
            per_frame_control: false,
            first_run: false,
            cadence: 1,
            stats_sequence: Some(10),
            last_consumed_stats: Some(9),
            applied_delay: 0,
            max_applied_delay: 5,
        }
    }

    #[test]
    fn test_forced_runs() {
        let mut inputs = mature(1);
        inputs.cadence = 3;
        inputs.stats_sequence = None;

        inputs.first_run = true;
        assert_eq!(decide_run(&inputs), RunDecision::ForcedFirstRun);

        inputs.per_frame_control = true;
        assert_eq!(decide_run(&inputs), RunDecision::ForcedPerFrame);
    }

    #[test]
    fn test_cadence_gate() {
        let mut inputs = mature(1);
        inputs.cadence = 3;
        assert_eq!(decide_run(&inputs), RunDecision::CadenceSkip { cadence: 3 });
        inputs.request_id = 2;
        assert!(!decide_run(&inputs).should_run());
        inputs.request_id = 3;
        assert_eq!(decide_run(&inputs), RunDecision::Run);
    }

    #[test]
    fn test_invalid_cadence_is_clamped() {
        let mut inputs = mature(7);
        inputs.cadence = 0;
        assert_eq!(decide_run(&inputs), RunDecision::Run);
        inputs.cadence = -4;
        assert_eq!(decide_run(&inputs), RunDecision::Run);
    }

    #[test]
    fn test_statistics_gates() {
        let mut inputs = mature(4);
        inputs.stats_sequence = None;
        assert_eq!(decide_run(&inputs), RunDecision::NoStatistics);

        inputs.stats_sequence = Some(9);
        assert_eq!(
            decide_run(&inputs),
            RunDecision::NoNewStatistics { stats_sequence: 9 }
        );

        inputs.stats_sequence = Some(10);
        inputs.applied_delay = 6;
        assert_eq!(
            decide_run(&inputs),
            RunDecision::StaleExposure { applied_delay: 6 }
        );

        inputs.applied_delay = 5;
        assert_eq!(decide_run(&inputs), RunDecision::Run);
    }

    #[test]
    fn test_open_loop_history_never_matches() {
        let mut inputs = mature(2);
        inputs.last_consumed_stats = None;
        assert!(decide_run(&inputs).should_run());
    }

    #[test]
    fn test_negative_request_ids() {
        let mut inputs = mature(-3);
        inputs.cadence = 3;
        assert!(decide_run(&inputs).should_run());
        assert!(should_recompute(-4, 2, false));
        assert!(!should_recompute(-3, 2, false));
    }

    #[test]
    fn test_recompute_interval() {
        assert!(should_recompute(5, 1, false));
        assert!(should_recompute(4, 2, false));
        assert!(!should_recompute(5, 2, false));
        assert!(should_recompute(5, 2, true));
        assert!(should_recompute(5, 0, false));
    }

    #[test]
    fn test_skip_frame_count() {
        use TuningMode::*;
        assert_eq!(skip_frame_count(false, false, 2, Some(Video), Video), 0);
        assert_eq!(skip_frame_count(false, false, 2, Some(VideoHdr), VideoUll), 3);
        assert_eq!(skip_frame_count(false, true, 2, Some(VideoHdr), VideoUll), 3);
        assert_eq!(skip_frame_count(false, false, 2, None, VideoUll), 0);
        assert_eq!(skip_frame_count(true, true, 2, None, Video), 2);
        assert_eq!(skip_frame_count(true, false, 2, None, Video), 0);
    }
}
