// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use aiq_types::{AfResults, AiqParam, Sequence, SofEvent};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{HalError, HalResult};

use crate::hal::LensActuator;

/// Focus result as scheduled on the lens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusRecord {
    pub sequence: Sequence,
    pub result: AfResults,
    pub focus_distance: f32,
}

#[derive(Debug, Default)]
struct LensState {
    started: bool,
    position: i32,
    movement_start_timestamp: u64,
    last_sof: Option<SofEvent>,
    records: Vec<FocusRecord>,
}

/// Lens that jumps to the requested position at the newest start-of-frame.
#[derive(Debug, Clone, Default)]
pub struct SimulatedLens {
    state: Arc<Mutex<LensState>>,
}

impl SimulatedLens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().started
    }

    pub fn position(&self) -> i32 {
        self.state.lock().position
    }

    pub fn records(&self) -> Vec<FocusRecord> {
        self.state.lock().records.clone()
    }
}

impl LensActuator for SimulatedLens {
    fn start(&mut self) -> HalResult<()> {
        self.state.lock().started = true;
        debug!("[LENS] Started");
        Ok(())
    }

    fn stop(&mut self) {
        self.state.lock().started = false;
        debug!("[LENS] Stopped");
    }

    fn update_lens_info(&self, param: &mut AiqParam) {
        let state = self.state.lock();
        param.lens_position = state.position;
        param.lens_movement_start_timestamp = state.movement_start_timestamp;
    }

    fn apply_focus_result(
        &mut self,
        result: &AfResults,
        sequence: Sequence,
        param: &AiqParam,
    ) -> HalResult<()> {
        let mut state = self.state.lock();
        if !state.started {
            return Err(HalError::NotStarted { device: "lens" });
        }

        if result.lens_driver_action && result.next_lens_position != state.position {
            state.position = result.next_lens_position;
            state.movement_start_timestamp = state.last_sof.map(|sof| sof.timestamp).unwrap_or(0);
            trace!(
                "[LENS] Moving to {} for seq={}",
                result.next_lens_position,
                sequence
            );
        }
        state.records.push(FocusRecord {
            sequence,
            result: *result,
            focus_distance: param.focus_distance,
        });
        Ok(())
    }

    fn handle_sof_event(&mut self, event: &SofEvent) {
        self.state.lock().last_sof = Some(*event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_requires_start() {
        let mut lens = SimulatedLens::new();
        let result = AfResults::default();
        assert_eq!(
            lens.apply_focus_result(&result, 1, &AiqParam::default()),
            Err(HalError::NotStarted { device: "lens" })
        );
    }

    #[test]
    fn test_move_is_reported_in_lens_info() {
        let mut lens = SimulatedLens::new();
        lens.start().unwrap();
        lens.handle_sof_event(&SofEvent::new(4, 4_000));

        let result = AfResults {
            next_lens_position: 250,
            lens_driver_action: true,
            final_lens_position_reached: false,
        };
        lens.apply_focus_result(&result, 6, &AiqParam::default()).unwrap();

        let mut param = AiqParam::default();
        lens.update_lens_info(&mut param);
        assert_eq!(param.lens_position, 250);
        assert_eq!(param.lens_movement_start_timestamp, 4_000);
        assert_eq!(lens.records().len(), 1);
        assert_eq!(lens.records()[0].sequence, 6);
    }
}
