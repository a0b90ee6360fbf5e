// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

use aiq_types::{AfResults, AiqParam, Sequence, SofEvent};

use crate::error::HalResult;

/// Lens actuation manager
pub trait LensActuator: Send {
    fn start(&mut self) -> HalResult<()>;

    fn stop(&mut self);

    /// Fill the lens-derived fields of the parameter snapshot
    fn update_lens_info(&self, param: &mut AiqParam);

    /// Schedule a focus result to take effect on `sequence`
    ///
    /// Fire-and-forget: the caller does not wait for the move to complete.
    fn apply_focus_result(
        &mut self,
        result: &AfResults,
        sequence: Sequence,
        param: &AiqParam,
    ) -> HalResult<()>;

    fn handle_sof_event(&mut self, event: &SofEvent);
}
