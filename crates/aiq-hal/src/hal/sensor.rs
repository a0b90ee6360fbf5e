// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

use aiq_types::{FrameParams, SensorDescriptor, SensorExposure, Sequence, SofEvent, TuningMode};

use crate::error::HalResult;

/// Sensor actuation manager
///
/// Translates computed exposures into hardware writes timed against the frame sequence.
pub trait SensorActuator: Send {
    /// Forget all scheduling state (called on init and on every stream start)
    fn reset(&mut self);

    /// Program the sensor frame rate
    fn set_frame_rate(&mut self, fps: f32) -> HalResult<()>;

    /// Current output frame geometry and sensor timing descriptor
    fn sensor_info(&mut self) -> HalResult<(FrameParams, SensorDescriptor)>;

    /// Schedule a flat list of exposures (one per exposure segment)
    ///
    /// # Arguments
    /// * `exposures` - Exposures to write
    /// * `applying_sequence` - Frame the caller wants them on; `None` lets the sensor predict
    ///
    /// # Returns
    /// The sequence the exposures will actually land on
    fn schedule_exposure(
        &mut self,
        exposures: &[SensorExposure],
        applying_sequence: Option<Sequence>,
    ) -> Sequence;

    /// Start-of-frame timestamp of `sequence`, `None` when unknown
    fn sof_timestamp(&self, sequence: Sequence) -> Option<u64>;

    /// Frames between the newest scheduled exposure and the frame it could land on at the earliest
    fn exposure_applied_delay(&self) -> u32;

    /// Select the sensor-side WDR mode for `sequence`
    fn set_wdr_mode(&mut self, mode: TuningMode, sequence: Sequence);

    /// Push white-balance ratios to sensor-side AWB
    fn set_awb(&mut self, r_per_g: f32, b_per_g: f32);

    fn handle_sof_event(&mut self, event: &SofEvent);
}
