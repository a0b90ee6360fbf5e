// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Control results: everything computed for (or carried onto) one frame.

use crate::modes::{BracketMode, SceneMode, TuningMode};
use crate::params::AiqParam;
use crate::sensor::{SensorExposure, SensorExposureParams};
use crate::{Sequence, UNSCHEDULED_SEQUENCE};
use serde::{Deserialize, Serialize};

/// Exposure parameters of one exposure segment, in algorithm units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposureParams {
    pub exposure_time_us: u32,
    pub analog_gain: f32,
    pub digital_gain: f32,
    pub total_target_exposure: u32,
}

/// One exposure segment: algorithm view plus the sensor-native encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposureSegment {
    pub exposure: ExposureParams,
    pub sensor: SensorExposureParams,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposureResults {
    /// One entry per exposure of a (possibly multi-exposure) frame.
    pub segments: Vec<ExposureSegment>,
    pub multiframe: BracketMode,
    pub converged: bool,
}

impl ExposureResults {
    /// Flat exposure list handed to the sensor, one entry per segment.
    pub fn sensor_exposures(&self) -> Vec<SensorExposure> {
        self.segments
            .iter()
            .map(|segment| SensorExposure {
                sensor_param: segment.sensor,
                real_digital_gain: segment.exposure.digital_gain,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AwbResults {
    pub accurate_r_per_g: f32,
    pub accurate_b_per_g: f32,
    pub final_r_per_g: f32,
    pub final_b_per_g: f32,
    pub cct_estimate: u32,
    pub distance_from_convergence: f32,
}

impl Default for AwbResults {
    fn default() -> Self {
        Self {
            accurate_r_per_g: 1.0,
            accurate_b_per_g: 1.0,
            final_r_per_g: 1.0,
            final_b_per_g: 1.0,
            cct_estimate: 5000,
            distance_from_convergence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AfResults {
    pub next_lens_position: i32,
    pub lens_driver_action: bool,
    pub final_lens_position_reached: bool,
}

/// Global brightness/contrast and tone curve output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GbceResults {
    /// Set once any manual tone-map request overrode the solver's curves.
    pub have_manual_settings: bool,
    pub r_gamma_lut: Vec<f32>,
    pub g_gamma_lut: Vec<f32>,
    pub b_gamma_lut: Vec<f32>,
    pub tone_map_lut: Vec<f32>,
}

impl GbceResults {
    /// Allocate all three gamma tables with `lut_size` entries and a tone table of the same size.
    pub fn with_lut_size(lut_size: usize) -> Self {
        Self {
            have_manual_settings: false,
            r_gamma_lut: vec![0.0; lut_size],
            g_gamma_lut: vec![0.0; lut_size],
            b_gamma_lut: vec![0.0; lut_size],
            tone_map_lut: vec![1.0; lut_size],
        }
    }
}

/// Result sets produced by a full algorithm run (everything besides exposure).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmOutput {
    pub awb: AwbResults,
    pub af: AfResults,
    pub gbce: GbceResults,
}

/// Everything computed for one frame.
///
/// Once committed into the result store a `ControlResult` is immutable and identified
/// by its `sequence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlResult {
    pub sequence: Sequence,
    pub tuning_mode: TuningMode,
    pub scene_mode: SceneMode,
    pub exposure: ExposureResults,
    pub awb: AwbResults,
    pub af: AfResults,
    pub gbce: GbceResults,
    /// Downstream consumers must not display the frame this result lands on.
    pub skip: bool,
    /// RGBS grid statistics were requested from the statistics decoder.
    pub rgbs_stats_requested: bool,
    /// Parameter snapshot that produced this result.
    pub param: AiqParam,
}

impl Default for ControlResult {
    fn default() -> Self {
        Self {
            sequence: UNSCHEDULED_SEQUENCE,
            tuning_mode: TuningMode::default(),
            scene_mode: SceneMode::default(),
            exposure: ExposureResults::default(),
            awb: AwbResults::default(),
            af: AfResults::default(),
            gbce: GbceResults::default(),
            skip: false,
            rgbs_stats_requested: false,
            param: AiqParam::default(),
        }
    }
}

impl ControlResult {
    pub fn is_scheduled(&self) -> bool {
        self.sequence >= 0
    }

    /// Copy every computed field of `other` into `self`, keeping `self`'s allocation.
    ///
    /// Sequence and skip flag are carried over too; callers re-stamp them.
    pub fn copy_from(&mut self, other: &ControlResult) {
        self.clone_from(other);
    }

    /// Return the slot to its freshly-acquired state, keeping buffer capacity.
    pub fn reset(&mut self) {
        self.sequence = UNSCHEDULED_SEQUENCE;
        self.tuning_mode = TuningMode::default();
        self.scene_mode = SceneMode::default();
        self.exposure.segments.clear();
        self.exposure.multiframe = BracketMode::None;
        self.exposure.converged = false;
        self.awb = AwbResults::default();
        self.af = AfResults::default();
        self.gbce.have_manual_settings = false;
        self.gbce.r_gamma_lut.clear();
        self.gbce.g_gamma_lut.clear();
        self.gbce.b_gamma_lut.clear();
        self.gbce.tone_map_lut.clear();
        self.skip = false;
        self.rgbs_stats_requested = false;
        self.param = AiqParam::default();
    }
}
