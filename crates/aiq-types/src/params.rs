// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Resolved parameter snapshot consumed by one control iteration.

use crate::modes::{
    AfMode, MakernoteMode, SceneMode, TonemapMode, TonemapPresetCurve, TuningMode,
};
use serde::{Deserialize, Serialize};

/// Manual contrast curves, one list of `(input, output)` control points per channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TonemapCurves {
    pub red: Vec<(f32, f32)>,
    pub green: Vec<(f32, f32)>,
    pub blue: Vec<(f32, f32)>,
}

impl TonemapCurves {
    pub fn is_empty(&self) -> bool {
        self.red.is_empty() && self.green.is_empty() && self.blue.is_empty()
    }
}

/// Per-iteration parameters produced by the settings source.
///
/// A copy of the snapshot is stored on every committed result so a later frame can
/// read back exactly what produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiqParam {
    /// Recompute cadence: statistics are only consumed on requests divisible by it.
    pub run3a_cadence: i32,
    pub tuning_mode: TuningMode,
    pub scene_mode: SceneMode,
    pub tonemap_mode: TonemapMode,
    pub tonemap_gamma: f32,
    pub tonemap_preset_curve: TonemapPresetCurve,
    pub tonemap_curves: TonemapCurves,
    pub makernote_mode: MakernoteMode,
    pub fps: f32,
    /// Request RGBS grid statistics alongside the regular statistics.
    pub callback_rgbs: bool,
    pub af_mode: AfMode,
    pub focus_distance: f32,
    /// Lens state filled in by the lens actuator before the algorithm runs.
    pub lens_position: i32,
    pub lens_movement_start_timestamp: u64,
}

impl Default for AiqParam {
    fn default() -> Self {
        Self {
            run3a_cadence: 1,
            tuning_mode: TuningMode::Video,
            scene_mode: SceneMode::Auto,
            tonemap_mode: TonemapMode::Fast,
            tonemap_gamma: 1.0,
            tonemap_preset_curve: TonemapPresetCurve::Srgb,
            tonemap_curves: TonemapCurves::default(),
            makernote_mode: MakernoteMode::Off,
            fps: 30.0,
            callback_rgbs: false,
            af_mode: AfMode::Off,
            focus_distance: 0.0,
            lens_position: 0,
            lens_movement_start_timestamp: 0,
        }
    }
}
