// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Result post-processing: scene classification and manual tone maps.

use aiq_types::{AiqParam, BracketMode, ControlResult, SceneMode, TonemapMode, TonemapPresetCurve};

use crate::collaborators::ToneCurveOps;

/// Scene mode reported on a result
///
/// An auto request reports what the exposure solver's multi-frame classification asks for;
/// any other request is passed through.
pub fn derive_scene_mode(requested: SceneMode, multiframe: BracketMode) -> SceneMode {
    if requested != SceneMode::Auto {
        return requested;
    }
    match multiframe {
        BracketMode::Hdr => SceneMode::Hdr,
        BracketMode::Ull => SceneMode::Ull,
        BracketMode::None => SceneMode::Auto,
    }
}

/// Apply the manual tone map requested by `param`, if any
pub fn apply_manual_tonemaps(ops: &dyn ToneCurveOps, param: &AiqParam, result: &mut ControlResult) {
    if param.tonemap_mode.is_automatic() {
        result.gbce.have_manual_settings = false;
        return;
    }

    result.gbce.have_manual_settings = true;
    match param.tonemap_mode {
        TonemapMode::GammaValue => ops.apply_gamma(param.tonemap_gamma, &mut result.gbce),
        TonemapMode::PresetCurve => match param.tonemap_preset_curve {
            TonemapPresetCurve::Srgb => ops.apply_srgb(&mut result.gbce),
            TonemapPresetCurve::Rec709 => ops.apply_rec709(&mut result.gbce),
        },
        TonemapMode::ContrastCurve => {
            ops.apply_curve(&param.tonemap_curves, &mut result.gbce);
            ops.apply_awb_gain_for_curve(&param.tonemap_curves, &mut result.awb);
        }
        TonemapMode::Fast | TonemapMode::HighQuality => {}
    }

    // Manual curves replace local tone mapping entirely.
    result.gbce.tone_map_lut.fill(1.0);
}
