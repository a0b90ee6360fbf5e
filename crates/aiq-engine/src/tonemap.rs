// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Default manual tone-curve operations.

use aiq_types::{AwbResults, GbceResults, TonemapCurves};

use crate::collaborators::ToneCurveOps;

/// Gamma table length used when the solver left the tables unallocated
pub const DEFAULT_GAMMA_LUT_SIZE: usize = 1024;

/// Bound of the white-balance compensation gain, and of its reciprocal
const MAX_CURVE_AWB_GAIN: f32 = 2.0;

/// Curves in [0, 1] sampled uniformly over the gamma table length.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardToneCurves;

fn fill_lut(lut: &mut Vec<f32>, curve: impl Fn(f32) -> f32) {
    if lut.is_empty() {
        lut.resize(DEFAULT_GAMMA_LUT_SIZE, 0.0);
    }
    let last = (lut.len() - 1).max(1) as f32;
    for (i, value) in lut.iter_mut().enumerate() {
        *value = curve(i as f32 / last).clamp(0.0, 1.0);
    }
}

fn fill_all(gbce: &mut GbceResults, curve: impl Fn(f32) -> f32 + Copy) {
    fill_lut(&mut gbce.r_gamma_lut, curve);
    fill_lut(&mut gbce.g_gamma_lut, curve);
    fill_lut(&mut gbce.b_gamma_lut, curve);
}

/// Piecewise-linear evaluation of `(input, output)` control points; flat outside them.
fn interpolate(points: &[(f32, f32)], x: f32) -> f32 {
    let Some(&(first_in, first_out)) = points.first() else {
        return x;
    };
    if x <= first_in {
        return first_out;
    }
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x <= x1 {
            if x1 <= x0 {
                return y1;
            }
            return y0 + (y1 - y0) * (x - x0) / (x1 - x0);
        }
    }
    points.last().map(|&(_, y)| y).unwrap_or(x)
}

fn curve_mean(points: &[(f32, f32)]) -> Option<f32> {
    if points.is_empty() {
        return None;
    }
    Some(points.iter().map(|&(_, y)| y).sum::<f32>() / points.len() as f32)
}

fn srgb(x: f32) -> f32 {
    if x <= 0.003_130_8 {
        12.92 * x
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    }
}

fn rec709(x: f32) -> f32 {
    if x < 0.018 {
        4.5 * x
    } else {
        1.099 * x.powf(0.45) - 0.099
    }
}

impl ToneCurveOps for StandardToneCurves {
    fn apply_gamma(&self, gamma: f32, gbce: &mut GbceResults) {
        let gamma = if gamma > 0.0 { gamma } else { 1.0 };
        fill_all(gbce, |x| x.powf(1.0 / gamma));
    }

    fn apply_srgb(&self, gbce: &mut GbceResults) {
        fill_all(gbce, srgb);
    }

    fn apply_rec709(&self, gbce: &mut GbceResults) {
        fill_all(gbce, rec709);
    }

    fn apply_curve(&self, curves: &TonemapCurves, gbce: &mut GbceResults) {
        fill_lut(&mut gbce.r_gamma_lut, |x| interpolate(&curves.red, x));
        fill_lut(&mut gbce.g_gamma_lut, |x| interpolate(&curves.green, x));
        fill_lut(&mut gbce.b_gamma_lut, |x| interpolate(&curves.blue, x));
    }

    fn apply_awb_gain_for_curve(&self, curves: &TonemapCurves, awb: &mut AwbResults) {
        let (Some(red), Some(green), Some(blue)) = (
            curve_mean(&curves.red),
            curve_mean(&curves.green),
            curve_mean(&curves.blue),
        ) else {
            return;
        };
        if green <= f32::EPSILON {
            return;
        }

        let min_gain = 1.0 / MAX_CURVE_AWB_GAIN;
        let r_gain = (red / green).clamp(min_gain, MAX_CURVE_AWB_GAIN);
        let b_gain = (blue / green).clamp(min_gain, MAX_CURVE_AWB_GAIN);
        awb.final_r_per_g = awb.accurate_r_per_g * r_gain;
        awb.final_b_per_g = awb.accurate_b_per_g * b_gain;
    }
}
