// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sensor-side records: native exposure encoding, frame geometry, descriptors.

use serde::{Deserialize, Serialize};

/// Exposure in sensor-native units (line counts and gain codes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorExposureParams {
    pub coarse_integration_time: u16,
    pub fine_integration_time: u16,
    pub analog_gain_code_global: u16,
    pub digital_gain_global: u16,
}

/// One exposure as handed to the sensor actuator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorExposure {
    pub sensor_param: SensorExposureParams,
    pub real_digital_gain: f32,
}

/// Output frame geometry reported by the sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameParams {
    pub horizontal_crop_offset: u16,
    pub vertical_crop_offset: u16,
    pub cropped_image_width: u16,
    pub cropped_image_height: u16,
    pub horizontal_scaling_numerator: u16,
    pub horizontal_scaling_denominator: u16,
    pub vertical_scaling_numerator: u16,
    pub vertical_scaling_denominator: u16,
}

/// Timing description of the sensor mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    pub pixel_clock_freq_mhz: f32,
    pub pixel_periods_per_line: u32,
    pub line_periods_per_field: u32,
    pub line_periods_vertical_blanking: u32,
    pub coarse_integration_time_min: u32,
    pub coarse_integration_time_max_margin: u32,
    pub fine_integration_time_min: u32,
    pub fine_integration_time_max_margin: u32,
}

impl SensorDescriptor {
    /// Duration of one line in microseconds, or `None` for a descriptor without a clock.
    pub fn line_time_us(&self) -> Option<f32> {
        if self.pixel_clock_freq_mhz <= 0.0 {
            return None;
        }
        Some(self.pixel_periods_per_line as f32 / self.pixel_clock_freq_mhz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_time() {
        let descriptor = SensorDescriptor {
            pixel_clock_freq_mhz: 100.0,
            pixel_periods_per_line: 2000,
            ..Default::default()
        };
        assert_eq!(descriptor.line_time_us(), Some(20.0));
        assert_eq!(SensorDescriptor::default().line_time_us(), None);
    }
}
