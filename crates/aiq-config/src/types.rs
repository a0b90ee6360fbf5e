// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to one section of `aiq_configuration.toml`.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AiqConfig {
    pub platform: PlatformConfig,
    pub result_store: ResultStoreConfig,
    pub sensor: SensorConfig,
    pub logging: LoggingSection,
}

/// Per-camera platform data consumed by the control loop engine
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Run the algorithm every frame regardless of cadence
    pub per_frame_control: bool,
    /// Skip frames committed on the first iteration under per-frame control
    pub initial_skip_frames: u32,
    /// Recompute-vs-replay interval, in requests
    pub running_interval: i64,
    /// Sensor exposure pipeline lag, in frames
    pub exposure_lag: i64,
    /// Applied-delay ceiling above which statistics are considered stale
    pub max_exposure_applied_delay: u32,
    pub sensor_awb_enabled: bool,
    pub sensor_ae_enabled: bool,
    /// Sensor-side HDR (WDR mode switching)
    pub hdr_feature: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            per_frame_control: false,
            initial_skip_frames: 0,
            running_interval: 1,
            exposure_lag: 2,
            max_exposure_applied_delay: 5,
            sensor_awb_enabled: false,
            sensor_ae_enabled: false,
            hdr_feature: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResultStoreConfig {
    pub result_capacity: usize,
    pub statistics_capacity: usize,
}

impl Default for ResultStoreConfig {
    fn default() -> Self {
        Self {
            result_capacity: 40,
            statistics_capacity: 3,
        }
    }
}

/// Simulated sensor settings (exposure lag comes from `[platform]`)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SensorConfig {
    pub sof_history: usize,
    pub frame_rate: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            sof_history: 32,
            frame_rate: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    /// "text" or "json"
    pub format: String,
    /// "stdout" or "stderr"
    pub output: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            output: "stderr".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_sections_use_defaults() {
        let config: AiqConfig = toml::from_str(
            r#"
            [platform]
            per_frame_control = true
            initial_skip_frames = 2

            [result_store]
            result_capacity = 16
            "#,
        )
        .unwrap();

        assert!(config.platform.per_frame_control);
        assert_eq!(config.platform.initial_skip_frames, 2);
        assert_eq!(config.platform.max_exposure_applied_delay, 5);
        assert_eq!(config.result_store.result_capacity, 16);
        assert_eq!(config.result_store.statistics_capacity, 3);
        assert_eq!(config.sensor.frame_rate, 30.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_json_roundtrip_preserves_values() {
        let mut config = AiqConfig::default();
        config.platform.running_interval = 4;
        config.logging.format = "json".to_string();
        let json = serde_json::to_string(&config).unwrap();
        let back: AiqConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
