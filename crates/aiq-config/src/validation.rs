// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks that values are within range and consistent with each other. All problems are
//! collected and reported together.

use crate::{AiqConfig, ConfigError, ConfigResult};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["text", "json"];
const LOG_OUTPUTS: &[&str] = &["stdout", "stderr"];

/// Frames a mode switch commits beyond the skip window itself
const SKIP_WINDOW_HEADROOM: usize = 4;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    OutOfRange { field: String, reason: String },
    Inconsistent { fields: String, reason: String },
    UnknownOption { field: String, value: String, allowed: &'static [&'static str] },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::Inconsistent { fields, reason } => {
                write!(f, "Inconsistent configuration ({}): {}", fields, reason)
            }
            Self::UnknownOption {
                field,
                value,
                allowed,
            } => {
                write!(
                    f,
                    "Unknown value '{}' for {} (expected one of: {})",
                    value,
                    field,
                    allowed.join(", ")
                )
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &AiqConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_platform(config, &mut errors);
    validate_result_store(config, &mut errors);
    validate_sensor(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_platform(config: &AiqConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.platform.running_interval < 1 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "platform.running_interval".to_string(),
            reason: format!("must be >= 1, got {}", config.platform.running_interval),
        });
    }
    if config.platform.exposure_lag < 0 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "platform.exposure_lag".to_string(),
            reason: format!("must be >= 0, got {}", config.platform.exposure_lag),
        });
    }
}

fn validate_result_store(config: &AiqConfig, errors: &mut Vec<ConfigValidationError>) {
    let store = &config.result_store;
    if store.result_capacity < 2 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "result_store.result_capacity".to_string(),
            reason: format!("must be >= 2, got {}", store.result_capacity),
        });
    }
    if store.statistics_capacity < 2 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "result_store.statistics_capacity".to_string(),
            reason: format!(
                "must be >= 2 so one record can stay locked, got {}",
                store.statistics_capacity
            ),
        });
    }

    let skip_window = config.platform.initial_skip_frames as usize + SKIP_WINDOW_HEADROOM;
    if store.result_capacity <= skip_window {
        errors.push(ConfigValidationError::Inconsistent {
            fields: "result_store.result_capacity, platform.initial_skip_frames".to_string(),
            reason: format!(
                "result ring of {} cannot hold a skip window of {} results",
                store.result_capacity, skip_window
            ),
        });
    }
}

fn validate_sensor(config: &AiqConfig, errors: &mut Vec<ConfigValidationError>) {
    if !(config.sensor.frame_rate.is_finite() && config.sensor.frame_rate > 0.0) {
        errors.push(ConfigValidationError::OutOfRange {
            field: "sensor.frame_rate".to_string(),
            reason: format!("must be > 0, got {}", config.sensor.frame_rate),
        });
    }
    if config.sensor.sof_history == 0 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "sensor.sof_history".to_string(),
            reason: "must be >= 1".to_string(),
        });
    }
}

fn validate_logging(config: &AiqConfig, errors: &mut Vec<ConfigValidationError>) {
    let checks = [
        ("logging.level", &config.logging.level, LOG_LEVELS),
        ("logging.format", &config.logging.format, LOG_FORMATS),
        ("logging.output", &config.logging.output, LOG_OUTPUTS),
    ];
    for (field, value, allowed) in checks {
        if !allowed.contains(&value.to_lowercase().as_str()) {
            errors.push(ConfigValidationError::UnknownOption {
                field: field.to_string(),
                value: value.clone(),
                allowed,
            });
        }
    }
}
