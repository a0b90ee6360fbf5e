// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{AiqConfig, ConfigError, ConfigResult};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE_NAME: &str = "aiq_configuration.toml";
pub const CONFIG_PATH_ENV: &str = "AIQ_CONFIG_PATH";

/// Environment variable -> dotted configuration key
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("AIQ_PER_FRAME_CONTROL", "platform.per_frame_control"),
    ("AIQ_INITIAL_SKIP_FRAMES", "platform.initial_skip_frames"),
    ("AIQ_RUNNING_INTERVAL", "platform.running_interval"),
    ("AIQ_EXPOSURE_LAG", "platform.exposure_lag"),
    ("AIQ_MAX_EXPOSURE_APPLIED_DELAY", "platform.max_exposure_applied_delay"),
    ("AIQ_SENSOR_AWB", "platform.sensor_awb_enabled"),
    ("AIQ_SENSOR_AE", "platform.sensor_ae_enabled"),
    ("AIQ_HDR_FEATURE", "platform.hdr_feature"),
    ("AIQ_RESULT_CAPACITY", "result_store.result_capacity"),
    ("AIQ_STATISTICS_CAPACITY", "result_store.statistics_capacity"),
    ("AIQ_SOF_HISTORY", "sensor.sof_history"),
    ("AIQ_FRAME_RATE", "sensor.frame_rate"),
    ("AIQ_LOG_LEVEL", "logging.level"),
    ("AIQ_LOG_FORMAT", "logging.format"),
    ("AIQ_LOG_OUTPUT", "logging.output"),
];

/// Find the AIQ configuration file
///
/// Search order:
/// 1. `AIQ_CONFIG_PATH` environment variable
/// 2. Current working directory: `./aiq_configuration.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "AIQ configuration file '{}' not found in any of these locations:\n{}\n\nSet {} environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides, keyed by dotted name (`platform.exposure_lag`)
///
/// # Errors
///
/// Returns error if config file is not found, contains invalid TOML, or a CLI override is invalid
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<AiqConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: AiqConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Unparseable values are ignored. Supported variables:
/// `AIQ_PER_FRAME_CONTROL`, `AIQ_INITIAL_SKIP_FRAMES`, `AIQ_RUNNING_INTERVAL`,
/// `AIQ_EXPOSURE_LAG`, `AIQ_MAX_EXPOSURE_APPLIED_DELAY`, `AIQ_SENSOR_AWB`, `AIQ_SENSOR_AE`,
/// `AIQ_HDR_FEATURE`, `AIQ_RESULT_CAPACITY`, `AIQ_STATISTICS_CAPACITY`, `AIQ_SOF_HISTORY`,
/// `AIQ_FRAME_RATE`, `AIQ_LOG_LEVEL`, `AIQ_LOG_FORMAT`, `AIQ_LOG_OUTPUT`.
pub fn apply_environment_overrides(config: &mut AiqConfig) {
    for (var, key) in ENV_OVERRIDES {
        if let Ok(value) = env::var(var) {
            let _ = set_value(config, key, &value);
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for unknown keys or unparseable values
pub fn apply_cli_overrides(
    config: &mut AiqConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    for (key, value) in cli_args {
        set_value(config, key, value)?;
    }
    Ok(())
}

fn set_value(config: &mut AiqConfig, key: &str, value: &str) -> ConfigResult<()> {
    match key {
        "platform.per_frame_control" => config.platform.per_frame_control = parse_bool(key, value)?,
        "platform.initial_skip_frames" => config.platform.initial_skip_frames = parse(key, value)?,
        "platform.running_interval" => config.platform.running_interval = parse(key, value)?,
        "platform.exposure_lag" => config.platform.exposure_lag = parse(key, value)?,
        "platform.max_exposure_applied_delay" => {
            config.platform.max_exposure_applied_delay = parse(key, value)?
        }
        "platform.sensor_awb_enabled" => config.platform.sensor_awb_enabled = parse_bool(key, value)?,
        "platform.sensor_ae_enabled" => config.platform.sensor_ae_enabled = parse_bool(key, value)?,
        "platform.hdr_feature" => config.platform.hdr_feature = parse_bool(key, value)?,
        "result_store.result_capacity" => config.result_store.result_capacity = parse(key, value)?,
        "result_store.statistics_capacity" => {
            config.result_store.statistics_capacity = parse(key, value)?
        }
        "sensor.sof_history" => config.sensor.sof_history = parse(key, value)?,
        "sensor.frame_rate" => config.sensor.frame_rate = parse(key, value)?,
        "logging.level" => config.logging.level = value.to_string(),
        "logging.format" => config.logging.format = value.to_string(),
        "logging.output" => config.logging.output = value.to_string(),
        _ => {
            return Err(ConfigError::InvalidValue(format!(
                "unknown configuration key '{}'",
                key
            )))
        }
    }
    Ok(())
}

fn parse<T: FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse::<T>().map_err(|_| {
        ConfigError::InvalidValue(format!("{} = '{}' cannot be parsed", key, value))
    })
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(format!(
            "{} = '{}' is not a boolean",
            key, value
        ))),
    }
}
