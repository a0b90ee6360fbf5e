// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for AIQ binaries

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LogOutput, LoggingConfig};

/// Install the global subscriber
///
/// The filter is `config.level` for every target, raised to debug for each crate named in
/// `debug_flags`. Fails if the filter does not parse or a subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<()> {
    let filter = debug_flags.to_filter_string(&config.level);
    let env_filter = EnvFilter::try_new(&filter)
        .with_context(|| format!("Invalid log filter '{}'", filter))?;

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match (config.format, config.output) {
        (LogFormat::Text, LogOutput::Stdout) => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stdout)
            .boxed(),
        (LogFormat::Text, LogOutput::Stderr) => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        (LogFormat::Json, LogOutput::Stdout) => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stdout)
            .boxed(),
        (LogFormat::Json, LogOutput::Stderr) => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    Registry::default()
        .with(layer.with_filter(env_filter))
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!("[OBSERVABILITY] Logging initialized with filter '{}'", filter);
    Ok(())
}

/// Initialize logging with default settings
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<()> {
    init_logging(debug_flags, &LoggingConfig::default())
}
