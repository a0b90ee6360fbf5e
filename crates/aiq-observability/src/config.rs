// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Logging configuration types

use aiq_config::LoggingSection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Writer the fmt layer emits to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    Stderr,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Text,
            output: LogOutput::Stderr,
        }
    }
}

/// Unknown format or output names fall back to text on stderr.
impl From<&LoggingSection> for LoggingConfig {
    fn from(section: &LoggingSection) -> Self {
        let format = match section.format.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };
        let output = match section.output.to_lowercase().as_str() {
            "stdout" => LogOutput::Stdout,
            _ => LogOutput::Stderr,
        };
        LoggingConfig {
            level: section.level.to_lowercase(),
            format,
            output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_section() {
        let section = LoggingSection {
            level: "DEBUG".to_string(),
            format: "json".to_string(),
            output: "stdout".to_string(),
        };
        let config = LoggingConfig::from(&section);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Stdout);
    }

    #[test]
    fn test_default_section_maps_to_default() {
        assert_eq!(LoggingConfig::from(&LoggingSection::default()), LoggingConfig::default());
    }
}
