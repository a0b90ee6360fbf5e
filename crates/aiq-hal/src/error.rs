// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HalError {
    #[error("{device} is not started")]
    NotStarted { device: &'static str },

    #[error("sensor descriptor unavailable: {0}")]
    SensorInfoUnavailable(String),

    #[error("invalid frame rate {0}")]
    InvalidFrameRate(f32),

    #[error("{device} failure: {reason}")]
    Device { device: &'static str, reason: String },
}

pub type HalResult<T> = Result<T, HalError>;
