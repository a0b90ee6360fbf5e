// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

use aiq_hal::HalError;
use aiq_result_store::StoreError;
use aiq_types::TuningMode;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("settings unavailable: {0}")]
    Configuration(String),

    #[error("sensor info unavailable: {0}")]
    SensorInfo(String),

    #[error("algorithm failure: {0}")]
    Algorithm(String),

    /// Statistics captured under one multi-frame pipe cannot drive the other.
    #[error("statistics captured under {statistics} do not match current pipe {current}")]
    StatisticsMismatch {
        current: TuningMode,
        statistics: TuningMode,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Actuation(#[from] HalError),

    #[error("{operation} is not allowed in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: crate::unit::UnitState,
    },

    #[error("component {name} failed: {reason}")]
    Component { name: &'static str, reason: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
