// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::modes::TuningMode;
use crate::{RequestId, Sequence};
use serde::{Deserialize, Serialize};

/// One completed hardware measurement of a captured frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub sequence: Sequence,
    /// Capture timestamp in microseconds.
    pub timestamp: u64,
    /// Pipe profile the frame was captured under.
    pub tuning_mode: TuningMode,
    /// Opaque hardware statistics buffer, decoded by the algorithm core.
    pub payload: Vec<u8>,
    pub has_rgbs_grid: bool,
}

impl Statistics {
    pub fn new(sequence: Sequence, timestamp: u64, tuning_mode: TuningMode) -> Self {
        Self {
            sequence,
            timestamp,
            tuning_mode,
            payload: Vec::new(),
            has_rgbs_grid: false,
        }
    }
}

/// Statistics as prepared for the algorithm core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsParams {
    /// Request the statistics belong to, when the correlator knows it.
    pub frame_id: Option<RequestId>,
    pub frame_timestamp: u64,
    pub sequence: Sequence,
    /// Sensor-side AE consumes the RGBS grid instead of the full statistics.
    pub using_rgbs_for_aec: bool,
}
