// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::Sequence;
use serde::{Deserialize, Serialize};

/// Start-of-frame notification from the capture pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SofEvent {
    pub sequence: Sequence,
    /// Timestamp in microseconds.
    pub timestamp: u64,
}

impl SofEvent {
    pub fn new(sequence: Sequence, timestamp: u64) -> Self {
        Self { sequence, timestamp }
    }
}
