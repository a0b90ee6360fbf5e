// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

use aiq_types::Sequence;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{ring} capacity must be >= {minimum}, got {requested}")]
    InvalidCapacity {
        ring: &'static str,
        minimum: usize,
        requested: usize,
    },

    #[error("result has no sequence assigned (sequence={sequence})")]
    UnscheduledResult { sequence: Sequence },

    #[error("non-monotonic result sequence: last committed={last}, requested={requested}")]
    NonMonotonicSequence { last: Sequence, requested: Sequence },

    #[error("non-monotonic statistics sequence: last published={last}, requested={requested}")]
    NonMonotonicStatistics { last: Sequence, requested: Sequence },

    #[error("statistics record {sequence} is already locked")]
    StatisticsAlreadyLocked { sequence: Sequence },

    #[error("statistics ring is full and every record is locked")]
    StatisticsRingExhausted,
}

pub type StoreResult<T> = Result<T, StoreError>;
