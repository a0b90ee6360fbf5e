// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! # AIQ Result Store
//!
//! The only state shared across producer and consumer boundaries of the control loop:
//! a fixed-capacity ring of committed [`ControlResult`](aiq_types::ControlResult)s indexed by
//! frame sequence, and a small ring of [`Statistics`](aiq_types::Statistics) records
//! guarded by an explicit lock.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{ResultStore, StatisticsLock, MIN_RESULT_CAPACITY, MIN_STATISTICS_CAPACITY};
