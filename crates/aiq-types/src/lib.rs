// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! # AIQ Types
//!
//! Core data model shared by every crate of the 3A control loop.
//!
//! ## Contents
//! - **Modes**: tuning modes (pipe classes), scene modes, tone-map modes
//! - **Results**: the per-sequence [`ControlResult`] and its exposure, white-balance,
//!   focus and tone-curve result sets
//! - **Statistics**: one completed hardware measurement ([`Statistics`])
//! - **Parameters**: the resolved per-iteration [`AiqParam`] snapshot
//! - **Sensor**: exposure scheduling records, frame geometry and sensor descriptors
//!
//! Sequence numbers and request ids are plain `i64` values; a negative sequence marks a
//! result that has not been scheduled onto a frame yet.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod events;
pub mod modes;
pub mod params;
pub mod results;
pub mod sensor;
pub mod statistics;

pub use events::SofEvent;
pub use modes::*;
pub use params::{AiqParam, TonemapCurves};
pub use results::*;
pub use sensor::{FrameParams, SensorDescriptor, SensorExposure, SensorExposureParams};
pub use statistics::{Statistics, StatisticsParams};

/// Frame sequence number assigned by the capture pipeline.
pub type Sequence = i64;

/// Caller-assigned id of one frame request.
pub type RequestId = i64;

/// Sequence value carried by results that have not been scheduled yet.
pub const UNSCHEDULED_SEQUENCE: Sequence = -1;
