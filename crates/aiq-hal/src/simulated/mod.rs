// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Reference actuators driven by start-of-frame events.
//!
//! Both are cheap handles over shared state: clone one before boxing it into an engine to
//! keep an inspection handle.

mod lens;
mod sensor;

pub use lens::{FocusRecord, SimulatedLens};
pub use sensor::{ScheduledExposure, SimulatedSensor, SimulatedSensorConfig, LOG_DEPTH};
