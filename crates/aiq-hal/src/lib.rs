// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! # AIQ HAL
//!
//! Actuation contracts consumed by the control loop engine:
//! - [`SensorActuator`]: schedules exposures onto predicted frame sequences, reports the
//!   measured application delay and resolves start-of-frame timestamps
//! - [`LensActuator`]: schedules focus moves and reports lens state
//!
//! With the `simulated` feature, [`simulated`] provides reference actuators driven purely by
//! start-of-frame events; they back the `aiq_sim` tool and the engine tests.

pub mod error;
pub mod hal;

#[cfg(feature = "simulated")]
pub mod simulated;

pub use error::{HalError, HalResult};
pub use hal::{LensActuator, SensorActuator, SofHistory};

#[cfg(feature = "simulated")]
pub use simulated::{SimulatedLens, SimulatedSensor, SimulatedSensorConfig};
