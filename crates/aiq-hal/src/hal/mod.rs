// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

/// Lens actuation trait.
pub mod lens;
/// Sensor actuation trait.
pub mod sensor;
/// Bounded start-of-frame timestamp history.
pub mod sof_history;

pub use lens::LensActuator;
pub use sensor::SensorActuator;
pub use sof_history::SofHistory;
