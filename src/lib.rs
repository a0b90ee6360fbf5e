// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! # AIQ - frame-synchronized 3A control loop
//!
//! Drives auto-exposure, auto-white-balance and auto-focus for an image sensor pipeline:
//! once per frame request the control loop consumes the newest hardware statistics, runs
//! (or replays) the 3A solver and publishes a result keyed by the frame sequence the sensor
//! will apply it on.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! aiq = "0.1"  # Default: engine + simulated actuators
//! ```
//!
//! ## Feature Flags
//!
//! - **`engine`** (default): control loop engine, unit lifecycle, settings source
//! - **`simulation`** (default): actuation contracts plus simulated sensor and lens
//! - **`observability`**: logging initialization and per-crate debug flags
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use aiq::prelude::*;
//!
//! let config = aiq::config::load_config(None, None)?;
//! let store = Arc::new(ResultStore::new(
//!     config.result_store.result_capacity,
//!     config.result_store.statistics_capacity,
//! )?);
//! let collaborators = Collaborators::new(
//!     my_solver,
//!     Arc::new(AiqSettings::new()),
//!     SimulatedSensor::default(),
//!     SimulatedLens::new(),
//! );
//! let unit = AiqUnit::new(EngineConfig::from(&config.platform), store, collaborators);
//! unit.init()?;
//! unit.configure(&StreamConfig::default())?;
//! unit.start()?;
//!
//! let outcome = unit.run_iteration(request_id, None)?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: aiq-types, aiq-config                      │
//! │  (Result sets, statistics, parameters, configuration)   │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Infrastructure: aiq-result-store, aiq-observability    │
//! │  (Sequence-indexed results, statistics lock, logging)   │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Hardware: aiq-hal                                      │
//! │  (Sensor and lens actuation, simulated managers)        │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Control: aiq-engine                                    │
//! │  (Run decision, replay, skip frames, unit lifecycle)    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use aiq_config as config;
pub use aiq_types as types;

// Re-export infrastructure
pub use aiq_result_store as result_store;

#[cfg(feature = "observability")]
pub use aiq_observability as observability;

// Re-export hardware and control layers
#[cfg(feature = "simulation")]
pub use aiq_hal as hal;

#[cfg(feature = "engine")]
pub use aiq_engine as engine;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::result_store::{ResultStore, StoreError};
    pub use crate::types::*;

    #[cfg(feature = "engine")]
    pub use crate::engine::{
        AiqSettings, AiqState, AiqUnit, AlgorithmCore, Collaborators, ControlLoopEngine,
        EngineConfig, EngineError, IterationOutcome, SettingsSource, UnitState, UserParameters,
    };

    #[cfg(feature = "simulation")]
    pub use crate::hal::{LensActuator, SensorActuator, SimulatedLens, SimulatedSensor};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let store = ResultStore::new(4, 2).unwrap();
        assert!(store.latest().is_none());
        assert_eq!(TuningMode::default(), TuningMode::Video);
    }
}
