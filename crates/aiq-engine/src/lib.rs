// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! # AIQ Engine
//!
//! Frame-synchronized 3A control loop.
//!
//! Every frame request the caller runs one iteration of the [`ControlLoopEngine`]:
//! it decides whether new statistics justify a run, prepares the algorithm inputs,
//! computes (or replays) exposure, white balance, focus and tone curves, post-processes
//! the result and commits it to the [`ResultStore`](aiq_result_store::ResultStore) under
//! the frame sequence the sensor will apply it on. Tuning-mode switches are bridged with
//! skip results so every sequence in the switch window has a committed result.
//!
//! [`AiqUnit`] wraps the engine, the settings source and optional auxiliary components
//! into one lifecycle (`init -> configure -> start -> stop -> deinit`).
//!
//! ## Collaborators
//! - [`AlgorithmCore`]: the numerical solver
//! - [`SettingsSource`]: parameter snapshots ([`AiqSettings`] is the default)
//! - [`RequestCorrelator`]: sequence/request bookkeeping ([`RequestIdMap`] is the default)
//! - [`MetadataSink`], [`ToneCurveOps`], [`AuxiliaryComponent`]
//! - sensor and lens actuators from `aiq-hal`

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod collaborators;
pub mod engine;
pub mod error;
pub mod postprocess;
pub mod request_map;
pub mod scheduling;
pub mod settings;
pub mod state;
pub mod tonemap;
pub mod unit;

pub use collaborators::{
    AlgorithmCore, AuxiliaryComponent, MetadataSink, NullMetadataSink, RequestCorrelator,
    SettingsSource, ToneCurveOps,
};
pub use engine::{Collaborators, ControlLoopEngine, EngineConfig, SofListener};
pub use error::{EngineError, EngineResult};
pub use request_map::RequestIdMap;
pub use scheduling::{RunDecision, PIPE_SWITCH_SKIP_FRAMES};
pub use settings::{AiqSettings, UserParameters};
pub use state::{AiqState, IterationOutcome, RunningHistory};
pub use tonemap::{StandardToneCurves, DEFAULT_GAMMA_LUT_SIZE};
pub use unit::{AiqUnit, UnitState};
