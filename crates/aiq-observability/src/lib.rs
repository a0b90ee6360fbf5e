// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! # aiq-observability
//!
//! Process-wide diagnostic setup for AIQ binaries. Library crates only emit `tracing`
//! events; the subscriber is installed once at startup by [`init_logging`] and is
//! read-only afterwards.
//!
//! Per-crate debug output is switched on with `--debug-{crate-name}`, `--debug-all` or the
//! `AIQ_DEBUG` environment variable.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known AIQ crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "aiq",
    "aiq-engine",
    "aiq-result-store",
    "aiq-hal",
    "aiq-config",
    "aiq-types",
];
