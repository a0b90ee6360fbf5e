// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Closed-loop 3A simulation.
//!
//! Drives an [`AiqUnit`] with simulated start-of-frame events, synthetic statistics and a
//! toy proportional auto-exposure solver, logging every control iteration.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use aiq::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config, AiqConfig,
    ConfigError,
};
use aiq::engine::{
    AiqSettings, AiqUnit, AlgorithmCore, Collaborators, EngineConfig, EngineResult,
    UserParameters,
};
use aiq::hal::{SimulatedLens, SimulatedSensor, SimulatedSensorConfig};
use aiq::observability::{debug_flags_help, init_logging, parse_debug_flags, LoggingConfig};
use aiq::result_store::ResultStore;
use aiq::types::{
    AfResults, AiqParam, AlgorithmOutput, AwbResults, BracketMode, ExposureParams,
    ExposureResults, ExposureSegment, FrameParams, GbceResults, OperationMode, RequestId,
    SensorDescriptor, SensorExposureParams, SofEvent, Statistics, StatisticsParams, StreamConfig,
    TuningMode,
};

const TARGET_LUMA: f32 = 118.0;
const MIN_EXPOSURE_US: u32 = 100;
const MAX_EXPOSURE_US: u32 = 33_000;

struct Args {
    config_path: Option<PathBuf>,
    overrides: HashMap<String, String>,
    frames: u32,
    operation_mode: OperationMode,
    scene_luma: f32,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: aiq_sim [--config <path>] [--set <key>=<value>]... [--frames <n>]\n\
         \x20              [--mode normal|hdr|ull|auto-switch] [--scene-luma <0-255>]\n\n\
         Defaults:\n\
         - config: searched as aiq_configuration.toml, built-in defaults if absent\n\
         - frames: 60\n\
         - mode: normal\n\
         - scene-luma: 60 (mean luma at 10 ms exposure)\n\n{}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> Args {
    let mut parsed = Args {
        config_path: None,
        overrides: HashMap::new(),
        frames: 60,
        operation_mode: OperationMode::Normal,
        scene_luma: 60.0,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.config_path = Some(PathBuf::from(v));
            }
            "--set" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                let Some((key, value)) = v.split_once('=') else {
                    eprintln!("Override must look like key=value: {v}");
                    usage_and_exit();
                };
                parsed.overrides.insert(key.to_string(), value.to_string());
            }
            "--frames" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.frames = v.parse().unwrap_or_else(|_| usage_and_exit());
            }
            "--mode" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.operation_mode = match v.as_str() {
                    "normal" => OperationMode::Normal,
                    "hdr" => OperationMode::Hdr,
                    "ull" => OperationMode::Ull,
                    "auto-switch" => OperationMode::AutoSwitch,
                    other => {
                        eprintln!("Unknown operation mode: {other}");
                        usage_and_exit();
                    }
                };
            }
            "--scene-luma" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.scene_luma = v.parse().unwrap_or_else(|_| usage_and_exit());
            }
            "-h" | "--help" => usage_and_exit(),
            // Consumed by parse_debug_flags
            other if other.starts_with("--debug-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    parsed
}

/// File, then environment, then `--set` overrides; built-in defaults when no file exists
fn resolve_config(args: &Args) -> Result<AiqConfig> {
    let config = match load_config(args.config_path.as_deref(), Some(&args.overrides)) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(searched)) if args.config_path.is_none() => {
            eprintln!("No configuration file found ({searched}); using defaults");
            let mut config = AiqConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &args.overrides)?;
            config
        }
        Err(err) => return Err(err).context("Failed to load configuration"),
    };
    validate_config(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Proportional exposure search on the mean of the statistics payload
///
/// Every payload byte is one grid cell's mean luma.
struct ToySolver {
    exposure_us: u32,
    measured_luma: Option<f32>,
    line_time_us: f32,
    lens_position: i32,
}

impl ToySolver {
    fn new() -> Self {
        Self {
            exposure_us: 10_000,
            measured_luma: None,
            line_time_us: 14.8,
            lens_position: 0,
        }
    }
}

impl AlgorithmCore for ToySolver {
    fn configure(&mut self, tuning_modes: &[TuningMode]) -> EngineResult<()> {
        info!("[AIQ-SIM] Solver configured for {:?}", tuning_modes);
        Ok(())
    }

    fn set_sensor_info(&mut self, _frame: &FrameParams, descriptor: &SensorDescriptor) {
        if let Some(line_time_us) = descriptor.line_time_us() {
            self.line_time_us = line_time_us;
        }
    }

    fn update_parameter(&mut self, _param: &AiqParam) {}

    fn set_statistics(&mut self, _params: &StatisticsParams, statistics: &Statistics) {
        if statistics.payload.is_empty() {
            return;
        }
        let sum: u32 = statistics.payload.iter().map(|&v| v as u32).sum();
        self.measured_luma = Some(sum as f32 / statistics.payload.len() as f32);
    }

    fn compute_exposure(&mut self, _request_id: RequestId) -> EngineResult<ExposureResults> {
        let mut converged = false;
        if let Some(luma) = self.measured_luma.filter(|luma| *luma > 0.0) {
            let ratio = (TARGET_LUMA / luma).clamp(0.5, 2.0);
            converged = (ratio - 1.0).abs() < 0.05;
            let next = (self.exposure_us as f32 * ratio) as u32;
            self.exposure_us = next.clamp(MIN_EXPOSURE_US, MAX_EXPOSURE_US);
        }

        let coarse = (self.exposure_us as f32 / self.line_time_us).round() as u16;
        Ok(ExposureResults {
            segments: vec![ExposureSegment {
                exposure: ExposureParams {
                    exposure_time_us: self.exposure_us,
                    analog_gain: 1.0,
                    digital_gain: 1.0,
                    total_target_exposure: self.exposure_us,
                },
                sensor: SensorExposureParams {
                    coarse_integration_time: coarse,
                    fine_integration_time: 0,
                    analog_gain_code_global: 0,
                    digital_gain_global: 256,
                },
            }],
            multiframe: BracketMode::None,
            converged,
        })
    }

    fn compute_full(&mut self, _request_id: RequestId) -> EngineResult<AlgorithmOutput> {
        if self.lens_position < 200 {
            self.lens_position += 20;
        }
        let mut gbce = GbceResults::with_lut_size(aiq::engine::DEFAULT_GAMMA_LUT_SIZE);
        let last = (gbce.g_gamma_lut.len().max(2) - 1) as f32;
        for (i, value) in gbce.g_gamma_lut.iter_mut().enumerate() {
            *value = (i as f32 / last).powf(1.0 / 2.2);
        }
        gbce.r_gamma_lut = gbce.g_gamma_lut.clone();
        gbce.b_gamma_lut = gbce.g_gamma_lut.clone();

        Ok(AlgorithmOutput {
            awb: AwbResults {
                accurate_r_per_g: 0.55,
                accurate_b_per_g: 0.62,
                final_r_per_g: 0.55,
                final_b_per_g: 0.62,
                cct_estimate: 5000,
                distance_from_convergence: 0.0,
            },
            af: AfResults {
                next_lens_position: self.lens_position,
                lens_driver_action: self.lens_position < 200,
                final_lens_position_reached: self.lens_position >= 200,
            },
            gbce,
        })
    }
}

/// Grid of mean luma values for a frame exposed for `exposure_us`
fn synthetic_grid(scene_luma: f32, exposure_us: u32) -> Vec<u8> {
    let luma = (scene_luma * exposure_us as f32 / 10_000.0).clamp(0.0, 255.0);
    (0..64)
        .map(|cell| (luma + (cell % 8) as f32 - 3.5).clamp(0.0, 255.0) as u8)
        .collect()
}

fn main() -> Result<()> {
    let args = parse_args();
    let config = resolve_config(&args)?;

    let debug_flags = parse_debug_flags();
    init_logging(&debug_flags, &LoggingConfig::from(&config.logging))?;

    info!("[AIQ-SIM] aiq {} simulating {} frames", aiq::engine::VERSION, args.frames);

    let store = Arc::new(ResultStore::new(
        config.result_store.result_capacity,
        config.result_store.statistics_capacity,
    )?);
    let sensor = SimulatedSensor::new(SimulatedSensorConfig {
        exposure_lag: config.platform.exposure_lag,
        sof_history: config.sensor.sof_history,
        frame_rate: config.sensor.frame_rate,
        ..Default::default()
    });
    let lens = SimulatedLens::new();
    let settings = Arc::new(AiqSettings::new());
    let collaborators = Collaborators::new(ToySolver::new(), settings, sensor.clone(), lens.clone());
    let unit = AiqUnit::new(EngineConfig::from(&config.platform), Arc::clone(&store), collaborators);

    let stream = StreamConfig {
        operation_mode: args.operation_mode,
        width: 1920,
        height: 1080,
    };
    unit.init()?;
    unit.configure(&stream)?;
    unit.set_parameters(&UserParameters {
        fps: Some(config.sensor.frame_rate),
        ..Default::default()
    })?;
    unit.start()?;

    let frame_period_us = (1_000_000.0 / config.sensor.frame_rate.max(1.0)) as u64;
    let mut converged_at = None;

    for frame in 0..args.frames {
        let sequence = frame as i64;
        let timestamp = sequence as u64 * frame_period_us;
        unit.handle_sof_event(&SofEvent::new(sequence, timestamp));

        // Statistics of the previous frame, exposed with whatever result applies to it
        if sequence > 0 {
            let captured = sequence - 1;
            let applied = store.result_for(captured);
            let exposure_us = applied
                .as_ref()
                .and_then(|result| result.exposure.segments.first())
                .map_or(10_000, |segment| segment.exposure.exposure_time_us);
            let tuning_mode = applied.map_or(TuningMode::Video, |result| result.tuning_mode);

            let mut statistics = Statistics::new(captured, captured as u64 * frame_period_us, tuning_mode);
            statistics.payload = synthetic_grid(args.scene_luma, exposure_us);
            if let Err(err) = unit.dispatch_statistics(statistics) {
                warn!("[AIQ-SIM] Statistics for sequence {} dropped: {}", captured, err);
            }
        }

        let outcome = unit.run_iteration(frame as RequestId, None)?;
        if let Some(err) = &outcome.error {
            warn!("[AIQ-SIM] Frame {} ended in {:?}: {}", frame, outcome.state, err);
            continue;
        }

        let latest = store.latest();
        let exposure_us = latest
            .as_ref()
            .and_then(|result| result.exposure.segments.first())
            .map(|segment| segment.exposure.exposure_time_us);
        let converged = latest.as_ref().is_some_and(|result| result.exposure.converged);
        if converged && converged_at.is_none() {
            converged_at = Some(frame);
        }

        info!(
            "[AIQ-SIM] frame={} state={:?} ran={} committed={:?} exposure_us={:?} lens={} converged={}",
            frame,
            outcome.state,
            outcome.algorithm_ran,
            outcome.committed,
            exposure_us,
            lens.position(),
            converged
        );
    }

    unit.stop();
    unit.deinit();

    match converged_at {
        Some(frame) => info!("[AIQ-SIM] Exposure converged at frame {}", frame),
        None => info!("[AIQ-SIM] Exposure did not converge within {} frames", args.frames),
    }
    info!(
        "[AIQ-SIM] Sensor applied {} exposures, lens moved {} times",
        sensor.applied().len(),
        lens.records().len()
    );
    Ok(())
}
