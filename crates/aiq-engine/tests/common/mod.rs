// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared mocks and engine wiring for the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use aiq_engine::{
    AiqSettings, AlgorithmCore, AuxiliaryComponent, Collaborators, ControlLoopEngine,
    EngineConfig, EngineError, EngineResult, IterationOutcome, MetadataSink, SettingsSource,
};
use aiq_hal::simulated::{SimulatedLens, SimulatedSensor, SimulatedSensorConfig};
use aiq_result_store::ResultStore;
use aiq_types::{
    AfResults, AiqParam, AlgorithmOutput, AwbResults, BracketMode, ExposureParams,
    ExposureResults, ExposureSegment, FrameParams, GbceResults, MakernoteMode, OperationMode,
    RequestId, SensorDescriptor, SensorExposureParams, Sequence, SofEvent, Statistics,
    StatisticsParams, StreamConfig, TuningMode,
};
use parking_lot::Mutex;

pub const FRAME_PERIOD_US: u64 = 33_333;

// ═══════════════════════════════════════════════════════════
// Algorithm core
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct AlgorithmLog {
    pub init_calls: usize,
    pub deinit_calls: usize,
    pub configured: Vec<Vec<TuningMode>>,
    pub sensor_info_calls: usize,
    pub parameters: Vec<AiqParam>,
    pub statistics: Vec<StatisticsParams>,
    pub exposure_requests: Vec<RequestId>,
    pub full_requests: Vec<RequestId>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlgorithmControl {
    pub multiframe: BracketMode,
    pub fail_exposure: bool,
    pub fail_full: bool,
    /// Time spent inside every full computation
    pub full_delay: Duration,
}

/// Deterministic solver whose output depends only on the request id
#[derive(Debug, Clone, Default)]
pub struct MockAlgorithm {
    pub log: Arc<Mutex<AlgorithmLog>>,
    pub control: Arc<Mutex<AlgorithmControl>>,
}

impl MockAlgorithm {
    pub fn exposure_calls(&self) -> usize {
        self.log.lock().exposure_requests.len()
    }

    pub fn set_multiframe(&self, multiframe: BracketMode) {
        self.control.lock().multiframe = multiframe;
    }

    pub fn fail_exposure(&self, fail: bool) {
        self.control.lock().fail_exposure = fail;
    }

    pub fn fail_full(&self, fail: bool) {
        self.control.lock().fail_full = fail;
    }

    pub fn slow_full(&self, delay: Duration) {
        self.control.lock().full_delay = delay;
    }
}

pub fn exposure_for(request_id: RequestId, multiframe: BracketMode) -> ExposureResults {
    let exposure_time_us = 10_000 + request_id as u32 * 10;
    ExposureResults {
        segments: vec![ExposureSegment {
            exposure: ExposureParams {
                exposure_time_us,
                analog_gain: 2.0,
                digital_gain: 1.25,
                total_target_exposure: exposure_time_us * 2,
            },
            sensor: SensorExposureParams {
                coarse_integration_time: (exposure_time_us / 15) as u16,
                fine_integration_time: 0,
                analog_gain_code_global: 64,
                digital_gain_global: 256,
            },
        }],
        multiframe,
        converged: request_id > 2,
    }
}

impl AlgorithmCore for MockAlgorithm {
    fn init(&mut self) -> EngineResult<()> {
        self.log.lock().init_calls += 1;
        Ok(())
    }

    fn deinit(&mut self) {
        self.log.lock().deinit_calls += 1;
    }

    fn configure(&mut self, tuning_modes: &[TuningMode]) -> EngineResult<()> {
        self.log.lock().configured.push(tuning_modes.to_vec());
        Ok(())
    }

    fn set_sensor_info(&mut self, _frame: &FrameParams, _descriptor: &SensorDescriptor) {
        self.log.lock().sensor_info_calls += 1;
    }

    fn update_parameter(&mut self, param: &AiqParam) {
        self.log.lock().parameters.push(param.clone());
    }

    fn set_statistics(&mut self, params: &StatisticsParams, _statistics: &Statistics) {
        self.log.lock().statistics.push(*params);
    }

    fn compute_exposure(&mut self, request_id: RequestId) -> EngineResult<ExposureResults> {
        let control = *self.control.lock();
        self.log.lock().exposure_requests.push(request_id);
        if control.fail_exposure {
            return Err(EngineError::Algorithm("exposure search diverged".to_string()));
        }
        Ok(exposure_for(request_id, control.multiframe))
    }

    fn compute_full(&mut self, request_id: RequestId) -> EngineResult<AlgorithmOutput> {
        let control = *self.control.lock();
        self.log.lock().full_requests.push(request_id);
        if !control.full_delay.is_zero() {
            std::thread::sleep(control.full_delay);
        }
        if control.fail_full {
            return Err(EngineError::Algorithm("awb has no valid grid".to_string()));
        }

        let ratio = 1.0 + request_id as f32 * 0.01;
        let mut gbce = GbceResults::with_lut_size(16);
        for (i, value) in gbce.g_gamma_lut.iter_mut().enumerate() {
            *value = i as f32 / 15.0;
        }
        Ok(AlgorithmOutput {
            awb: AwbResults {
                accurate_r_per_g: ratio,
                accurate_b_per_g: 1.0 / ratio,
                final_r_per_g: ratio,
                final_b_per_g: 1.0 / ratio,
                ..Default::default()
            },
            af: AfResults {
                next_lens_position: request_id as i32,
                lens_driver_action: true,
                final_lens_position_reached: false,
            },
            gbce,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Metadata and components
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub notes: Arc<Mutex<Vec<(MakernoteMode, Sequence, TuningMode)>>>,
}

impl RecordingSink {
    pub fn notes(&self) -> Vec<(MakernoteMode, Sequence, TuningMode)> {
        self.notes.lock().clone()
    }
}

impl MetadataSink for RecordingSink {
    fn save_makernote(&mut self, mode: MakernoteMode, sequence: Sequence, tuning_mode: TuningMode) {
        self.notes.lock().push((mode, sequence, tuning_mode));
    }
}

/// Auxiliary component that records every call it receives
#[derive(Debug, Clone)]
pub struct RecordingComponent {
    pub name: &'static str,
    pub events: Arc<Mutex<Vec<String>>>,
    pub fail_configure: bool,
}

impl RecordingComponent {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            events: Arc::new(Mutex::new(Vec::new())),
            fail_configure: false,
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl AuxiliaryComponent for RecordingComponent {
    fn name(&self) -> &'static str {
        self.name
    }

    fn init(&mut self) -> EngineResult<()> {
        self.events.lock().push("init".to_string());
        Ok(())
    }

    fn deinit(&mut self) {
        self.events.lock().push("deinit".to_string());
    }

    fn configure(&mut self, tuning_modes: &[TuningMode]) -> EngineResult<()> {
        if self.fail_configure {
            return Err(EngineError::Configuration("no tuning data".to_string()));
        }
        self.events
            .lock()
            .push(format!("configure {}", tuning_modes.len()));
        Ok(())
    }

    fn start(&mut self) {
        self.events.lock().push("start".to_string());
    }

    fn stop(&mut self) {
        self.events.lock().push("stop".to_string());
    }

    fn handle_statistics(&mut self, statistics: &Statistics) {
        self.events
            .lock()
            .push(format!("stats {}", statistics.sequence));
    }
}

// ═══════════════════════════════════════════════════════════
// Wiring
// ═══════════════════════════════════════════════════════════

/// Test-side handles onto the shared state of the collaborators
pub struct Parts {
    pub algorithm: MockAlgorithm,
    pub settings: Arc<AiqSettings>,
    pub sensor: SimulatedSensor,
    pub lens: SimulatedLens,
    pub makernotes: RecordingSink,
}

pub fn parts(exposure_lag: i64) -> (Collaborators, Parts) {
    let algorithm = MockAlgorithm::default();
    let settings = Arc::new(AiqSettings::new());
    let sensor = SimulatedSensor::new(SimulatedSensorConfig {
        exposure_lag,
        ..Default::default()
    });
    let lens = SimulatedLens::new();
    let makernotes = RecordingSink::default();

    let collaborators = Collaborators::new(
        algorithm.clone(),
        Arc::clone(&settings) as Arc<dyn SettingsSource>,
        sensor.clone(),
        lens.clone(),
    )
    .with_metadata_sink(makernotes.clone());

    let parts = Parts {
        algorithm,
        settings,
        sensor,
        lens,
        makernotes,
    };
    (collaborators, parts)
}

pub struct Harness {
    pub engine: ControlLoopEngine,
    pub store: Arc<ResultStore>,
    pub algorithm: MockAlgorithm,
    pub settings: Arc<AiqSettings>,
    pub sensor: SimulatedSensor,
    pub lens: SimulatedLens,
    pub makernotes: RecordingSink,
}

impl Harness {
    /// Started engine whose settings are configured for `operation_mode`
    pub fn new(config: EngineConfig, operation_mode: OperationMode) -> Self {
        let harness = Self::unconfigured(config);
        let stream = StreamConfig {
            operation_mode,
            width: 1920,
            height: 1080,
        };
        let modes = operation_mode.tuning_modes();
        harness.engine.configure(&modes).unwrap();
        harness.settings.configure(&stream, &modes).unwrap();
        harness
    }

    /// Started engine whose settings were initialized but never configured
    pub fn unconfigured(config: EngineConfig) -> Self {
        let (
            collaborators,
            Parts {
                algorithm,
                settings,
                sensor,
                lens,
                makernotes,
            },
        ) = parts(config.exposure_lag);

        let store = Arc::new(ResultStore::new(40, 3).unwrap());
        let engine = ControlLoopEngine::new(config, Arc::clone(&store), collaborators);
        settings.init().unwrap();
        engine.init().unwrap();
        engine.start().unwrap();

        Self {
            engine,
            store,
            algorithm,
            settings,
            sensor,
            lens,
            makernotes,
        }
    }

    pub fn run(&self, request_id: RequestId) -> IterationOutcome {
        self.engine.run_iteration(request_id, None)
    }

    pub fn sof(&self, sequence: Sequence) {
        self.engine
            .handle_sof_event(&SofEvent::new(sequence, sequence as u64 * FRAME_PERIOD_US));
    }

    /// Publish statistics captured on `sequence` under `mode`
    pub fn publish(&self, sequence: Sequence, mode: TuningMode) {
        self.store
            .publish_statistics(Statistics::new(sequence, capture_timestamp(sequence), mode))
            .unwrap();
    }
}

pub fn capture_timestamp(sequence: Sequence) -> u64 {
    sequence as u64 * FRAME_PERIOD_US + 7
}
