// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Control loop engine
//!
//! One `run_iteration` call turns the newest statistics into at most one new authoritative
//! result (plus the skip results that bridge a pipe switch):
//!
//! ```text
//! lock stats -> acquire slot -> decide -> prepare -> compute | replay -> post-process -> commit
//! ```
//!
//! All public operations serialize on one engine-wide lock. The statistics lock taken at the
//! start of an iteration is a separate guard so the statistics producer never blocks on it.

use std::sync::Arc;

use aiq_config::PlatformConfig;
use aiq_hal::{LensActuator, SensorActuator};
use aiq_result_store::ResultStore;
use aiq_types::{
    AecScene, AiqParam, ControlResult, RequestId, Sequence, SofEvent, Statistics,
    StatisticsParams, TuningMode,
};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::collaborators::{
    AlgorithmCore, MetadataSink, NullMetadataSink, RequestCorrelator, SettingsSource,
    ToneCurveOps,
};
use crate::error::{EngineError, EngineResult};
use crate::postprocess::{apply_manual_tonemaps, derive_scene_mode};
use crate::request_map::RequestIdMap;
use crate::scheduling::{decide_run, should_recompute, skip_frame_count, RunInputs};
use crate::state::{AiqState, IterationOutcome, RunningHistory};
use crate::tonemap::StandardToneCurves;

/// Platform knobs the engine reads on every iteration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub per_frame_control: bool,
    pub initial_skip_frames: u32,
    pub running_interval: i64,
    pub exposure_lag: i64,
    pub max_exposure_applied_delay: u32,
    pub sensor_awb_enabled: bool,
    pub sensor_ae_enabled: bool,
    pub hdr_feature: bool,
}

impl From<&PlatformConfig> for EngineConfig {
    fn from(platform: &PlatformConfig) -> Self {
        Self {
            per_frame_control: platform.per_frame_control,
            initial_skip_frames: platform.initial_skip_frames,
            running_interval: platform.running_interval,
            exposure_lag: platform.exposure_lag,
            max_exposure_applied_delay: platform.max_exposure_applied_delay,
            sensor_awb_enabled: platform.sensor_awb_enabled,
            sensor_ae_enabled: platform.sensor_ae_enabled,
            hdr_feature: platform.hdr_feature,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&PlatformConfig::default())
    }
}

/// Everything the engine drives, owned by the engine for its whole lifetime
pub struct Collaborators {
    pub algorithm: Box<dyn AlgorithmCore>,
    pub settings: Arc<dyn SettingsSource>,
    pub sensor: Box<dyn SensorActuator>,
    pub lens: Box<dyn LensActuator>,
    /// `None` correlates through a [`RequestIdMap`] as deep as the result store
    pub correlator: Option<Box<dyn RequestCorrelator>>,
    pub metadata: Box<dyn MetadataSink>,
    pub tone_curves: Box<dyn ToneCurveOps>,
}

impl Collaborators {
    /// Required collaborators; correlation, metadata and tone curves get their defaults
    pub fn new(
        algorithm: impl AlgorithmCore + 'static,
        settings: Arc<dyn SettingsSource>,
        sensor: impl SensorActuator + 'static,
        lens: impl LensActuator + 'static,
    ) -> Self {
        Self {
            algorithm: Box::new(algorithm),
            settings,
            sensor: Box::new(sensor),
            lens: Box::new(lens),
            correlator: None,
            metadata: Box::new(NullMetadataSink),
            tone_curves: Box::new(StandardToneCurves),
        }
    }

    pub fn with_correlator(mut self, correlator: impl RequestCorrelator + 'static) -> Self {
        self.correlator = Some(Box::new(correlator));
        self
    }

    pub fn with_metadata_sink(mut self, metadata: impl MetadataSink + 'static) -> Self {
        self.metadata = Box::new(metadata);
        self
    }

    pub fn with_tone_curves(mut self, tone_curves: impl ToneCurveOps + 'static) -> Self {
        self.tone_curves = Box::new(tone_curves);
        self
    }
}

/// Receiver of hardware start-of-frame notifications
pub trait SofListener: Send + Sync {
    fn handle_sof_event(&self, event: &SofEvent);
}

/// Schedule the exposure of `result` and take over the sequence it lands on
fn stamp_exposure(
    sensor: &mut dyn SensorActuator,
    result: &mut ControlResult,
    applying_sequence: Option<Sequence>,
) {
    let exposures = result.exposure.sensor_exposures();
    result.sequence = sensor.schedule_exposure(&exposures, applying_sequence);
}

struct EngineCore {
    config: EngineConfig,
    store: Arc<ResultStore>,
    algorithm: Box<dyn AlgorithmCore>,
    settings: Arc<dyn SettingsSource>,
    sensor: Box<dyn SensorActuator>,
    lens: Box<dyn LensActuator>,
    correlator: Box<dyn RequestCorrelator>,
    metadata: Box<dyn MetadataSink>,
    tone_curves: Box<dyn ToneCurveOps>,
    /// Snapshot of the last prepared iteration
    param: AiqParam,
    first_run: bool,
    history: Option<RunningHistory>,
}

impl EngineCore {
    // ═══════════════════════════════════════════════════════════
    // Iteration
    // ═══════════════════════════════════════════════════════════

    fn run_iteration(
        &mut self,
        request_id: RequestId,
        applying_sequence: Option<Sequence>,
    ) -> IterationOutcome {
        let store = Arc::clone(&self.store);
        let mut outcome = IterationOutcome::new(request_id);

        let statistics = if self.first_run {
            None
        } else {
            match store.lock_statistics() {
                Ok(lock) => lock,
                Err(err) => {
                    warn!("[AIQ-ENGINE] Statistics unavailable: {}", err);
                    None
                }
            }
        };
        let stats_sequence = statistics.as_ref().map(|lock| lock.sequence());
        let mut result = store.acquire_slot();

        let decision = decide_run(&RunInputs {
            request_id,
            per_frame_control: self.config.per_frame_control,
            first_run: self.first_run,
            cadence: self.param.run3a_cadence,
            stats_sequence,
            last_consumed_stats: self.history.as_ref().and_then(|h| h.stats_sequence),
            applied_delay: self.sensor.exposure_applied_delay(),
            max_applied_delay: self.config.max_exposure_applied_delay,
        });

        if !decision.should_run() {
            debug!("[AIQ-ENGINE] request {} waits: {:?}", request_id, decision);
            outcome.enter(AiqState::Wait);
        } else {
            trace!("[AIQ-ENGINE] request {} runs: {:?}", request_id, decision);
            match self.prepare_input(statistics.as_deref(), &mut result) {
                Ok(()) => {
                    result.tuning_mode = self.param.tuning_mode;
                    outcome.enter(AiqState::Run);
                }
                Err(err) => {
                    warn!("[AIQ-ENGINE] request {}: {}", request_id, err);
                    outcome.fail(err);
                }
            }
        }

        if outcome.state == AiqState::Run {
            match self.run_algorithm(request_id, applying_sequence, &mut result) {
                Ok(ran) => {
                    outcome.algorithm_ran = ran;
                    outcome.enter(AiqState::ResultSet);
                }
                Err(err) => {
                    warn!("[AIQ-ENGINE] request {}: {}", request_id, err);
                    outcome.fail(err);
                }
            }
        }

        if outcome.state == AiqState::ResultSet {
            self.handle_result(&mut result);
            outcome.enter(AiqState::Done);
        }

        let mut computed = None;
        if outcome.state == AiqState::Done {
            if outcome.algorithm_ran {
                computed = Some(result.clone());
            }
            if let Err(err) = self.commit(&store, request_id, result, &mut outcome.committed) {
                warn!("[AIQ-ENGINE] request {} commit failed: {}", request_id, err);
                outcome.fail(err);
            }
        }

        drop(statistics);

        if let Some(result) = computed {
            self.history = Some(RunningHistory {
                result,
                request_id,
                stats_sequence,
            });
        }

        outcome.effective_sequence = store.latest_sequence();
        if let Some(sequence) = outcome.effective_sequence {
            self.metadata
                .save_makernote(self.param.makernote_mode, sequence, self.param.tuning_mode);
        }

        debug!(
            "[AIQ-ENGINE] request {} -> {:?}, effective seq {:?}, stats seq {:?}",
            request_id, outcome.state, outcome.effective_sequence, stats_sequence
        );
        outcome
    }

    fn prepare_input(
        &mut self,
        statistics: Option<&Statistics>,
        result: &mut ControlResult,
    ) -> EngineResult<()> {
        self.param = self.settings.parameter()?;

        if self.first_run {
            if let Err(err) = self.sensor.set_frame_rate(self.param.fps) {
                warn!("[AIQ-ENGINE] Frame rate {} not applied: {}", self.param.fps, err);
            }
            let (frame, descriptor) = self
                .sensor
                .sensor_info()
                .map_err(|err| EngineError::SensorInfo(err.to_string()))?;
            self.algorithm.set_sensor_info(&frame, &descriptor);
        }

        self.lens.update_lens_info(&mut self.param);
        self.algorithm.update_parameter(&self.param);

        let Some(statistics) = statistics else {
            trace!("[AIQ-ENGINE] Running without statistics");
            return Ok(());
        };

        result.rgbs_stats_requested = self.param.callback_rgbs;
        match self.package_statistics(statistics) {
            Ok(params) => self.algorithm.set_statistics(&params, statistics),
            Err(err) => warn!("[AIQ-ENGINE] {}, running open-loop", err),
        }
        Ok(())
    }

    fn package_statistics(&self, statistics: &Statistics) -> EngineResult<StatisticsParams> {
        if self.param.tuning_mode.conflicts_with(statistics.tuning_mode) {
            return Err(EngineError::StatisticsMismatch {
                current: self.param.tuning_mode,
                statistics: statistics.tuning_mode,
            });
        }

        let frame_timestamp = match self.sensor.sof_timestamp(statistics.sequence) {
            Some(timestamp) => timestamp,
            None => {
                debug!(
                    "[AIQ-ENGINE] No SOF for stats seq={}, using capture timestamp",
                    statistics.sequence
                );
                statistics.timestamp
            }
        };

        Ok(StatisticsParams {
            frame_id: self.correlator.request_id_for(statistics.sequence),
            frame_timestamp,
            sequence: statistics.sequence,
            using_rgbs_for_aec: self.config.sensor_ae_enabled,
        })
    }

    /// Compute a fresh result or replay the last computed one; returns whether the
    /// algorithm core ran
    fn run_algorithm(
        &mut self,
        request_id: RequestId,
        applying_sequence: Option<Sequence>,
        result: &mut ControlResult,
    ) -> EngineResult<bool> {
        if !should_recompute(request_id, self.config.running_interval, self.first_run) {
            if let Some(history) = &self.history {
                result.copy_from(&history.result);
                stamp_exposure(self.sensor.as_mut(), result, applying_sequence);
                self.correlator.link_request(request_id, history.request_id);
                trace!(
                    "[AIQ-ENGINE] request {} replays request {} at seq={}",
                    request_id,
                    history.request_id,
                    result.sequence
                );
                return Ok(false);
            }
            debug!("[AIQ-ENGINE] Nothing to replay, computing request {}", request_id);
        }

        result.exposure = self.algorithm.compute_exposure(request_id)?;
        stamp_exposure(self.sensor.as_mut(), result, applying_sequence);

        let output = self.algorithm.compute_full(request_id)?;
        result.awb = output.awb;
        result.af = output.af;
        result.gbce = output.gbce;
        Ok(true)
    }

    fn handle_result(&mut self, result: &mut ControlResult) {
        if self.config.hdr_feature {
            self.settings
                .update_pipe_class(AecScene::from_bracket(result.exposure.multiframe));
        }

        result.scene_mode = derive_scene_mode(self.param.scene_mode, result.exposure.multiframe);
        apply_manual_tonemaps(self.tone_curves.as_ref(), &self.param, result);
        trace!(
            "[AIQ-ENGINE] mode={} scene={:?} manual tonemap={}",
            result.tuning_mode,
            result.scene_mode,
            result.gbce.have_manual_settings
        );
    }

    // ═══════════════════════════════════════════════════════════
    // Commit
    // ═══════════════════════════════════════════════════════════

    fn commit(
        &mut self,
        store: &ResultStore,
        request_id: RequestId,
        mut result: ControlResult,
        committed: &mut Vec<Sequence>,
    ) -> EngineResult<()> {
        let skip_count = skip_frame_count(
            self.first_run,
            self.config.per_frame_control,
            self.config.initial_skip_frames,
            store.latest().map(|latest| latest.tuning_mode),
            result.tuning_mode,
        );
        if skip_count > 0 {
            debug!(
                "[AIQ-ENGINE] Committing {} skip frame(s) ahead of seq={}",
                skip_count, result.sequence
            );
        }

        for _ in 0..skip_count {
            self.finalize(&mut result, true);
            let held = store.commit(result)?;
            self.correlator.record(held.sequence, request_id);
            committed.push(held.sequence);

            result = store.acquire_slot();
            result.copy_from(&held);
            stamp_exposure(self.sensor.as_mut(), &mut result, None);
        }

        self.finalize(&mut result, false);
        let last = store.commit(result)?;
        self.correlator.record(last.sequence, request_id);
        committed.push(last.sequence);

        self.first_run = false;
        Ok(())
    }

    /// Push the sensor and lens side effects of `result` and stamp the parameter snapshot
    fn finalize(&mut self, result: &mut ControlResult, skip: bool) {
        result.skip = skip;
        if skip {
            trace!("[AIQ-ENGINE] Skipping frame seq={}", result.sequence);
        }

        if self.config.hdr_feature {
            self.sensor
                .set_wdr_mode(result.tuning_mode, result.sequence - self.config.exposure_lag);
        }
        if self.config.sensor_awb_enabled {
            self.sensor
                .set_awb(result.awb.accurate_r_per_g, result.awb.accurate_b_per_g);
        }

        if let Err(err) = self
            .lens
            .apply_focus_result(&result.af, result.sequence, &self.param)
        {
            warn!(
                "[AIQ-ENGINE] Focus result for seq={} not applied: {}",
                result.sequence, err
            );
        }
        result.param.clone_from(&self.param);
    }
}

/// Frame-synchronized 3A control loop of one camera
pub struct ControlLoopEngine {
    core: Mutex<EngineCore>,
}

impl ControlLoopEngine {
    pub fn new(config: EngineConfig, store: Arc<ResultStore>, collaborators: Collaborators) -> Self {
        let Collaborators {
            algorithm,
            settings,
            sensor,
            lens,
            correlator,
            metadata,
            tone_curves,
        } = collaborators;
        let correlator = correlator.unwrap_or_else(|| {
            Box::new(RequestIdMap::new(store.result_capacity())) as Box<dyn RequestCorrelator>
        });

        Self {
            core: Mutex::new(EngineCore {
                config,
                store,
                algorithm,
                settings,
                sensor,
                lens,
                correlator,
                metadata,
                tone_curves,
                param: AiqParam::default(),
                first_run: true,
                history: None,
            }),
        }
    }

    pub fn init(&self) -> EngineResult<()> {
        let mut core = self.core.lock();
        core.algorithm.init()?;
        core.sensor.reset();
        info!("[AIQ-ENGINE] Initialized");
        Ok(())
    }

    pub fn deinit(&self) {
        let mut core = self.core.lock();
        core.sensor.reset();
        core.algorithm.deinit();
        core.store.reset();
        core.correlator.reset();
        core.history = None;
        core.param = AiqParam::default();
        core.first_run = true;
        info!("[AIQ-ENGINE] Deinitialized");
    }

    /// Prepare the algorithm core for every tuning mode the stream may use
    pub fn configure(&self, tuning_modes: &[TuningMode]) -> EngineResult<()> {
        let mut core = self.core.lock();
        core.algorithm.configure(tuning_modes)?;
        info!("[AIQ-ENGINE] Configured for {:?}", tuning_modes);
        Ok(())
    }

    /// Begin a stream
    ///
    /// Frame numbering restarts with every stream; everything keyed by the previous
    /// stream's sequences is dropped.
    pub fn start(&self) -> EngineResult<()> {
        let mut core = self.core.lock();
        core.first_run = true;
        core.sensor.reset();
        core.store.reset();
        core.correlator.reset();
        core.history = None;
        core.lens.start()?;
        info!("[AIQ-ENGINE] Started");
        Ok(())
    }

    pub fn stop(&self) {
        let mut core = self.core.lock();
        core.lens.stop();
        info!("[AIQ-ENGINE] Stopped");
    }

    /// Run one control iteration for `request_id`
    ///
    /// # Arguments
    /// * `request_id` - Caller-assigned request id, drives cadence and replay decisions
    /// * `applying_sequence` - Frame the caller wants the result on; `None` lets the sensor
    ///   predict it
    ///
    /// # Returns
    /// The iteration outcome. `effective_sequence` is read from the newest committed result
    /// even when the iteration failed.
    pub fn run_iteration(
        &self,
        request_id: RequestId,
        applying_sequence: Option<Sequence>,
    ) -> IterationOutcome {
        self.core.lock().run_iteration(request_id, applying_sequence)
    }

    pub fn handle_sof_event(&self, event: &SofEvent) {
        let mut core = self.core.lock();
        trace!("[AIQ-ENGINE] SOF seq={} ts={}", event.sequence, event.timestamp);
        core.sensor.handle_sof_event(event);
        core.lens.handle_sof_event(event);
    }

    /// Request whose result was committed on `sequence`
    pub fn request_id_for(&self, sequence: Sequence) -> Option<RequestId> {
        self.core.lock().correlator.request_id_for(sequence)
    }

    /// Request whose computation `request_id` replayed
    pub fn executed_request_for(&self, request_id: RequestId) -> Option<RequestId> {
        self.core.lock().correlator.executed_request_for(request_id)
    }

    pub fn result_store(&self) -> Arc<ResultStore> {
        Arc::clone(&self.core.lock().store)
    }

    pub fn is_first_run(&self) -> bool {
        self.core.lock().first_run
    }

    /// Snapshot used by the last prepared iteration
    pub fn current_parameter(&self) -> AiqParam {
        self.core.lock().param.clone()
    }

    pub fn config(&self) -> EngineConfig {
        self.core.lock().config.clone()
    }
}

impl SofListener for ControlLoopEngine {
    fn handle_sof_event(&self, event: &SofEvent) {
        ControlLoopEngine::handle_sof_event(self, event);
    }
}

impl std::fmt::Debug for ControlLoopEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core.lock();
        f.debug_struct("ControlLoopEngine")
            .field("config", &core.config)
            .field("first_run", &core.first_run)
            .field("latest_sequence", &core.store.latest_sequence())
            .finish_non_exhaustive()
    }
}
