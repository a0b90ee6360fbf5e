// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Contracts of the collaborators the engine drives.

use aiq_types::{
    AecScene, AiqParam, AlgorithmOutput, AwbResults, ExposureResults, FrameParams, GbceResults,
    MakernoteMode, RequestId, SensorDescriptor, Sequence, Statistics, StatisticsParams,
    StreamConfig, TonemapCurves, TuningMode,
};

use crate::error::EngineResult;
use crate::settings::UserParameters;

/// Numerical 3A solver
///
/// Parameter and statistics setters mutate solver-internal state; the compute calls read it.
/// A failing compute call aborts the iteration; the next iteration starts over.
pub trait AlgorithmCore: Send {
    fn init(&mut self) -> EngineResult<()> {
        Ok(())
    }

    fn deinit(&mut self) {}

    /// Prepare one solver instance per tuning mode
    fn configure(&mut self, tuning_modes: &[TuningMode]) -> EngineResult<()>;

    fn set_sensor_info(&mut self, frame: &FrameParams, descriptor: &SensorDescriptor);

    fn update_parameter(&mut self, param: &AiqParam);

    fn set_statistics(&mut self, params: &StatisticsParams, statistics: &Statistics);

    /// Exposure pass
    fn compute_exposure(&mut self, request_id: RequestId) -> EngineResult<ExposureResults>;

    /// Full pass: white balance, focus and tone curves
    fn compute_full(&mut self, request_id: RequestId) -> EngineResult<AlgorithmOutput>;
}

/// Source of the resolved per-iteration parameter snapshot
pub trait SettingsSource: Send + Sync {
    fn init(&self) -> EngineResult<()> {
        Ok(())
    }

    fn deinit(&self) {}

    fn configure(&self, stream: &StreamConfig, tuning_modes: &[TuningMode]) -> EngineResult<()>;

    fn set_parameters(&self, params: &UserParameters) -> EngineResult<()>;

    /// Fails with `EngineError::Configuration` when no snapshot can be produced
    fn parameter(&self) -> EngineResult<AiqParam>;

    /// Advisory: the exposure solver classified the scene as `scene`
    fn update_pipe_class(&self, scene: AecScene);
}

/// Correlates frame sequences with the requests that produced them
pub trait RequestCorrelator: Send {
    /// `sequence` carries the result of `request_id`
    fn record(&mut self, sequence: Sequence, request_id: RequestId);

    fn request_id_for(&self, sequence: Sequence) -> Option<RequestId>;

    /// `request_id` replayed the result computed for `executed_request_id`
    fn link_request(&mut self, request_id: RequestId, executed_request_id: RequestId);

    fn executed_request_for(&self, request_id: RequestId) -> Option<RequestId>;

    fn reset(&mut self);
}

/// Persists auxiliary capture metadata ("makernote") for a committed frame
pub trait MetadataSink: Send {
    fn save_makernote(&mut self, mode: MakernoteMode, sequence: Sequence, tuning_mode: TuningMode);
}

/// Metadata sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMetadataSink;

impl MetadataSink for NullMetadataSink {
    fn save_makernote(&mut self, _mode: MakernoteMode, _sequence: Sequence, _tuning_mode: TuningMode) {}
}

/// Manual tone-curve operations
pub trait ToneCurveOps: Send {
    fn apply_gamma(&self, gamma: f32, gbce: &mut GbceResults);

    fn apply_srgb(&self, gbce: &mut GbceResults);

    fn apply_rec709(&self, gbce: &mut GbceResults);

    fn apply_curve(&self, curves: &TonemapCurves, gbce: &mut GbceResults);

    /// Compensate white balance for the color cast an explicit curve introduces
    fn apply_awb_gain_for_curve(&self, curves: &TonemapCurves, awb: &mut AwbResults);
}

/// Optional capability attached to a unit (local tone mapping, video stabilization, ...)
///
/// Components listen to statistics; they never influence the control loop directly.
pub trait AuxiliaryComponent: Send {
    fn name(&self) -> &'static str;

    fn init(&mut self) -> EngineResult<()> {
        Ok(())
    }

    fn deinit(&mut self) {}

    fn configure(&mut self, _tuning_modes: &[TuningMode]) -> EngineResult<()> {
        Ok(())
    }

    fn start(&mut self) {}

    fn stop(&mut self) {}

    fn handle_statistics(&mut self, statistics: &Statistics);
}
