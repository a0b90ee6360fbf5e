// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Default settings source: resolves parameter snapshots from user settings.

use aiq_types::{
    AecScene, AfMode, AiqParam, MakernoteMode, SceneMode, StreamConfig, TonemapCurves,
    TonemapMode, TonemapPresetCurve, TuningMode,
};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::collaborators::SettingsSource;
use crate::error::{EngineError, EngineResult};

/// User-facing parameter update
///
/// Only the fields that are `Some` change; everything else keeps its previous value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserParameters {
    pub run3a_cadence: Option<i32>,
    pub scene_mode: Option<SceneMode>,
    pub tonemap_mode: Option<TonemapMode>,
    pub tonemap_gamma: Option<f32>,
    pub tonemap_preset_curve: Option<TonemapPresetCurve>,
    pub tonemap_curves: Option<TonemapCurves>,
    pub makernote_mode: Option<MakernoteMode>,
    pub fps: Option<f32>,
    pub callback_rgbs: Option<bool>,
    pub af_mode: Option<AfMode>,
    pub focus_distance: Option<f32>,
}

impl UserParameters {
    fn validate(&self) -> EngineResult<()> {
        if let Some(fps) = self.fps {
            if !fps.is_finite() || fps <= 0.0 {
                return Err(EngineError::Configuration(format!("invalid fps {}", fps)));
            }
        }
        if let Some(gamma) = self.tonemap_gamma {
            if !gamma.is_finite() || gamma <= 0.0 {
                return Err(EngineError::Configuration(format!(
                    "invalid tonemap gamma {}",
                    gamma
                )));
            }
        }
        Ok(())
    }

    fn merge_into(&self, param: &mut AiqParam) {
        if let Some(cadence) = self.run3a_cadence {
            param.run3a_cadence = cadence;
        }
        if let Some(scene_mode) = self.scene_mode {
            param.scene_mode = scene_mode;
        }
        if let Some(mode) = self.tonemap_mode {
            param.tonemap_mode = mode;
        }
        if let Some(gamma) = self.tonemap_gamma {
            param.tonemap_gamma = gamma;
        }
        if let Some(curve) = self.tonemap_preset_curve {
            param.tonemap_preset_curve = curve;
        }
        if let Some(curves) = &self.tonemap_curves {
            param.tonemap_curves = curves.clone();
        }
        if let Some(mode) = self.makernote_mode {
            param.makernote_mode = mode;
        }
        if let Some(fps) = self.fps {
            param.fps = fps;
        }
        if let Some(callback_rgbs) = self.callback_rgbs {
            param.callback_rgbs = callback_rgbs;
        }
        if let Some(af_mode) = self.af_mode {
            param.af_mode = af_mode;
        }
        if let Some(distance) = self.focus_distance {
            param.focus_distance = distance;
        }
    }
}

#[derive(Debug, Default)]
struct SettingsState {
    initialized: bool,
    stream: Option<StreamConfig>,
    tuning_modes: Vec<TuningMode>,
    param: AiqParam,
}

impl SettingsState {
    fn has_mode(&self, mode: TuningMode) -> bool {
        self.tuning_modes.contains(&mode)
    }

    /// Tuning mode an explicit HDR/ULL scene request pins the pipe to
    fn pin_to_scene(&mut self) {
        let target = match self.param.scene_mode {
            SceneMode::Hdr => TuningMode::VideoHdr,
            SceneMode::Ull => TuningMode::VideoUll,
            _ => return,
        };
        if self.has_mode(target) {
            self.param.tuning_mode = target;
        }
    }
}

/// Settings source backed by the user's parameter updates and the configured stream
#[derive(Debug, Default)]
pub struct AiqSettings {
    state: RwLock<SettingsState>,
}

impl AiqSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tuning_modes(&self) -> Vec<TuningMode> {
        self.state.read().tuning_modes.clone()
    }

    pub fn is_configured(&self) -> bool {
        !self.state.read().tuning_modes.is_empty()
    }
}

impl SettingsSource for AiqSettings {
    fn init(&self) -> EngineResult<()> {
        let mut state = self.state.write();
        state.initialized = true;
        state.param = AiqParam::default();
        Ok(())
    }

    fn deinit(&self) {
        *self.state.write() = SettingsState::default();
    }

    fn configure(&self, stream: &StreamConfig, tuning_modes: &[TuningMode]) -> EngineResult<()> {
        let Some(&first) = tuning_modes.first() else {
            return Err(EngineError::Configuration(
                "no tuning mode for the stream configuration".to_string(),
            ));
        };

        let mut state = self.state.write();
        state.stream = Some(stream.clone());
        state.tuning_modes = tuning_modes.to_vec();
        if !tuning_modes.contains(&state.param.tuning_mode) {
            state.param.tuning_mode = first;
        }
        state.pin_to_scene();
        info!(
            "[AIQ-SETTINGS] Configured {:?} {}x{}, tuning modes {:?}, active {}",
            stream.operation_mode, stream.width, stream.height, tuning_modes, state.param.tuning_mode
        );
        Ok(())
    }

    fn set_parameters(&self, params: &UserParameters) -> EngineResult<()> {
        params.validate()?;
        let mut state = self.state.write();
        params.merge_into(&mut state.param);
        state.pin_to_scene();
        debug!("[AIQ-SETTINGS] Parameters updated: {:?}", params);
        Ok(())
    }

    fn parameter(&self) -> EngineResult<AiqParam> {
        let state = self.state.read();
        if !state.initialized || state.tuning_modes.is_empty() {
            return Err(EngineError::Configuration(
                "settings are not configured".to_string(),
            ));
        }
        Ok(state.param.clone())
    }

    fn update_pipe_class(&self, scene: AecScene) {
        let mut state = self.state.write();
        if !state.has_mode(TuningMode::VideoHdr) || !state.has_mode(TuningMode::VideoUll) {
            return;
        }

        let target = match state.param.scene_mode {
            SceneMode::Auto => match scene {
                AecScene::Hdr => TuningMode::VideoHdr,
                AecScene::Ull => TuningMode::VideoUll,
            },
            SceneMode::Hdr => TuningMode::VideoHdr,
            SceneMode::Ull => TuningMode::VideoUll,
            _ => return,
        };

        if state.param.tuning_mode != target {
            debug!(
                "[AIQ-SETTINGS] Pipe class {:?}: tuning mode {} -> {}",
                scene, state.param.tuning_mode, target
            );
            state.param.tuning_mode = target;
        }
    }
}
