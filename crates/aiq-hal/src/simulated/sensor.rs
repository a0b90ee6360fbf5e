// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use aiq_types::{FrameParams, SensorDescriptor, SensorExposure, Sequence, SofEvent, TuningMode};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{HalError, HalResult};
use crate::hal::{SensorActuator, SofHistory};

/// Depth of every record the sensor keeps; older entries fall off first
pub const LOG_DEPTH: usize = 64;

#[derive(Debug, Clone)]
pub struct SimulatedSensorConfig {
    /// Frames between an exposure write and the first frame it affects
    pub exposure_lag: i64,
    pub sof_history: usize,
    pub frame_rate: f32,
    pub frame_params: FrameParams,
    pub descriptor: SensorDescriptor,
}

impl Default for SimulatedSensorConfig {
    fn default() -> Self {
        Self {
            exposure_lag: 2,
            sof_history: 32,
            frame_rate: 30.0,
            frame_params: FrameParams {
                cropped_image_width: 1920,
                cropped_image_height: 1080,
                horizontal_scaling_numerator: 1,
                horizontal_scaling_denominator: 1,
                vertical_scaling_numerator: 1,
                vertical_scaling_denominator: 1,
                ..Default::default()
            },
            descriptor: SensorDescriptor {
                pixel_clock_freq_mhz: 148.5,
                pixel_periods_per_line: 2200,
                line_periods_per_field: 1125,
                line_periods_vertical_blanking: 45,
                coarse_integration_time_min: 1,
                coarse_integration_time_max_margin: 10,
                fine_integration_time_min: 0,
                fine_integration_time_max_margin: 0,
            },
        }
    }
}

/// One `schedule_exposure` call as seen by the sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledExposure {
    pub hint: Option<Sequence>,
    pub landing: Sequence,
    pub exposures: Vec<SensorExposure>,
}

#[derive(Debug)]
struct SensorState {
    config: SimulatedSensorConfig,
    frame_rate: f32,
    sof: SofHistory,
    last_scheduled: Option<Sequence>,
    pending: BTreeMap<Sequence, Vec<SensorExposure>>,
    applied: VecDeque<(Sequence, Vec<SensorExposure>)>,
    schedule_log: VecDeque<ScheduledExposure>,
    wdr_modes: VecDeque<(Sequence, TuningMode)>,
    awb: Option<(f32, f32)>,
    sensor_info_available: bool,
}

impl SensorState {
    fn new(config: SimulatedSensorConfig) -> Self {
        Self {
            frame_rate: config.frame_rate,
            sof: SofHistory::new(config.sof_history),
            config,
            last_scheduled: None,
            pending: BTreeMap::new(),
            applied: VecDeque::with_capacity(LOG_DEPTH),
            schedule_log: VecDeque::with_capacity(LOG_DEPTH),
            wdr_modes: VecDeque::with_capacity(LOG_DEPTH),
            awb: None,
            sensor_info_available: true,
        }
    }

    /// Earliest frame a write issued now can reach.
    fn earliest_landing(&self) -> Option<Sequence> {
        self.sof
            .latest()
            .map(|sof| sof.sequence + self.config.exposure_lag)
    }
}

fn push_bounded<T>(log: &mut VecDeque<T>, entry: T) {
    if log.len() == LOG_DEPTH {
        log.pop_front();
    }
    log.push_back(entry);
}

/// Sensor that lands exposures `exposure_lag` frames after the newest start-of-frame.
///
/// Landing sequences never move backwards: a hint at or below the previous landing is
/// pushed to the next free frame.
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    state: Arc<Mutex<SensorState>>,
}

impl SimulatedSensor {
    pub fn new(config: SimulatedSensorConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SensorState::new(config))),
        }
    }

    pub fn frame_rate(&self) -> f32 {
        self.state.lock().frame_rate
    }

    pub fn last_scheduled(&self) -> Option<Sequence> {
        self.state.lock().last_scheduled
    }

    /// Newest [`LOG_DEPTH`] schedule requests, oldest first
    pub fn schedule_log(&self) -> Vec<ScheduledExposure> {
        self.state.lock().schedule_log.iter().cloned().collect()
    }

    /// Exposures that reached their frame, oldest first
    pub fn applied(&self) -> Vec<(Sequence, Vec<SensorExposure>)> {
        self.state.lock().applied.iter().cloned().collect()
    }

    pub fn wdr_modes(&self) -> Vec<(Sequence, TuningMode)> {
        self.state.lock().wdr_modes.iter().copied().collect()
    }

    pub fn awb(&self) -> Option<(f32, f32)> {
        self.state.lock().awb
    }

    /// Make `sensor_info` fail, as a sensor that has not been probed yet would
    pub fn set_sensor_info_available(&self, available: bool) {
        self.state.lock().sensor_info_available = available;
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new(SimulatedSensorConfig::default())
    }
}

impl SensorActuator for SimulatedSensor {
    fn reset(&mut self) {
        let mut state = self.state.lock();
        state.sof.clear();
        state.last_scheduled = None;
        state.pending.clear();
        state.applied.clear();
        debug!("[SENSOR] Reset");
    }

    fn set_frame_rate(&mut self, fps: f32) -> HalResult<()> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(HalError::InvalidFrameRate(fps));
        }
        self.state.lock().frame_rate = fps;
        debug!("[SENSOR] Frame rate set to {}", fps);
        Ok(())
    }

    fn sensor_info(&mut self) -> HalResult<(FrameParams, SensorDescriptor)> {
        let state = self.state.lock();
        if !state.sensor_info_available {
            return Err(HalError::SensorInfoUnavailable(
                "sensor has not been probed".to_string(),
            ));
        }
        Ok((state.config.frame_params, state.config.descriptor))
    }

    fn schedule_exposure(
        &mut self,
        exposures: &[SensorExposure],
        applying_sequence: Option<Sequence>,
    ) -> Sequence {
        let mut state = self.state.lock();

        let predicted = state
            .last_scheduled
            .map(|last| last + 1)
            .or_else(|| state.earliest_landing())
            .unwrap_or(0);
        let mut landing = applying_sequence.unwrap_or(predicted);
        if let Some(earliest) = state.earliest_landing() {
            landing = landing.max(earliest);
        }
        if let Some(last) = state.last_scheduled {
            landing = landing.max(last + 1);
        }

        trace!(
            "[SENSOR] Scheduled {} exposure(s) hint={:?} landing={}",
            exposures.len(),
            applying_sequence,
            landing
        );
        state.last_scheduled = Some(landing);
        state.pending.insert(landing, exposures.to_vec());
        // Without start-of-frame events nothing drains; the oldest writes are overwritten.
        while state.pending.len() > LOG_DEPTH {
            state.pending.pop_first();
        }
        push_bounded(
            &mut state.schedule_log,
            ScheduledExposure {
                hint: applying_sequence,
                landing,
                exposures: exposures.to_vec(),
            },
        );
        landing
    }

    fn sof_timestamp(&self, sequence: Sequence) -> Option<u64> {
        self.state.lock().sof.timestamp_for(sequence)
    }

    fn exposure_applied_delay(&self) -> u32 {
        let state = self.state.lock();
        match (state.last_scheduled, state.earliest_landing()) {
            (Some(last), Some(earliest)) => u32::try_from(last - earliest).unwrap_or(0),
            _ => 0,
        }
    }

    fn set_wdr_mode(&mut self, mode: TuningMode, sequence: Sequence) {
        push_bounded(&mut self.state.lock().wdr_modes, (sequence, mode));
    }

    fn set_awb(&mut self, r_per_g: f32, b_per_g: f32) {
        self.state.lock().awb = Some((r_per_g, b_per_g));
    }

    fn handle_sof_event(&mut self, event: &SofEvent) {
        let mut state = self.state.lock();
        state.sof.record(*event);

        let remaining = state.pending.split_off(&(event.sequence + 1));
        let reached = std::mem::replace(&mut state.pending, remaining);
        for entry in reached {
            push_bounded(&mut state.applied, entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exposure(gain: f32) -> SensorExposure {
        SensorExposure {
            real_digital_gain: gain,
            ..Default::default()
        }
    }

    #[test]
    fn test_hint_is_honoured_when_reachable() {
        let mut sensor = SimulatedSensor::default();
        assert_eq!(sensor.schedule_exposure(&[exposure(1.0)], Some(5)), 5);
        assert_eq!(sensor.schedule_exposure(&[exposure(1.0)], Some(9)), 9);
    }

    #[test]
    fn test_landing_never_moves_backwards() {
        let mut sensor = SimulatedSensor::default();
        assert_eq!(sensor.schedule_exposure(&[], Some(5)), 5);
        assert_eq!(sensor.schedule_exposure(&[], Some(5)), 6);
        assert_eq!(sensor.schedule_exposure(&[], Some(2)), 7);
        assert_eq!(sensor.schedule_exposure(&[], None), 8);
    }

    #[test]
    fn test_landing_respects_exposure_lag() {
        let mut sensor = SimulatedSensor::default();
        sensor.handle_sof_event(&SofEvent::new(10, 1000));
        assert_eq!(sensor.schedule_exposure(&[], Some(10)), 12);
        assert_eq!(sensor.exposure_applied_delay(), 0);
        assert_eq!(sensor.schedule_exposure(&[], Some(20)), 20);
        assert_eq!(sensor.exposure_applied_delay(), 8);
    }

    #[test]
    fn test_first_prediction_without_events() {
        let mut sensor = SimulatedSensor::default();
        assert_eq!(sensor.schedule_exposure(&[], None), 0);
    }

    #[test]
    fn test_sof_moves_pending_to_applied() {
        let mut sensor = SimulatedSensor::default();
        sensor.schedule_exposure(&[exposure(2.0)], Some(3));
        sensor.schedule_exposure(&[exposure(3.0)], Some(4));
        sensor.handle_sof_event(&SofEvent::new(3, 300));

        let applied = sensor.applied();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].0, 3);
        assert_eq!(applied[0].1[0].real_digital_gain, 2.0);
        assert_eq!(sensor.sof_timestamp(3), Some(300));
        assert_eq!(sensor.sof_timestamp(4), None);
    }

    #[test]
    fn test_records_stay_bounded_without_events() {
        let mut sensor = SimulatedSensor::default();
        for sequence in 0..200 {
            sensor.schedule_exposure(&[exposure(1.0)], None);
            sensor.set_wdr_mode(TuningMode::VideoHdr, sequence);
        }

        let log = sensor.schedule_log();
        assert_eq!(log.len(), LOG_DEPTH);
        assert_eq!(log[0].landing, 200 - LOG_DEPTH as i64);
        assert_eq!(log[LOG_DEPTH - 1].landing, 199);
        assert_eq!(sensor.wdr_modes().len(), LOG_DEPTH);
        assert_eq!(sensor.state.lock().pending.len(), LOG_DEPTH);

        sensor.handle_sof_event(&SofEvent::new(199, 1_000));
        let applied = sensor.applied();
        assert_eq!(applied.len(), LOG_DEPTH);
        assert_eq!(applied[0].0, 200 - LOG_DEPTH as i64);
    }

    #[test]
    fn test_handle_shares_state() {
        let sensor = SimulatedSensor::default();
        let mut boxed: Box<dyn SensorActuator> = Box::new(sensor.clone());
        boxed.set_awb(1.5, 0.8);
        boxed.set_frame_rate(60.0).unwrap();
        assert_eq!(sensor.awb(), Some((1.5, 0.8)));
        assert_eq!(sensor.frame_rate(), 60.0);
        assert!(boxed.set_frame_rate(0.0).is_err());
    }

    #[test]
    fn test_sensor_info_can_be_withheld() {
        let mut sensor = SimulatedSensor::default();
        assert!(sensor.sensor_info().is_ok());
        sensor.set_sensor_info_available(false);
        assert!(matches!(
            sensor.sensor_info(),
            Err(HalError::SensorInfoUnavailable(_))
        ));
    }
}
