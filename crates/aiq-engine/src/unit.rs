// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lifecycle wrapper around the settings source, the engine and auxiliary components.

use std::sync::Arc;

use aiq_result_store::ResultStore;
use aiq_types::{RequestId, Sequence, SofEvent, Statistics, StreamConfig};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::collaborators::{AuxiliaryComponent, SettingsSource};
use crate::engine::{Collaborators, ControlLoopEngine, EngineConfig, SofListener};
use crate::error::{EngineError, EngineResult};
use crate::settings::UserParameters;
use crate::state::IterationOutcome;

/// Lifecycle state of an [`AiqUnit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitState {
    NotInit,
    Init,
    Configured,
    Start,
    Stop,
}

struct UnitInner {
    state: UnitState,
    /// The algorithm core keeps its per-mode instances across reconfiguration
    algorithm_configured: bool,
    components: Vec<Box<dyn AuxiliaryComponent>>,
}

/// One camera's 3A unit
///
/// ```text
/// NotInit -init-> Init -configure-> Configured -start-> Start -stop-> Stop
///                                         ^                           |
///                                         +--------configure----------+
/// ```
pub struct AiqUnit {
    inner: Mutex<UnitInner>,
    settings: Arc<dyn SettingsSource>,
    store: Arc<ResultStore>,
    engine: Arc<ControlLoopEngine>,
}

impl AiqUnit {
    pub fn new(config: EngineConfig, store: Arc<ResultStore>, collaborators: Collaborators) -> Self {
        let settings = Arc::clone(&collaborators.settings);
        Self {
            inner: Mutex::new(UnitInner {
                state: UnitState::NotInit,
                algorithm_configured: false,
                components: Vec::new(),
            }),
            settings,
            store: Arc::clone(&store),
            engine: Arc::new(ControlLoopEngine::new(config, store, collaborators)),
        }
    }

    /// Attach an optional capability; it follows the unit's lifecycle from then on
    pub fn with_component(self, component: impl AuxiliaryComponent + 'static) -> Self {
        self.inner.lock().components.push(Box::new(component));
        self
    }

    pub fn state(&self) -> UnitState {
        self.inner.lock().state
    }

    pub fn init(&self) -> EngineResult<()> {
        let mut inner = self.inner.lock();

        if let Err(err) = self.settings.init() {
            self.settings.deinit();
            return Err(err);
        }

        if inner.state == UnitState::NotInit {
            if let Err(err) = self.engine.init() {
                error!("[AIQ-UNIT] Engine init failed: {}", err);
                self.engine.deinit();
                return Err(err);
            }
            for component in inner.components.iter_mut() {
                component.init().map_err(|err| component_error(component.name(), err))?;
            }
        }

        inner.state = UnitState::Init;
        info!("[AIQ-UNIT] Initialized");
        Ok(())
    }

    pub fn deinit(&self) {
        let mut inner = self.inner.lock();
        self.deinit_locked(&mut inner);
    }

    fn deinit_locked(&self, inner: &mut UnitInner) {
        for component in inner.components.iter_mut() {
            component.deinit();
        }
        self.engine.deinit();
        self.settings.deinit();
        inner.algorithm_configured = false;
        inner.state = UnitState::NotInit;
        info!("[AIQ-UNIT] Deinitialized");
    }

    pub fn configure(&self, stream: &StreamConfig) -> EngineResult<()> {
        let mut inner = self.inner.lock();
        if !matches!(inner.state, UnitState::Init | UnitState::Stop) {
            warn!("[AIQ-UNIT] configure in wrong state {:?}", inner.state);
            return Err(EngineError::InvalidState {
                operation: "configure",
                state: inner.state,
            });
        }

        let tuning_modes = stream.operation_mode.tuning_modes();
        if !inner.algorithm_configured {
            self.engine.configure(&tuning_modes)?;
            inner.algorithm_configured = true;
        }

        self.settings.configure(stream, &tuning_modes)?;

        for component in inner.components.iter_mut() {
            component
                .configure(&tuning_modes)
                .map_err(|err| component_error(component.name(), err))?;
        }

        inner.state = UnitState::Configured;
        info!(
            "[AIQ-UNIT] Configured {:?} with tuning modes {:?}",
            stream.operation_mode, tuning_modes
        );
        Ok(())
    }

    pub fn start(&self) -> EngineResult<()> {
        let mut inner = self.inner.lock();
        if !matches!(inner.state, UnitState::Configured | UnitState::Stop) {
            warn!("[AIQ-UNIT] start in wrong state {:?}", inner.state);
            return Err(EngineError::InvalidState {
                operation: "start",
                state: inner.state,
            });
        }

        for component in inner.components.iter_mut() {
            component.start();
        }
        self.engine.start()?;

        inner.state = UnitState::Start;
        info!("[AIQ-UNIT] Started");
        Ok(())
    }

    pub fn stop(&self) {
        let mut inner = self.inner.lock();
        self.stop_locked(&mut inner);
    }

    fn stop_locked(&self, inner: &mut UnitInner) {
        if inner.state == UnitState::Start {
            self.engine.stop();
            for component in inner.components.iter_mut() {
                component.stop();
            }
        }
        inner.state = UnitState::Stop;
        info!("[AIQ-UNIT] Stopped");
    }

    /// Run one control iteration; only legal while started
    ///
    /// The unit lock covers the state check only, so statistics keep flowing while the
    /// algorithm computes.
    pub fn run_iteration(
        &self,
        request_id: RequestId,
        applying_sequence: Option<Sequence>,
    ) -> EngineResult<IterationOutcome> {
        {
            let inner = self.inner.lock();
            if inner.state != UnitState::Start {
                warn!("[AIQ-UNIT] run_iteration while not started: {:?}", inner.state);
                return Err(EngineError::InvalidState {
                    operation: "run_iteration",
                    state: inner.state,
                });
            }
        }

        let outcome = self.engine.run_iteration(request_id, applying_sequence);
        if let Some(err) = &outcome.error {
            debug!("[AIQ-UNIT] request {} failed: {}", request_id, err);
        }
        Ok(outcome)
    }

    pub fn set_parameters(&self, params: &UserParameters) -> EngineResult<()> {
        let _inner = self.inner.lock();
        self.settings.set_parameters(params)
    }

    /// Forward a start-of-frame event to the engine
    pub fn handle_sof_event(&self, event: &SofEvent) {
        self.engine.handle_sof_event(event);
    }

    /// Listener to register with the start-of-frame event source
    pub fn sof_listener(&self) -> Arc<dyn SofListener> {
        Arc::clone(&self.engine) as Arc<dyn SofListener>
    }

    /// Publish a statistics record: auxiliary components see it first, then the store
    pub fn dispatch_statistics(&self, statistics: Statistics) -> EngineResult<()> {
        {
            let mut inner = self.inner.lock();
            for component in inner.components.iter_mut() {
                component.handle_statistics(&statistics);
            }
        }
        self.store.publish_statistics(statistics)?;
        Ok(())
    }

    pub fn component_names(&self) -> Vec<&'static str> {
        self.inner
            .lock()
            .components
            .iter()
            .map(|component| component.name())
            .collect()
    }

    pub fn engine(&self) -> &Arc<ControlLoopEngine> {
        &self.engine
    }

    pub fn result_store(&self) -> Arc<ResultStore> {
        Arc::clone(&self.store)
    }
}

impl Drop for AiqUnit {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        if inner.state == UnitState::Start {
            self.stop_locked(&mut inner);
        }
        if inner.state != UnitState::NotInit {
            self.deinit_locked(&mut inner);
        }
    }
}

fn component_error(name: &'static str, err: EngineError) -> EngineError {
    match err {
        EngineError::Component { .. } => err,
        other => EngineError::Component {
            name,
            reason: other.to_string(),
        },
    }
}

impl std::fmt::Debug for AiqUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiqUnit")
            .field("state", &self.state())
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
