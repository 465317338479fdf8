// src/engine/mock.rs

//! Scriptable in-memory engine.
//!
//! Used wherever a real media stack would be wired in: tests script build
//! failures, missing visuals and buffer arrivals, then inspect what the
//! supervisor asked the engine to do. Buffer delivery is manual via
//! [`MockEngine::pulse`] / [`MockEngine::pulse_all`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::surface::{HeadlessHost, SurfaceHost, VisualId};

use super::{BufferProbe, BuildError, ElementId, MediaEngine, PipelineId, PipelineState};

pub struct MockEngine {
    host: Arc<HeadlessHost>,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    fail_matching: Vec<String>,
    suppress_visuals: bool,
    preparent_visuals: bool,
    pipelines: HashMap<PipelineId, PipelineRecord>,
    built: Vec<String>,
    released: Vec<PipelineId>,
}

struct PipelineRecord {
    descriptor: String,
    state: PipelineState,
    released: bool,
    probe_element: ElementId,
    sink_element: ElementId,
    visual: Option<VisualId>,
    probe: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl Inner {
    fn fresh_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MockEngine {
    /// The engine mints its sink visuals inside the given host, the way a
    /// real sink element lives in the same widget system as the mosaic.
    pub fn new(host: Arc<HeadlessHost>) -> Self {
        Self {
            host,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Make `build` fail for descriptors containing `needle`.
    pub fn fail_descriptors_matching(&self, needle: &str) {
        self.inner
            .lock()
            .unwrap()
            .fail_matching
            .push(needle.to_string());
    }

    pub fn clear_failures(&self) {
        self.inner.lock().unwrap().fail_matching.clear();
    }

    /// Build pipelines whose sink exposes no visual.
    pub fn suppress_visuals(&self, on: bool) {
        self.inner.lock().unwrap().suppress_visuals = on;
    }

    /// Hand over sink visuals already parented into an engine-side
    /// container, to exercise the caller's detach-before-attach path.
    pub fn preparent_visuals(&self, on: bool) {
        self.inner.lock().unwrap().preparent_visuals = on;
    }

    /// Deliver one buffer on the pipeline's observed element. Returns
    /// false when no probe is registered or the pipeline is not playing.
    pub fn pulse(&self, pipeline: PipelineId) -> bool {
        let probe = {
            let inner = self.inner.lock().unwrap();
            match inner.pipelines.get(&pipeline) {
                Some(record) if !record.released && record.state == PipelineState::Playing => {
                    record.probe.clone()
                }
                _ => None,
            }
        };

        // Invoke outside the lock; probes reach into the watchdog counter.
        match probe {
            Some(probe) => {
                probe();
                true
            }
            None => false,
        }
    }

    /// Deliver one buffer on every playing pipeline.
    pub fn pulse_all(&self) {
        let ids: Vec<PipelineId> = {
            let inner = self.inner.lock().unwrap();
            inner.pipelines.keys().copied().collect()
        };
        for id in ids {
            self.pulse(id);
        }
    }

    pub fn built_descriptors(&self) -> Vec<String> {
        self.inner.lock().unwrap().built.clone()
    }

    pub fn released(&self) -> Vec<PipelineId> {
        self.inner.lock().unwrap().released.clone()
    }

    /// Pipelines built and not yet released.
    pub fn live_pipelines(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .pipelines
            .values()
            .filter(|record| !record.released)
            .count()
    }

    pub fn state_of(&self, pipeline: PipelineId) -> Option<PipelineState> {
        let inner = self.inner.lock().unwrap();
        inner
            .pipelines
            .get(&pipeline)
            .filter(|record| !record.released)
            .map(|record| record.state)
    }

    pub fn descriptor_of(&self, pipeline: PipelineId) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .pipelines
            .get(&pipeline)
            .map(|record| record.descriptor.clone())
    }

    pub fn last_pipeline(&self) -> Option<PipelineId> {
        let inner = self.inner.lock().unwrap();
        inner.pipelines.keys().copied().max_by_key(|id| id.0)
    }
}

impl MediaEngine for MockEngine {
    fn build(&self, descriptor: &str) -> Result<PipelineId, BuildError> {
        let (preparent, wants_visual) = {
            let inner = self.inner.lock().unwrap();

            if let Some(needle) = inner
                .fail_matching
                .iter()
                .find(|needle| descriptor.contains(needle.as_str()))
            {
                return Err(BuildError::Malformed(format!(
                    "descriptor matches scripted failure '{needle}'"
                )));
            }

            let suppress = inner.suppress_visuals;
            (inner.preparent_visuals && !suppress, !suppress)
        };

        // Mint the sink visual outside our own lock; the host has its own.
        let visual = if wants_visual {
            let id = self.host.external_visual();
            if preparent {
                let engine_container = self.host.create_container();
                self.host.add_child(engine_container, id);
            }
            Some(id)
        } else {
            None
        };

        let mut inner = self.inner.lock().unwrap();
        let pipeline = PipelineId(inner.fresh_id());
        let probe_element = ElementId(inner.fresh_id());
        let sink_element = ElementId(inner.fresh_id());

        inner.built.push(descriptor.to_string());
        inner.pipelines.insert(
            pipeline,
            PipelineRecord {
                descriptor: descriptor.to_string(),
                state: PipelineState::Stopped,
                released: false,
                probe_element,
                sink_element,
                visual,
                probe: None,
            },
        );

        Ok(pipeline)
    }

    fn set_state(&self, pipeline: PipelineId, state: PipelineState) {
        let mut inner = self.inner.lock().unwrap();
        match inner.pipelines.get_mut(&pipeline) {
            Some(record) if !record.released => record.state = state,
            _ => warn!(?pipeline, "set_state on unknown or released pipeline"),
        }
    }

    fn find_element(&self, pipeline: PipelineId, name: &str) -> Option<ElementId> {
        let inner = self.inner.lock().unwrap();
        let record = inner.pipelines.get(&pipeline).filter(|r| !r.released)?;
        match name {
            super::descriptor::PROBE_ELEMENT => Some(record.probe_element),
            super::descriptor::SINK_ELEMENT => Some(record.sink_element),
            _ => None,
        }
    }

    fn bound_visual(&self, element: ElementId) -> Option<VisualId> {
        let inner = self.inner.lock().unwrap();
        inner
            .pipelines
            .values()
            .find(|record| record.sink_element == element && !record.released)
            .and_then(|record| record.visual)
    }

    fn observe_buffers(&self, element: ElementId, probe: BufferProbe) {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .pipelines
            .values_mut()
            .find(|record| record.probe_element == element && !record.released);
        match record {
            Some(record) => record.probe = Some(Arc::from(probe)),
            None => warn!(?element, "observe_buffers on unknown element"),
        }
    }

    fn release(&self, pipeline: PipelineId) {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        match inner.pipelines.get_mut(&pipeline) {
            Some(record) if !record.released => {
                record.released = true;
                record.state = PipelineState::Stopped;
                record.probe = None;
                inner.released.push(pipeline);
            }
            _ => warn!(?pipeline, "release of unknown or already-released pipeline"),
        }
    }
}
