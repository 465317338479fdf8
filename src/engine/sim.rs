// src/engine/sim.rs

//! Tick-driven engine for the harness binary.
//!
//! Wraps [`MockEngine`] and, whenever a pipeline is driven to `Playing`,
//! spawns a feeder task that delivers one buffer per frame interval until
//! the pipeline stops or is released. Feeds whose descriptor matches a
//! configured "dead" substring never get a feeder, so their slots stall
//! and fall back to the placeholder. That makes the failure path
//! observable from the command line.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::surface::{HeadlessHost, VisualId};

use super::{BufferProbe, BuildError, ElementId, MediaEngine, MockEngine, PipelineId, PipelineState};

pub struct SimEngine {
    mock: Arc<MockEngine>,
    frame_interval: Duration,
    dead: Vec<String>,
}

impl SimEngine {
    pub fn new(host: Arc<HeadlessHost>, frame_interval: Duration, dead: Vec<String>) -> Self {
        Self {
            mock: Arc::new(MockEngine::new(host)),
            frame_interval,
            dead,
        }
    }

    fn is_dead(&self, descriptor: &str) -> bool {
        self.dead.iter().any(|needle| descriptor.contains(needle))
    }
}

impl MediaEngine for SimEngine {
    fn build(&self, descriptor: &str) -> Result<PipelineId, BuildError> {
        self.mock.build(descriptor)
    }

    fn set_state(&self, pipeline: PipelineId, state: PipelineState) {
        self.mock.set_state(pipeline, state);

        if state != PipelineState::Playing {
            return;
        }

        let descriptor = self.mock.descriptor_of(pipeline).unwrap_or_default();
        if self.is_dead(&descriptor) {
            info!(?pipeline, "feed marked dead; no buffers will be delivered");
            return;
        }

        let mock = Arc::clone(&self.mock);
        let interval = self.frame_interval;
        tokio::spawn(async move {
            debug!(?pipeline, "feeder started");
            loop {
                sleep(interval).await;
                if mock.state_of(pipeline) != Some(PipelineState::Playing) {
                    break;
                }
                mock.pulse(pipeline);
            }
            debug!(?pipeline, "feeder stopped");
        });
    }

    fn find_element(&self, pipeline: PipelineId, name: &str) -> Option<ElementId> {
        self.mock.find_element(pipeline, name)
    }

    fn bound_visual(&self, element: ElementId) -> Option<VisualId> {
        self.mock.bound_visual(element)
    }

    fn observe_buffers(&self, element: ElementId, probe: BufferProbe) {
        self.mock.observe_buffers(element, probe);
    }

    fn release(&self, pipeline: PipelineId) {
        self.mock.release(pipeline);
    }
}
