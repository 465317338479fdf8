// src/slot/supervisor.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::engine::{descriptor, MediaEngine, PipelineId, PipelineState};
use crate::runtime::RuntimeEvent;
use crate::surface::{ContainerId, Surface, SurfaceHost};
use crate::watchdog::Watchdog;

use super::{SlotId, StreamMode};

/// Lifecycle state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Created, no pipeline selected yet.
    Idle,
    /// A pipeline of the given family is running and its visual is bound.
    Playing(StreamMode),
    /// Showing the placeholder: black screen selected, or the last
    /// selection failed to produce a watchable feed.
    Degraded,
}

/// Supervisor for one display position.
///
/// Owns exactly one pipeline handle, one surface and one watchdog. Mode
/// selection replaces all three as a unit: the watchdog is stopped and
/// joined first, then the pipeline is torn down and rebuilt, then the
/// surface is swapped, then the watchdog is restarted under a new
/// generation. The watchdog never mutates the slot directly; it forwards
/// reports into the runtime channel, and the control loop calls
/// [`Slot::apply_liveness`] with them.
pub struct Slot {
    id: SlotId,
    engine: Arc<dyn MediaEngine>,
    host: Arc<dyn SurfaceHost>,
    srt_endpoint: String,
    state: SlotState,
    watchdog_enabled: bool,
    pipeline: Option<PipelineId>,
    container: Option<ContainerId>,
    surface: Option<Surface>,
    watchdog: Watchdog,
    /// Watchdog generation whose reports are currently valid; reports from
    /// any other generation were queued across a rebuild and are dropped.
    live_epoch: u64,
}

impl Slot {
    pub fn new(
        id: SlotId,
        engine: Arc<dyn MediaEngine>,
        host: Arc<dyn SurfaceHost>,
        srt_endpoint: String,
        stall_timeout: Duration,
        events_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        let watchdog = Watchdog::new(stall_timeout, move |stalled, epoch| {
            // Runs on the watchdog task. Reports are level-triggered, so a
            // send dropped under backpressure is repaired one window later.
            if let Err(err) = events_tx.try_send(RuntimeEvent::Liveness {
                slot: id,
                stalled,
                epoch,
            }) {
                warn!(slot = %id, error = %err, "liveness report dropped");
            }
        });

        Self {
            id,
            engine,
            host,
            srt_endpoint,
            state: SlotState::Idle,
            watchdog_enabled: true,
            pipeline: None,
            container: None,
            surface: None,
            watchdog,
            live_epoch: 0,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn watchdog_enabled(&self) -> bool {
        self.watchdog_enabled
    }

    /// Generation of the currently valid liveness reports.
    pub fn live_epoch(&self) -> u64 {
        self.live_epoch
    }

    /// The visual currently occupying this slot, if a surface is installed.
    pub fn surface_visual(&self) -> Option<crate::surface::VisualId> {
        self.surface.as_ref().map(|s| s.visual())
    }

    pub fn has_live_surface(&self) -> bool {
        self.surface.as_ref().map(Surface::is_live).unwrap_or(false)
    }

    /// The slot's container, creating it together with an initial
    /// placeholder on first use.
    pub fn surface_handle(&mut self) -> ContainerId {
        match self.container {
            Some(container) => container,
            None => {
                let container = self.host.create_container();
                self.container = Some(container);
                self.install_placeholder();
                debug!(slot = %self.id, "container created with initial placeholder");
                container
            }
        }
    }

    /// Switch to the SRT family, addressed by stream id.
    pub async fn select_stream_mode(&mut self, stream_id: &str) {
        let desc = descriptor::srt(&self.srt_endpoint, stream_id);
        self.select_pipeline(desc, StreamMode::Srt, true).await;
    }

    /// Switch to the UDP family with normal latency.
    pub async fn select_safe_mode(&mut self, port: u16) {
        let desc = descriptor::udp_safe(port);
        self.select_pipeline(desc, StreamMode::UdpSafe, true).await;
    }

    /// Switch to the UDP family tuned for minimal latency.
    ///
    /// Liveness reports keep being computed but no longer touch the
    /// surface: at these latencies a hide/show cycle is worse than a few
    /// frozen frames.
    pub async fn select_fast_mode(&mut self, port: u16) {
        let desc = descriptor::udp_fast(port);
        self.select_pipeline(desc, StreamMode::UdpFast, false).await;
    }

    /// Tear the pipeline down and show the placeholder.
    ///
    /// The watchdog is restarted afterwards; with no producer it will
    /// keep asserting a stall, which is inert against a placeholder.
    pub async fn select_black_screen(&mut self) {
        info!(slot = %self.id, "selecting black screen");

        self.watchdog.stop().await;
        self.release_pipeline();
        self.install_placeholder();
        self.restart_watchdog();
        self.state = SlotState::Degraded;
    }

    /// Full stop → teardown → rebuild → start cycle shared by every
    /// pipeline-selecting mode.
    async fn select_pipeline(&mut self, desc: String, mode: StreamMode, watchdog_enabled: bool) {
        info!(slot = %self.id, ?mode, "selecting pipeline");

        self.watchdog_enabled = watchdog_enabled;

        // Ordering is the one correctness-critical rule: the watchdog must
        // be fully joined before pipeline or surface are touched.
        self.watchdog.stop().await;
        self.release_pipeline();

        let pipeline = match self.engine.build(&desc) {
            Ok(pipeline) => pipeline,
            Err(err) => {
                warn!(
                    slot = %self.id,
                    error = %err,
                    "pipeline build failed; degrading to placeholder"
                );
                self.install_placeholder();
                self.restart_watchdog();
                self.state = SlotState::Degraded;
                return;
            }
        };

        self.pipeline = Some(pipeline);

        let live = self.bind_visual(pipeline);
        self.attach_probe(pipeline);
        self.engine.set_state(pipeline, PipelineState::Playing);
        self.restart_watchdog();

        self.state = if live {
            SlotState::Playing(mode)
        } else {
            SlotState::Degraded
        };
    }

    /// Bind the engine's sink visual as the new surface. Returns false and
    /// installs the placeholder when the engine exposes none.
    fn bind_visual(&mut self, pipeline: PipelineId) -> bool {
        let visual = self
            .engine
            .find_element(pipeline, descriptor::SINK_ELEMENT)
            .and_then(|sink| self.engine.bound_visual(sink));

        match visual {
            Some(visual) => {
                self.install_surface(Surface::live(visual));
                true
            }
            None => {
                warn!(
                    slot = %self.id,
                    "engine exposed no bindable visual; degrading to placeholder"
                );
                self.install_placeholder();
                false
            }
        }
    }

    /// Register the watchdog counter as the pipeline's buffer probe.
    fn attach_probe(&mut self, pipeline: PipelineId) {
        match self.engine.find_element(pipeline, descriptor::PROBE_ELEMENT) {
            Some(element) => {
                let counter = self.watchdog.counter();
                self.engine
                    .observe_buffers(element, Box::new(move || counter.notify()));
            }
            None => warn!(
                slot = %self.id,
                "pipeline has no observation point; every window will read as stalled"
            ),
        }
    }

    fn restart_watchdog(&mut self) {
        match self.watchdog.start() {
            Ok(epoch) => self.live_epoch = epoch,
            // Unreachable after a stop(); logged rather than propagated so a
            // monitoring defect can never take the mosaic down.
            Err(err) => error!(slot = %self.id, error = %err, "could not start liveness monitoring"),
        }
    }

    fn release_pipeline(&mut self) {
        if let Some(pipeline) = self.pipeline.take() {
            self.engine.set_state(pipeline, PipelineState::Stopped);
            self.engine.release(pipeline);
            debug!(slot = %self.id, ?pipeline, "pipeline released");
        }
    }

    fn install_placeholder(&mut self) {
        let placeholder = Surface::placeholder(self.host.as_ref());
        self.install_surface(placeholder);
    }

    /// Surface-swap protocol: dispose the old surface, strip any stray
    /// parent off the replacement, attach expand-to-fill, show.
    fn install_surface(&mut self, mut surface: Surface) {
        let container = self.surface_handle();

        if let Some(old) = self.surface.take() {
            old.dispose(self.host.as_ref());
        }

        surface.attach(self.host.as_ref(), container);
        surface.show(self.host.as_ref());
        self.surface = Some(surface);
    }

    /// Apply a liveness report delivered by the control loop.
    ///
    /// Reports from a previous watchdog generation are stale and dropped;
    /// reports against a placeholder or a torn-down slot are no-ops. The
    /// verdict is a level signal, so repeated identical reports land on
    /// already-hidden or already-shown surfaces and change nothing.
    pub fn apply_liveness(&mut self, stalled: bool, epoch: u64) {
        if epoch != self.live_epoch {
            debug!(slot = %self.id, epoch, current = self.live_epoch, "discarding stale liveness report");
            return;
        }

        if !self.watchdog_enabled {
            trace!(slot = %self.id, stalled, "liveness report suppressed");
            return;
        }

        let Some(surface) = &self.surface else {
            return;
        };
        if !surface.is_live() {
            return;
        }

        if stalled {
            debug!(slot = %self.id, "feed stalled; hiding live surface");
            surface.hide(self.host.as_ref());
        } else {
            surface.show(self.host.as_ref());
        }
    }

    /// Stop monitoring, release the pipeline and destroy the surface and
    /// container. The slot returns to `Idle` and can be selected again.
    pub async fn shutdown(&mut self) {
        debug!(slot = %self.id, "shutting down");

        self.watchdog.stop().await;
        self.release_pipeline();

        if let Some(surface) = self.surface.take() {
            surface.dispose(self.host.as_ref());
        }
        if let Some(container) = self.container.take() {
            self.host.destroy_container(container);
        }

        self.state = SlotState::Idle;
    }
}
