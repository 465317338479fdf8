#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use mosaicwatch::config::{ConfigFile, ConfigSection, SlotConfig, StreamSection};
use mosaicwatch::engine::{MediaEngine, MockEngine};
use mosaicwatch::runtime::RuntimeEvent;
use mosaicwatch::slot::{Slot, SlotId};
use mosaicwatch::surface::HeadlessHost;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: ConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: ConfigFile {
                config: ConfigSection::default(),
                stream: StreamSection::default(),
                slots: Vec::new(),
            },
        }
    }

    pub fn with_slot(mut self, stream_id: &str, udp_port: u16) -> Self {
        self.config.slots.push(SlotConfig {
            stream_id: stream_id.to_string(),
            udp_port,
        });
        self
    }

    pub fn with_stall_timeout_ms(mut self, ms: u64) -> Self {
        self.config.config.stall_timeout_ms = ms;
        self
    }

    pub fn with_initial_mode(mut self, mode: &str) -> Self {
        self.config.config.initial_mode = mode.to_string();
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.config.stream.endpoint = endpoint.to_string();
        self
    }

    pub fn build(self) -> ConfigFile {
        self.config
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One slot wired to a scriptable engine and an inspectable host.
pub struct SlotHarness {
    pub host: Arc<HeadlessHost>,
    pub engine: Arc<MockEngine>,
    pub events_rx: mpsc::Receiver<RuntimeEvent>,
    pub slot: Slot,
}

/// Build a [`SlotHarness`] with the given stall timeout.
///
/// Must be called from within a tokio runtime (the slot's watchdog spawns
/// its supervision task there on the first mode selection).
pub fn slot_harness(stall_timeout: Duration) -> SlotHarness {
    let host = Arc::new(HeadlessHost::default());
    let engine = Arc::new(MockEngine::new(Arc::clone(&host)));
    let (events_tx, events_rx) = mpsc::channel::<RuntimeEvent>(64);

    let dyn_engine: Arc<dyn MediaEngine> = Arc::clone(&engine) as Arc<dyn MediaEngine>;
    let slot = Slot::new(
        SlotId(0),
        dyn_engine,
        Arc::clone(&host) as Arc<dyn mosaicwatch::surface::SurfaceHost>,
        "srt://127.0.0.1:9000".to_string(),
        stall_timeout,
        events_tx,
    );

    SlotHarness {
        host,
        engine,
        events_rx,
        slot,
    }
}
