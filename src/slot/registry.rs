// src/slot/registry.rs

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::ConfigFile;
use crate::engine::MediaEngine;
use crate::runtime::RuntimeEvent;
use crate::surface::{ContainerId, SurfaceHost};

use super::{MosaicMode, Slot, SlotId, StreamMode};

/// Per-slot transport addressing from the config.
#[derive(Debug, Clone)]
struct SlotPlan {
    stream_id: String,
    udp_port: u16,
}

/// The fixed array of slots making up the mosaic.
///
/// Slots are created once and live for the process lifetime; mode changes
/// are applied to each slot in turn, one at a time, so a failure in one
/// slot can never interleave with another slot's rebuild.
pub struct SlotRegistry {
    slots: Vec<Slot>,
    plans: Vec<SlotPlan>,
}

impl SlotRegistry {
    /// Build one slot per `[[slot]]` config entry.
    pub fn from_config(
        cfg: &ConfigFile,
        engine: Arc<dyn MediaEngine>,
        host: Arc<dyn SurfaceHost>,
        events_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        let stall_timeout = cfg.config.stall_timeout();

        let mut slots = Vec::with_capacity(cfg.slots.len());
        let mut plans = Vec::with_capacity(cfg.slots.len());

        for (index, slot_cfg) in cfg.slots.iter().enumerate() {
            slots.push(Slot::new(
                SlotId(index),
                Arc::clone(&engine),
                Arc::clone(&host),
                cfg.stream.endpoint.clone(),
                stall_timeout,
                events_tx.clone(),
            ));
            plans.push(SlotPlan {
                stream_id: slot_cfg.stream_id.clone(),
                udp_port: slot_cfg.udp_port,
            });
        }

        Self { slots, plans }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(id.0)
    }

    pub fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.slots.get_mut(id.0)
    }

    /// Ensure every slot has a container, returning the handles in mosaic
    /// order for the display layer to lay out.
    pub fn surface_handles(&mut self) -> Vec<ContainerId> {
        self.slots.iter_mut().map(Slot::surface_handle).collect()
    }

    /// Rebuild every slot for the given mode, sequentially.
    pub async fn apply_mode(&mut self, mode: MosaicMode) {
        info!(?mode, slots = self.slots.len(), "rebuilding all slot pipelines");

        for (slot, plan) in self.slots.iter_mut().zip(&self.plans) {
            match mode {
                MosaicMode::Stream(StreamMode::Srt) => {
                    slot.select_stream_mode(&plan.stream_id).await;
                }
                MosaicMode::Stream(StreamMode::UdpSafe) => {
                    slot.select_safe_mode(plan.udp_port).await;
                }
                MosaicMode::Stream(StreamMode::UdpFast) => {
                    slot.select_fast_mode(plan.udp_port).await;
                }
                MosaicMode::BlackScreen => {
                    slot.select_black_screen().await;
                }
            }
        }
    }

    /// Route a liveness report to its slot.
    pub fn apply_liveness(&mut self, id: SlotId, stalled: bool, epoch: u64) {
        match self.slot_mut(id) {
            Some(slot) => slot.apply_liveness(stalled, epoch),
            None => warn!(slot = %id, "liveness report for unknown slot"),
        }
    }

    /// Shut every slot down, sequentially.
    pub async fn shutdown(&mut self) {
        for slot in &mut self.slots {
            slot.shutdown().await;
        }
    }
}
