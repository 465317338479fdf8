// src/runtime.rs

//! The control loop.
//!
//! Everything that mutates a slot (liveness verdicts from the watchdogs,
//! mosaic-wide mode changes, shutdown) arrives as a [`RuntimeEvent`] on a
//! single channel and is applied here, on one task. Watchdog tasks only
//! produce events; they never touch a pipeline or a surface themselves, so
//! a report can never execute against a slot that is mid-teardown.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::slot::{MosaicMode, SlotId, SlotRegistry};

/// Events sent into the runtime from watchdogs, the orchestrator, or
/// external signals.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// One liveness window verdict for one slot. `epoch` identifies the
    /// watchdog generation that produced it; the slot drops reports from
    /// generations older than its current one.
    Liveness {
        slot: SlotId,
        stalled: bool,
        epoch: u64,
    },
    /// Rebuild every slot for the given mode.
    ModeChangeRequested { mode: MosaicMode },
    ShutdownRequested,
}

/// The control runtime.
///
/// Consumes `RuntimeEvent`s and drives the slot registry; on shutdown it
/// stops and disposes every slot before returning.
pub struct Runtime {
    registry: SlotRegistry,
    events_rx: mpsc::Receiver<RuntimeEvent>,
}

impl Runtime {
    pub fn new(registry: SlotRegistry, events_rx: mpsc::Receiver<RuntimeEvent>) -> Self {
        Self {
            registry,
            events_rx,
        }
    }

    /// Main event loop.
    ///
    /// Runs until a `ShutdownRequested` event arrives or every sender is
    /// gone, then shuts the registry down.
    pub async fn run(mut self) -> Result<()> {
        info!("mosaicwatch runtime started");

        while let Some(event) = self.events_rx.recv().await {
            debug!(?event, "runtime received event");

            match event {
                RuntimeEvent::Liveness {
                    slot,
                    stalled,
                    epoch,
                } => {
                    self.registry.apply_liveness(slot, stalled, epoch);
                }
                RuntimeEvent::ModeChangeRequested { mode } => {
                    self.registry.apply_mode(mode).await;
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping runtime");
                    break;
                }
            }
        }

        self.registry.shutdown().await;
        info!("mosaicwatch runtime exiting");
        Ok(())
    }
}
