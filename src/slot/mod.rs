// src/slot/mod.rs

//! Slot supervision.
//!
//! - [`supervisor`] owns the per-slot state machine: one pipeline, one
//!   surface and one watchdog, replaced together on every mode selection.
//! - [`registry`] holds the fixed array of slots and applies a mosaic-wide
//!   mode to each of them in turn.

pub mod registry;
pub mod supervisor;

use std::fmt;
use std::str::FromStr;

pub use registry::SlotRegistry;
pub use supervisor::{Slot, SlotState};

/// Index of a display position within the mosaic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub usize);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot{}", self.0 + 1)
    }
}

/// The three pipeline descriptor families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// SRT source addressed by stream id.
    Srt,
    /// UDP/RTP with normal latency behaviour.
    UdpSafe,
    /// UDP/RTP tuned for minimal latency; surface fallback disabled.
    UdpFast,
}

/// What the whole mosaic should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosaicMode {
    Stream(StreamMode),
    BlackScreen,
}

impl FromStr for MosaicMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "srt" | "mosaic" => Ok(MosaicMode::Stream(StreamMode::Srt)),
            "safe" | "udp-safe" => Ok(MosaicMode::Stream(StreamMode::UdpSafe)),
            "fast" | "udp-fast" => Ok(MosaicMode::Stream(StreamMode::UdpFast)),
            "black" => Ok(MosaicMode::BlackScreen),
            other => Err(format!(
                "invalid mode: {other} (expected \"srt\", \"safe\", \"fast\" or \"black\")"
            )),
        }
    }
}
