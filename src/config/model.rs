// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// stall_timeout_ms = 5000
/// initial_mode = "srt"
///
/// [stream]
/// endpoint = "srt://127.0.0.1:8080"
///
/// [[slot]]
/// stream_id = "live/stream1"
/// udp_port = 5000
/// ```
///
/// The `[config]` and `[stream]` sections are optional and have reasonable
/// defaults; at least one `[[slot]]` entry is required.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Global behaviour config from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// SRT transport settings from `[stream]`.
    #[serde(default)]
    pub stream: StreamSection,

    /// One entry per display slot, in mosaic order.
    #[serde(default, rename = "slot")]
    pub slots: Vec<SlotConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Width of one liveness window, in milliseconds.
    ///
    /// A feed that delivers no buffer for a full window is considered
    /// stalled; detection latency is between one and two windows.
    #[serde(default = "default_stall_timeout_ms")]
    pub stall_timeout_ms: u64,

    /// Mode selected at startup: `"srt"`, `"safe"`, `"fast"` or `"black"`.
    ///
    /// The `--mode` CLI flag takes precedence when given.
    #[serde(default = "default_initial_mode")]
    pub initial_mode: String,
}

fn default_stall_timeout_ms() -> u64 {
    5000
}

fn default_initial_mode() -> String {
    "srt".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            stall_timeout_ms: default_stall_timeout_ms(),
            initial_mode: default_initial_mode(),
        }
    }
}

impl ConfigSection {
    /// The stall timeout as a [`Duration`].
    pub fn stall_timeout(&self) -> Duration {
        Duration::from_millis(self.stall_timeout_ms)
    }
}

/// `[stream]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamSection {
    /// Base SRT endpoint; per-slot stream ids are appended as a query
    /// parameter when building the SRT descriptor.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    "srt://127.0.0.1:8080".to_string()
}

impl Default for StreamSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

/// One `[[slot]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotConfig {
    /// Stream id used by this slot in SRT mode.
    pub stream_id: String,

    /// UDP port used by this slot in the safe and fast modes.
    pub udp_port: u16,
}
