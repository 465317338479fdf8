// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::ConfigFile;
use crate::errors::{MosaicError, Result};
use crate::slot::MosaicMode;

/// Smallest stall timeout we accept. Below this the supervision loop would
/// spin and every jitter hiccup would flap the surface.
pub const MIN_STALL_TIMEOUT_MS: u64 = 100;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one slot
/// - `stall_timeout_ms` is at least [`MIN_STALL_TIMEOUT_MS`]
/// - `initial_mode` parses to a known mode
/// - the SRT endpoint is non-empty and carries the `srt://` scheme
/// - every slot has a non-empty stream id
/// - no two slots share a UDP port
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_slots(cfg)?;
    validate_global_config(cfg)?;
    validate_endpoint(cfg)?;
    validate_slots(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> MosaicError {
    MosaicError::Config(msg.into())
}

fn ensure_has_slots(cfg: &ConfigFile) -> Result<()> {
    if cfg.slots.is_empty() {
        return Err(config_error(
            "config must contain at least one [[slot]] section",
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &ConfigFile) -> Result<()> {
    if cfg.config.stall_timeout_ms < MIN_STALL_TIMEOUT_MS {
        return Err(config_error(format!(
            "[config].stall_timeout_ms must be >= {} (got {})",
            MIN_STALL_TIMEOUT_MS, cfg.config.stall_timeout_ms
        )));
    }

    cfg.config
        .initial_mode
        .parse::<MosaicMode>()
        .map_err(|e| config_error(format!("invalid [config].initial_mode: {e}")))?;

    Ok(())
}

fn validate_endpoint(cfg: &ConfigFile) -> Result<()> {
    let endpoint = cfg.stream.endpoint.trim();
    if endpoint.is_empty() {
        return Err(config_error("[stream].endpoint must not be empty"));
    }
    if !endpoint.starts_with("srt://") {
        return Err(config_error(format!(
            "[stream].endpoint must use the srt:// scheme (got '{}')",
            endpoint
        )));
    }
    Ok(())
}

fn validate_slots(cfg: &ConfigFile) -> Result<()> {
    let mut seen_ports = HashSet::new();

    for (index, slot) in cfg.slots.iter().enumerate() {
        if slot.stream_id.trim().is_empty() {
            return Err(config_error(format!(
                "slot {} has an empty stream_id",
                index + 1
            )));
        }
        if !seen_ports.insert(slot.udp_port) {
            return Err(config_error(format!(
                "slot {} reuses UDP port {}; ports must be unique per slot",
                index + 1,
                slot.udp_port
            )));
        }
    }

    Ok(())
}
