// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod runtime;
pub mod slot;
pub mod surface;
pub mod watchdog;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{MediaEngine, SimEngine};
use crate::runtime::{Runtime, RuntimeEvent};
use crate::slot::{MosaicMode, SlotRegistry};
use crate::surface::HeadlessHost;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the simulated engine and headless surface host
/// - the slot registry and control runtime
/// - Ctrl-C handling and the optional run-for timer
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let initial_mode: MosaicMode = match args.mode {
        Some(arg) => arg.into(),
        None => cfg.config.initial_mode.parse().map_err(|e: String| anyhow!(e))?,
    };

    let host = Arc::new(HeadlessHost::default());
    let engine: Arc<dyn MediaEngine> = Arc::new(SimEngine::new(
        Arc::clone(&host),
        Duration::from_millis(args.frame_interval_ms),
        args.dead.clone(),
    ));

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let mut registry = SlotRegistry::from_config(&cfg, engine, host, rt_tx.clone());
    let handles = registry.surface_handles();
    info!(slots = handles.len(), "mosaic surfaces created");

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    // Optional bounded run, mainly for soak-testing the failure paths.
    if let Some(secs) = args.run_for {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            info!(secs, "run-for timer elapsed, requesting shutdown");
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    // Seed the initial mode selection.
    info!(?initial_mode, "selecting initial mode");
    rt_tx
        .send(RuntimeEvent::ModeChangeRequested { mode: initial_mode })
        .await?;

    let runtime = Runtime::new(registry, rt_rx);
    runtime.run().await
}

/// Simple dry-run output: print the slot plan without building anything.
fn print_dry_run(cfg: &ConfigFile) {
    println!("mosaicwatch dry-run");
    println!("  config.stall_timeout_ms = {}", cfg.config.stall_timeout_ms);
    println!("  config.initial_mode = {}", cfg.config.initial_mode);
    println!("  stream.endpoint = {}", cfg.stream.endpoint);
    println!();

    println!("slots ({}):", cfg.slots.len());
    for (index, slot) in cfg.slots.iter().enumerate() {
        println!("  - slot{}", index + 1);
        println!("      stream_id: {}", slot.stream_id);
        println!("      udp_port: {}", slot.udp_port);
    }
}
