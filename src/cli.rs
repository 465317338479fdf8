// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::slot::{MosaicMode, StreamMode};

/// Command-line arguments for `mosaicwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mosaicwatch",
    version,
    about = "Supervise a mosaic of media ingestion pipelines and degrade stalled feeds to a placeholder.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Mosaicwatch.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Mosaicwatch.toml")]
    pub config: String,

    /// Mode to select at startup (overrides `initial_mode` from the config).
    #[arg(long, value_enum, value_name = "MODE")]
    pub mode: Option<ModeArg>,

    /// Run for this many seconds, then shut every slot down and exit.
    ///
    /// Without this flag the process runs until Ctrl-C.
    #[arg(long, value_name = "SECS")]
    pub run_for: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MOSAICWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the slot plan, but don't build any pipelines.
    #[arg(long)]
    pub dry_run: bool,

    /// Starve simulated feeds whose descriptor contains this substring.
    ///
    /// May be given multiple times. Starved feeds never deliver a buffer, so
    /// their slots fall back to the placeholder after the stall timeout.
    #[arg(long, value_name = "SUBSTR")]
    pub dead: Vec<String>,

    /// Interval between simulated buffer deliveries, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 33)]
    pub frame_interval_ms: u64,
}

/// Mosaic mode as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum ModeArg {
    /// SRT mosaic (one stream id per slot).
    Srt,
    /// UDP/RTP with normal latency.
    Safe,
    /// UDP/RTP with minimal latency; surface fallback is disabled.
    Fast,
    /// Placeholder on every slot, no pipelines.
    Black,
}

impl From<ModeArg> for MosaicMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Srt => MosaicMode::Stream(StreamMode::Srt),
            ModeArg::Safe => MosaicMode::Stream(StreamMode::UdpSafe),
            ModeArg::Fast => MosaicMode::Stream(StreamMode::UdpFast),
            ModeArg::Black => MosaicMode::BlackScreen,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
