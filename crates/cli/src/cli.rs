//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// PBM Streamer - Perspective-based mirror geometry and frame streaming
#[derive(Parser, Debug)]
#[command(
    name = "pbm-streamer",
    author,
    version,
    about = "Perspective-based mirror streaming pipeline",
    long_about = "Drives the perspective-based mirror pipeline: per-tick mirror \n\
                  geometry (validity, focal-length compensation, perspective-correct \n\
                  UVs) for every registered capturer, and a framed pub/sub stream of \n\
                  captured frames, stream size, and calibration."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "PBM_STREAMER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "PBM_STREAMER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the mirror streaming pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "PBM_STREAMER_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the pub/sub port from configuration
    #[arg(long, env = "PBM_PORT")]
    pub port: Option<u16>,

    /// Maximum number of ticks to run (0 = unlimited)
    #[arg(long, default_value = "0", env = "PBM_STREAMER_MAX_TICKS")]
    pub max_ticks: u64,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "PBM_STREAMER_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running the pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Render/publish tick rate in Hz
    #[arg(long, default_value = "30", env = "PBM_STREAMER_TICK_RATE")]
    pub tick_rate: u32,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "PBM_STREAMER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detailed capturer information
    #[arg(long)]
    pub capturers: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
