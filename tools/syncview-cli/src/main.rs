//! SyncView CLI: drive a multi-view session from the terminal.
//!
//! Usage:
//!   syncview simulate [OPTIONS] <STEP>...   Run scripted commands against in-memory streams
//!   syncview markers <DURATION>             Show hour markers for a timeline
//!   syncview clip-name <SOURCE>             Show the export filename for a clip
//!   syncview init-config [--force]          Write a default config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use syncview_common::config::{config_file_path, AppConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "syncview",
    about = "Synchronized playback of many video streams on one timeline",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted session and print its state after every step
    ///
    /// Steps: play, pause, toggle, seek:<secs>, skip:<secs>, forward, back,
    /// hour:<n>, fullscreen, trim, mark:<secs>, click:<x>, reset, select:<i>,
    /// export, export:<i>, wait:<ms>, unready:<i>, fail:<i>:<operation>,
    /// drop:<i>, drift
    Simulate {
        /// Stream sources, one tile each
        #[arg(
            short,
            long,
            value_delimiter = ',',
            default_value = "camera1.mp4,camera2.mp4,camera3.mp4"
        )]
        streams: Vec<String>,

        /// Shared timeline duration (seconds)
        #[arg(short, long, default_value = "3600")]
        duration: f64,

        /// Timeline track width used by click:<x> steps
        #[arg(long, default_value = "1000")]
        track_width: f64,

        /// Emit one JSON object per step instead of text
        #[arg(long)]
        json: bool,

        /// Stop at the first stream or fullscreen failure
        #[arg(long)]
        strict: bool,

        /// Commands to run, in order
        #[arg(required = true)]
        steps: Vec<String>,
    },

    /// Show hour markers for a timeline of the given duration
    Markers {
        /// Timeline duration (seconds)
        duration: f64,
    },

    /// Show the export filename for a stream source
    ClipName {
        /// Stream source URL or path
        source: String,

        /// Trim in-point (seconds)
        #[arg(long)]
        start: Option<f64>,

        /// Trim out-point (seconds)
        #[arg(long)]
        end: Option<f64>,
    },

    /// Write a config file with default values (to --config or the standard location)
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    syncview_common::logging::init_logging(&config.logging);
    // A broken file must not stop `init-config` from replacing it.
    if !matches!(cli.command, Commands::InitConfig { .. }) {
        config.validate()?;
    }

    match cli.command {
        Commands::Simulate {
            streams,
            duration,
            track_width,
            json,
            strict,
            steps,
        } => {
            commands::simulate::run(&config, streams, duration, track_width, json, strict, steps)
                .await
        }
        Commands::Markers { duration } => commands::markers::run(duration),
        Commands::ClipName { source, start, end } => {
            commands::clip_name::run(&config, source, start, end)
        }
        Commands::InitConfig { force } => {
            let path = cli.config.unwrap_or_else(config_file_path);
            commands::init_config::run(&path, force)
        }
    }
}
