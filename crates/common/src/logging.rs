//! Tracing setup.
//!
//! Logs go to stderr (or the configured file) so that CLI output on stdout
//! stays machine-readable.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber. Returns `false` if one was already set.
///
/// `RUST_LOG` takes precedence over `config.level`.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(&config.level));
    let writer = match &config.file {
        Some(path) => file_writer(path).unwrap_or_else(|e| {
            eprintln!("Cannot open log file {}: {e}; logging to stderr", path.display());
            BoxMakeWriter::new(std::io::stderr)
        }),
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let to_file = config.file.is_some();

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(!to_file);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish()).is_ok()
    } else {
        tracing::subscriber::set_global_default(builder.with_target(true).finish()).is_ok()
    };
    if installed {
        tracing::debug!(level = %config.level, json = config.json, to_file, "Logging initialized");
    }
    installed
}

/// Filter for a configured level, falling back to `info` if it does not parse.
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|e| {
        eprintln!("Invalid log level {level:?}: {e}; using info");
        EnvFilter::new("info")
    })
}

fn file_writer(path: &Path) -> std::io::Result<BoxMakeWriter> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BoxMakeWriter::new(Mutex::new(file)))
}
