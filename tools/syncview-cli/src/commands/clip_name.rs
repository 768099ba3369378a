//! Show the export filename for a stream source and optional trim range.

use syncview_common::config::AppConfig;
use syncview_transport::export::{base_filename, trimmed_filename};

pub fn run(
    config: &AppConfig,
    source: String,
    start: Option<f64>,
    end: Option<f64>,
) -> anyhow::Result<()> {
    let base = base_filename(&source, &config.export.fallback_filename);
    let filename = match (start, end) {
        (Some(a), Some(b)) => trimmed_filename(&base, a.min(b), a.max(b)),
        (None, None) => base,
        _ => anyhow::bail!("A trim range needs both --start and --end"),
    };
    println!("{filename}");
    Ok(())
}
