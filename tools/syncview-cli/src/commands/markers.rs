//! Show hour markers for a timeline.

use syncview_session_model::{format_clock, hour_markers, MAX_HOUR_MARKERS, SECS_PER_HOUR};
use syncview_transport::ensure_timeline;

pub fn run(duration: f64) -> anyhow::Result<()> {
    let duration = ensure_timeline(duration)?;
    let markers = hour_markers(duration);

    println!("Timeline: {} ({} hour marker(s))", format_clock(duration), markers.len());
    if duration > f64::from(MAX_HOUR_MARKERS) * SECS_PER_HOUR {
        println!("  (only the first {MAX_HOUR_MARKERS} hours are marked)");
    }
    for marker in &markers {
        println!(
            "  {:>3}h  {:>6.2}%  seek to {}",
            marker.hour,
            marker.position * 100.0,
            format_clock(f64::from(marker.hour) * SECS_PER_HOUR)
        );
    }
    Ok(())
}
