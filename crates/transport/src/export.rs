//! Clip export requests.
//!
//! The transport only names the clip and hands a request to an
//! [`ExportSink`]. Downloading, cutting, and encoding belong to the sink.

use syncview_common::error::{SyncviewError, SyncviewResult};
use syncview_session_model::TrimState;

use crate::registry::StreamRegistry;

/// Everything a sink needs to produce a clip of one stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    /// Final file name, including the trim range when one is active.
    pub filename: String,

    /// Source identifier of the selected stream.
    pub source: String,

    /// Trim range in seconds (for partial exports).
    pub range: Option<(f64, f64)>,
}

/// Destination for export requests (download trigger, job queue, ...).
pub trait ExportSink: Send {
    /// Accept the request.
    fn export(&mut self, request: &ExportRequest) -> SyncviewResult<()>;

    /// Sink name for logging.
    fn name(&self) -> &str;
}

/// Stand-in sink that only raises a user-visible notification.
#[derive(Debug, Default)]
pub struct NotifyExportSink {
    notifications: Vec<String>,
}

impl NotifyExportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications raised so far, oldest first.
    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }
}

impl ExportSink for NotifyExportSink {
    fn export(&mut self, request: &ExportRequest) -> SyncviewResult<()> {
        let message = format!("Download started: {}", request.filename);
        tracing::info!(
            filename = %request.filename,
            source = %request.source,
            range = ?request.range,
            "Export requested"
        );
        self.notifications.push(message);
        Ok(())
    }

    fn name(&self) -> &str {
        "notify"
    }
}

/// File name for a stream source: the last path segment if it has an
/// extension, otherwise `fallback`.
pub fn base_filename(source: &str, fallback: &str) -> String {
    let path = source
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    match path.rsplit(|c: char| c == '/' || c == '\\').next() {
        Some(segment) if segment.contains('.') => segment.to_string(),
        _ => fallback.to_string(),
    }
}

/// `<minutes>m<seconds>s`, whole seconds.
pub fn format_trim_stamp(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    format!("{}m{}s", total / 60, total % 60)
}

/// Insert `_<start>-<end>` before the extension of `base`.
pub fn trimmed_filename(base: &str, start: f64, end: f64) -> String {
    let range = format!("{}-{}", format_trim_stamp(start), format_trim_stamp(end));
    match base.rfind('.') {
        Some(dot) => format!("{}_{}{}", &base[..dot], range, &base[dot..]),
        None => format!("{base}_{range}"),
    }
}

/// Build the request for the currently selected stream.
///
/// Fails with `NoSelection` before deriving anything if the selection is
/// unset, out of bounds, or points at a dropped stream.
pub fn build_export_request(
    streams: &StreamRegistry,
    trim: &TrimState,
    fallback_filename: &str,
) -> SyncviewResult<ExportRequest> {
    let Some(stream) = streams.selected_stream() else {
        tracing::warn!(
            selected = ?streams.selected_index(),
            count = streams.len(),
            "Export aborted: no valid stream selected"
        );
        return Err(SyncviewError::NoSelection);
    };

    let source = stream.source();
    let base = base_filename(&source, fallback_filename);
    let range = trim.range();
    let filename = match range {
        Some((start, end)) => trimmed_filename(&base, start, end),
        None => base,
    };

    Ok(ExportRequest {
        filename,
        source,
        range,
    })
}
