//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use syncview_stream_core::ReadyState;

use crate::error::{SyncviewError, SyncviewResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Group transport behaviour.
    #[serde(default)]
    pub transport: TransportDefaults,

    /// On-screen controls behaviour.
    #[serde(default)]
    pub controls: ControlsConfig,

    /// Clip export defaults.
    #[serde(default)]
    pub export: ExportDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Transport parameters shared by every stream in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportDefaults {
    /// Minimum readiness a stream must report before `play()` is issued to it.
    pub ready_threshold: ReadyState,

    /// Step used by the skip forward/back buttons (seconds).
    pub skip_secs: f64,
}

/// Auto-hide behaviour of the playback controls overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsConfig {
    /// Idle delay before controls hide while playing (milliseconds).
    pub hide_delay_ms: u64,
}

/// Clip export defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDefaults {
    /// Filename used when the stream source has no usable file name.
    pub fallback_filename: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "syncview=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for TransportDefaults {
    fn default() -> Self {
        Self {
            ready_threshold: ReadyState::HaveFutureData,
            skip_secs: 10.0,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            hide_delay_ms: 3000,
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            fallback_filename: "video.mp4".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Reject values the transport cannot work with.
    pub fn validate(&self) -> SyncviewResult<()> {
        let skip = self.transport.skip_secs;
        if !(skip.is_finite() && skip > 0.0) {
            return Err(SyncviewError::config(format!(
                "transport.skip_secs must be positive, got {skip}"
            )));
        }
        if self.controls.hide_delay_ms == 0 {
            return Err(SyncviewError::config("controls.hide_delay_ms must be non-zero"));
        }
        let fallback = &self.export.fallback_filename;
        if !fallback.contains('.') || fallback.contains(|c: char| c == '/' || c == '\\') {
            return Err(SyncviewError::config(format!(
                "export.fallback_filename must be a bare file name with an extension, got {fallback:?}"
            )));
        }
        Ok(())
    }

    /// Write config as pretty JSON, creating parent directories.
    pub fn save_to(&self, config_path: &std::path::Path) -> SyncviewResult<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, json)?;
        tracing::debug!(path = %config_path.display(), "Config saved");
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("syncview").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.transport.ready_threshold, ReadyState::HaveFutureData);
        assert_eq!(config.controls.hide_delay_ms, 3000);
        assert_eq!(config.export.fallback_filename, "video.mp4");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config_fills_missing_sections() {
        let raw = r#"{ "controls": { "hide_delay_ms": 1500 } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.controls.hide_delay_ms, 1500);
        assert!((config.transport.skip_secs - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from(std::path::Path::new(
            "/nonexistent/syncview/config.json",
        ));
        assert_eq!(config.export.fallback_filename, "video.mp4");
    }

    #[test]
    fn test_validate() {
        assert!(AppConfig::default().validate().is_ok());

        let mut config = AppConfig::default();
        config.transport.skip_secs = 0.0;
        assert!(matches!(config.validate(), Err(SyncviewError::Config { .. })));

        let mut config = AppConfig::default();
        config.controls.hide_delay_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.export.fallback_filename = "clips/video.mp4".to_string();
        assert!(config.validate().is_err());
        config.export.fallback_filename = "video".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = std::env::temp_dir().join(format!("syncview-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.transport.skip_secs = 5.0;
        config.export.fallback_filename = "clip.webm".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert!((loaded.transport.skip_secs - 5.0).abs() < 1e-9);
        assert_eq!(loaded.export.fallback_filename, "clip.webm");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_ready_threshold_serializes_snake_case() {
        let json = serde_json::to_string(&TransportDefaults::default()).unwrap();
        assert!(json.contains("\"have_future_data\""));
    }
}
