use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment flag that turns on the diagnostics window and verbose logging
pub const DEBUG_ENV: &str = "QUICK_RECORDER_DEBUG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Screen,
    Window,
    Audio,
}

impl SourceKind {
    /// Derive the kind from an endpoint id such as `screen:0:0` or `audio:2`.
    /// Unknown prefixes are treated as windows.
    pub fn from_id(id: &str) -> Self {
        if id.starts_with("audio:") {
            SourceKind::Audio
        } else if id.starts_with("screen:") {
            SourceKind::Screen
        } else {
            SourceKind::Window
        }
    }
}

/// A capturable endpoint as enumerated by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSource {
    pub id: String,
    pub name: String,
    pub kind: SourceKind,
}

impl CaptureSource {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        let kind = SourceKind::from_id(&id);
        Self {
            id,
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Cadence at which buffered capture data is flushed into a new chunk
    pub chunk_interval: Duration,
    pub debug: bool,
    /// Directory name used under the user's config dir
    pub app_dir_name: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            chunk_interval: Duration::from_millis(1000),
            debug: false,
            app_dir_name: "quick-recorder".into(),
        }
    }
}

impl RecorderConfig {
    pub fn from_env() -> Self {
        let debug = std::env::var(DEBUG_ENV)
            .map(|v| is_truthy(&v))
            .unwrap_or(false);
        Self {
            debug,
            ..Self::default()
        }
    }

    /// Default `env_logger` filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}
