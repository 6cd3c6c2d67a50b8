use serde::Serialize;

use crate::services::permissions::Permission;

#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("Permission denied: {0}")]
    PermissionDenied(Permission),

    #[error("No system audio source found")]
    NoAudioSourceFound,

    #[error("Capture surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("Capture stream failed: {0}")]
    Stream(String),

    #[error("Command channel closed")]
    ChannelClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecorderError {
    /// Title used for the alert that reports this error.
    pub fn title(&self) -> &'static str {
        match self {
            RecorderError::PermissionDenied(_) => "Permission Required",
            RecorderError::NoAudioSourceFound => "No Audio Source",
            RecorderError::SurfaceUnavailable(_) => "Recorder Unavailable",
            RecorderError::Io(_) => "Save Failed",
            _ => "Recording Error",
        }
    }
}

impl Serialize for RecorderError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
