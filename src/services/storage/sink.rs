//! Save sink
//!
//! Persists a finalized recording to a user-chosen destination.

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::services::alerts::Alerts;

/// Error text reported when the user dismisses the save dialog
pub const USER_CANCELLED: &str = "User cancelled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveResult {
    pub fn saved(path: PathBuf) -> Self {
        Self {
            success: true,
            path: Some(path),
            error: None,
        }
    }

    pub fn cancelled() -> Self {
        Self::failed(USER_CANCELLED)
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            path: None,
            error: Some(error.into()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        !self.success && self.error.as_deref() == Some(USER_CANCELLED)
    }
}

/// `recording-YYYYMMDD-HHMMSS.<ext>`
pub fn default_file_name<Tz: TimeZone>(now: &DateTime<Tz>, extension: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("recording-{}.{}", now.format("%Y%m%d-%H%M%S"), extension)
}

#[async_trait]
pub trait SaveSink: Send + Sync {
    async fn save(&self, bytes: &[u8]) -> SaveResult;
}

/// Lets the user choose where a recording goes; `None` when cancelled
#[async_trait]
pub trait DestinationPicker: Send + Sync {
    async fn pick(&self, default_name: &str, extension: &str) -> Option<PathBuf>;
}

pub struct FileSaveSink {
    picker: Arc<dyn DestinationPicker>,
    alerts: Arc<dyn Alerts>,
    extension: String,
}

impl FileSaveSink {
    pub fn new(
        picker: Arc<dyn DestinationPicker>,
        alerts: Arc<dyn Alerts>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            picker,
            alerts,
            extension: extension.into(),
        }
    }
}

#[async_trait]
impl SaveSink for FileSaveSink {
    async fn save(&self, bytes: &[u8]) -> SaveResult {
        let default_name = default_file_name(&Local::now(), &self.extension);

        let Some(path) = self.picker.pick(&default_name, &self.extension).await else {
            info!("User cancelled saving the recording");
            return SaveResult::cancelled();
        };

        info!("Saving {} bytes to {}", bytes.len(), path.display());
        match write_whole(&path, bytes).await {
            Ok(()) => {
                self.alerts.notify(
                    "Recording Saved",
                    &format!("Saved to {}", path.display()),
                );
                SaveResult::saved(path)
            }
            Err(e) => {
                error!("Failed to save recording to {}: {}", path.display(), e);
                SaveResult::failed(e.to_string())
            }
        }
    }
}

/// Write into a sibling temp file and rename over the destination so a failed
/// write never leaves a truncated recording behind.
async fn write_whole(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    if let Err(e) = tokio::fs::write(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&partial, path).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
    }
    Ok(())
}

#[cfg(feature = "desktop")]
pub use self::dialog::DialogPicker;

#[cfg(feature = "desktop")]
mod dialog {
    use async_trait::async_trait;
    use std::path::PathBuf;
    use tauri::AppHandle;
    use tauri_plugin_dialog::DialogExt;
    use tokio::sync::oneshot;

    use super::DestinationPicker;

    /// Native save dialog, opened in the Downloads folder
    pub struct DialogPicker {
        app: AppHandle,
    }

    impl DialogPicker {
        pub fn new(app: AppHandle) -> Self {
            Self { app }
        }
    }

    #[async_trait]
    impl DestinationPicker for DialogPicker {
        async fn pick(&self, default_name: &str, extension: &str) -> Option<PathBuf> {
            let (tx, rx) = oneshot::channel();
            let mut dialog = self
                .app
                .dialog()
                .file()
                .set_title("Save Recording")
                .set_file_name(default_name)
                .add_filter(format!("{} Files", extension.to_uppercase()), &[extension])
                .add_filter("All Files", &["*"]);
            if let Some(downloads) = dirs::download_dir() {
                dialog = dialog.set_directory(downloads);
            }
            dialog.save_file(move |path| {
                let _ = tx.send(path);
            });

            rx.await.ok().flatten().and_then(|path| path.into_path().ok())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedPicker, RecordingAlerts};
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn default_name_encodes_timestamp() {
        let now = FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 7, 9, 5, 2)
            .unwrap();
        assert_eq!(default_file_name(&now, "webm"), "recording-20240307-090502.webm");
    }

    #[test]
    fn cancelled_result_shape() {
        let result = SaveResult::cancelled();
        assert!(!result.success);
        assert!(result.is_cancelled());
        assert_eq!(result.error.as_deref(), Some("User cancelled"));
        assert!(result.path.is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "User cancelled"}));
    }

    #[tokio::test]
    async fn cancel_writes_nothing_and_does_not_notify() {
        let alerts = Arc::new(RecordingAlerts::default());
        let sink = FileSaveSink::new(Arc::new(FixedPicker::cancel()), alerts.clone(), "webm");

        let result = sink.save(b"audio").await;
        assert!(result.is_cancelled());
        assert!(alerts.notifications().is_empty());
        assert!(alerts.errors().is_empty());
    }

    #[tokio::test]
    async fn saves_bytes_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.webm");
        let alerts = Arc::new(RecordingAlerts::default());
        let picker = Arc::new(FixedPicker::to(path.clone()));
        let sink = FileSaveSink::new(picker.clone(), alerts.clone(), "webm");

        let result = sink.save(b"audio bytes").await;

        assert_eq!(result, SaveResult::saved(path.clone()));
        assert_eq!(std::fs::read(&path).unwrap(), b"audio bytes");
        assert!(!dir.path().join("take.webm.part").exists());
        assert_eq!(alerts.notifications().len(), 1);

        let proposed = picker.proposed_names();
        assert_eq!(proposed.len(), 1);
        assert!(proposed[0].starts_with("recording-"));
        assert!(proposed[0].ends_with(".webm"));
    }

    #[tokio::test]
    async fn write_failure_is_reported_in_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("take.webm");
        let alerts = Arc::new(RecordingAlerts::default());
        let sink = FileSaveSink::new(Arc::new(FixedPicker::to(path.clone())), alerts.clone(), "webm");

        let result = sink.save(b"audio").await;

        assert!(!result.success);
        assert!(!result.is_cancelled());
        assert!(result.error.is_some());
        assert!(!path.exists());
        assert!(alerts.notifications().is_empty());
    }

    #[tokio::test]
    async fn failed_rename_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.webm");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();
        let alerts = Arc::new(RecordingAlerts::default());
        let sink = FileSaveSink::new(Arc::new(FixedPicker::to(path.clone())), alerts.clone(), "webm");

        let result = sink.save(b"audio").await;

        assert!(!result.success);
        assert!(!dir.path().join("take.webm.part").exists());
        assert!(path.join("keep").exists());
        assert!(alerts.notifications().is_empty());
    }
}
