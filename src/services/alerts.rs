//! User-facing alert surface
//!
//! Errors are modal and awaited; notifications are passive.

use async_trait::async_trait;

#[async_trait]
pub trait Alerts: Send + Sync {
    /// Show a blocking error and wait until the user dismisses it.
    async fn error(&self, title: &str, message: &str);

    /// Ask the user to accept or decline; `true` when accepted.
    async fn confirm(&self, title: &str, message: &str, accept_label: &str) -> bool;

    fn notify(&self, title: &str, body: &str);

    /// Hand a URL (e.g. an OS settings pane) to the platform opener.
    fn open_url(&self, url: &str);
}

#[cfg(feature = "desktop")]
pub use self::dialog::DialogAlerts;

#[cfg(feature = "desktop")]
mod dialog {
    use async_trait::async_trait;
    use log::warn;
    use tauri::{AppHandle, Emitter};
    use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};
    use tauri_plugin_notification::NotificationExt;
    use tokio::sync::oneshot;

    use super::Alerts;
    use crate::events;

    /// Native dialogs and notifications through the Tauri plugins
    pub struct DialogAlerts {
        app: AppHandle,
    }

    impl DialogAlerts {
        pub fn new(app: AppHandle) -> Self {
            Self { app }
        }
    }

    #[async_trait]
    impl Alerts for DialogAlerts {
        async fn error(&self, title: &str, message: &str) {
            let _ = self.app.emit(events::RECORDING_FAILED, message);

            let (tx, rx) = oneshot::channel();
            self.app
                .dialog()
                .message(message)
                .title(title)
                .kind(MessageDialogKind::Error)
                .show(move |_| {
                    let _ = tx.send(());
                });
            let _ = rx.await;
        }

        async fn confirm(&self, title: &str, message: &str, accept_label: &str) -> bool {
            let (tx, rx) = oneshot::channel();
            self.app
                .dialog()
                .message(message)
                .title(title)
                .kind(MessageDialogKind::Warning)
                .buttons(MessageDialogButtons::OkCancelCustom(
                    accept_label.to_string(),
                    "Cancel".to_string(),
                ))
                .show(move |accepted| {
                    let _ = tx.send(accepted);
                });
            rx.await.unwrap_or(false)
        }

        fn notify(&self, title: &str, body: &str) {
            if let Err(e) = self.app.notification().builder().title(title).body(body).show() {
                warn!("Failed to show notification: {}", e);
            }
        }

        #[allow(deprecated)]
        fn open_url(&self, url: &str) {
            use tauri_plugin_shell::ShellExt;
            if let Err(e) = self.app.shell().open(url, None) {
                warn!("Failed to open {}: {}", url, e);
            }
        }
    }
}
