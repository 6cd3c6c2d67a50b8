use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use crate::capture::content_provider::ContentProvider;
use crate::capture::host::CaptureServices;
use crate::error::RecorderError;
use crate::ipc::{LifecycleCommand, WorkerSurface};
use crate::recorder::{LifecycleCoordinator, RecordingState};
use crate::services::alerts::Alerts;

/// Process-wide application state managed by Tauri.
///
/// Holds only the sending half of the command channel and a read-only view of
/// the session state; the session itself lives on the capture side.
pub struct AppState {
    commands: mpsc::Sender<LifecycleCommand>,
    state: watch::Receiver<RecordingState>,
    provider: Arc<dyn ContentProvider>,
}

impl AppState {
    /// Wire the coordinator to a lazily created capture surface.
    ///
    /// Returns the state handle and the dispatch loop; the caller decides
    /// which runtime drives the loop.
    pub fn launch(
        services: CaptureServices,
        alerts: Arc<dyn Alerts>,
    ) -> (Self, impl Future<Output = ()> + Send + 'static) {
        let (state_tx, state) = watch::channel(RecordingState::Idle);
        let provider = services.provider.clone();
        let (surface, faults) = WorkerSurface::new(services, Arc::new(state_tx));
        let coordinator = LifecycleCoordinator::new(surface, alerts);
        let (commands, commands_rx) = mpsc::channel(32);

        let app_state = Self {
            commands,
            state,
            provider,
        };
        (app_state, coordinator.run(commands_rx, faults))
    }

    pub async fn send(&self, command: LifecycleCommand) -> Result<(), RecorderError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| RecorderError::ChannelClosed)
    }

    pub fn recording_state(&self) -> RecordingState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RecordingState> {
        self.state.clone()
    }

    pub fn provider(&self) -> Arc<dyn ContentProvider> {
        self.provider.clone()
    }
}

/// Which tray entries are usable in a given state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrayAffordances {
    pub can_start: bool,
    pub can_pause: bool,
    pub can_stop: bool,
    pub start_label: &'static str,
}

impl From<RecordingState> for TrayAffordances {
    fn from(state: RecordingState) -> Self {
        let (can_start, can_pause, can_stop) = match state {
            RecordingState::Idle => (true, false, false),
            RecordingState::Recording => (false, true, true),
            RecordingState::Paused => (true, false, true),
            RecordingState::Finalizing => (false, false, false),
        };
        Self {
            can_start,
            can_pause,
            can_stop,
            start_label: if state == RecordingState::Paused {
                "Resume Recording"
            } else {
                "Start Recording"
            },
        }
    }
}
