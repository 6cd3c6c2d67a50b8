use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::RecorderError;
use crate::events;
use crate::recorder::RecordingState;
use crate::services::storage::SaveResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleCommand {
    #[serde(rename = "start-recording")]
    Start,
    #[serde(rename = "pause-recording")]
    Pause,
    #[serde(rename = "stop-recording")]
    Stop,
}

impl LifecycleCommand {
    pub fn channel(&self) -> &'static str {
        match self {
            LifecycleCommand::Start => events::START_RECORDING,
            LifecycleCommand::Pause => events::PAUSE_RECORDING,
            LifecycleCommand::Stop => events::STOP_RECORDING,
        }
    }
}

/// What the capture side reports back for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub state: RecordingState,
    /// Present when the command finalized a recording
    pub save: Option<SaveResult>,
}

impl CommandOutcome {
    pub fn idle() -> Self {
        Self {
            state: RecordingState::Idle,
            save: None,
        }
    }
}

pub struct CaptureRequest {
    pub command: LifecycleCommand,
    pub reply: oneshot::Sender<Result<CommandOutcome, RecorderError>>,
}
