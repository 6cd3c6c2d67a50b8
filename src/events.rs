/// Lifecycle command names carried from the control side to the capture side
pub const START_RECORDING: &str = "start-recording";
pub const PAUSE_RECORDING: &str = "pause-recording";
pub const STOP_RECORDING: &str = "stop-recording";

/// Event name constants for Tauri backend -> frontend communication
pub const RECORDING_STATE_CHANGED: &str = "recording:state-changed";
pub const RECORDING_FAILED: &str = "recording:failed";
