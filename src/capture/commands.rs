use crate::capture::config::CaptureSource;
use crate::error::RecorderError;
use crate::ipc::LifecycleCommand;
use crate::recorder::RecordingState;
use crate::state::app_state::AppState;

#[tauri::command]
pub async fn get_sources(state: tauri::State<'_, AppState>) -> Result<Vec<CaptureSource>, RecorderError> {
    state.provider().sources().await
}

#[tauri::command]
pub fn get_recording_state(state: tauri::State<'_, AppState>) -> RecordingState {
    state.recording_state()
}

#[tauri::command]
pub async fn start_recording(state: tauri::State<'_, AppState>) -> Result<(), RecorderError> {
    state.send(LifecycleCommand::Start).await
}

#[tauri::command]
pub async fn pause_recording(state: tauri::State<'_, AppState>) -> Result<(), RecorderError> {
    state.send(LifecycleCommand::Pause).await
}

#[tauri::command]
pub async fn stop_recording(state: tauri::State<'_, AppState>) -> Result<(), RecorderError> {
    state.send(LifecycleCommand::Stop).await
}
