use super::system::{microphone_status, screen_status};
use super::PermissionStatus;

#[tauri::command]
pub fn check_screen_recording_permission() -> PermissionStatus {
    screen_status()
}

#[tauri::command]
pub fn check_microphone_permission() -> PermissionStatus {
    microphone_status()
}
