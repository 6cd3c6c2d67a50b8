#[cfg(feature = "desktop")]
pub mod commands;
pub mod gate;
pub mod store;
#[cfg(feature = "desktop")]
pub mod system;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Authorized,
    Denied,
    Restricted,
    NotDetermined,
}

/// OS-level authorization a recording depends on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    Microphone,
    ScreenRecording,
}

impl Permission {
    /// Privacy pane where the user can grant this permission
    pub fn settings_url(&self) -> &'static str {
        match self {
            Permission::Microphone => {
                "x-apple.systempreferences:com.apple.preference.security?Privacy_Microphone"
            }
            Permission::ScreenRecording => {
                "x-apple.systempreferences:com.apple.preference.security?Privacy_ScreenCapture"
            }
        }
    }

    /// Explanation shown when the permission is missing
    pub fn rationale(&self) -> &'static str {
        match self {
            Permission::Microphone => "Recording requires microphone access.",
            Permission::ScreenRecording => {
                "Recording system audio requires screen recording access. \
                 Grant it under System Settings > Privacy & Security > Screen Recording."
            }
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Microphone => write!(f, "microphone access"),
            Permission::ScreenRecording => write!(f, "screen recording access"),
        }
    }
}
