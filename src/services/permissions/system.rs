use async_trait::async_trait;

use super::gate::PermissionProbe;
use super::PermissionStatus;

/// Queries the running OS. Only macOS gates capture behind privacy prompts.
pub struct SystemPermissionProbe;

#[async_trait]
impl PermissionProbe for SystemPermissionProbe {
    fn microphone(&self) -> PermissionStatus {
        microphone_status()
    }

    async fn request_microphone(&self) -> bool {
        // macOS shows its own prompt when the first input stream opens, so an
        // undetermined status is let through.
        matches!(
            microphone_status(),
            PermissionStatus::Authorized | PermissionStatus::NotDetermined
        )
    }

    fn requires_screen_permission(&self) -> bool {
        cfg!(target_os = "macos")
    }

    fn screen(&self) -> PermissionStatus {
        screen_status()
    }

    fn request_screen(&self) -> bool {
        #[cfg(target_os = "macos")]
        {
            core_graphics::access::ScreenCaptureAccess::request()
        }

        #[cfg(not(target_os = "macos"))]
        {
            true
        }
    }
}

#[cfg(target_os = "macos")]
pub fn microphone_status() -> PermissionStatus {
    use objc::runtime::Object;
    use objc::{class, msg_send, sel, sel_impl};

    extern "C" {
        static AVMediaTypeAudio: *mut Object;
    }

    // AVAuthorizationStatus
    let status: isize = unsafe {
        msg_send![class!(AVCaptureDevice), authorizationStatusForMediaType: AVMediaTypeAudio]
    };
    match status {
        1 => PermissionStatus::Restricted,
        2 => PermissionStatus::Denied,
        3 => PermissionStatus::Authorized,
        _ => PermissionStatus::NotDetermined,
    }
}

#[cfg(not(target_os = "macos"))]
pub fn microphone_status() -> PermissionStatus {
    PermissionStatus::Authorized
}

#[cfg(target_os = "macos")]
pub fn screen_status() -> PermissionStatus {
    if core_graphics::access::ScreenCaptureAccess::preflight() {
        PermissionStatus::Authorized
    } else {
        PermissionStatus::Denied
    }
}

#[cfg(not(target_os = "macos"))]
pub fn screen_status() -> PermissionStatus {
    PermissionStatus::Authorized
}
