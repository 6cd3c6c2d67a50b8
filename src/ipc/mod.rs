//! Command transport between the control side (tray, dialogs, coordinator)
//! and the capture side (the task owning the recording session).

pub mod messages;
pub mod surface;

pub use messages::{CaptureRequest, CommandOutcome, LifecycleCommand};
pub use surface::{CaptureSurface, SurfaceFault, WorkerSurface};
