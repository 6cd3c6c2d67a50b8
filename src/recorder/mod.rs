//! Recording lifecycle
//!
//! - `session`: the recording state machine and its chunk sequence
//! - `coordinator`: turns lifecycle commands into surface requests and alerts

pub mod coordinator;
pub mod session;

pub use coordinator::LifecycleCoordinator;
pub use session::{RecordingSession, RecordingState};
