//! Capture host
//!
//! The capture side of the transport. Exclusively owns the recording session
//! and processes requests one at a time, in arrival order, between chunk
//! flushes.

use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};

use crate::capture::content_provider::{resolve_audio_source, ContentProvider};
use crate::capture::stream::CaptureBackend;
use crate::error::RecorderError;
use crate::ipc::{CaptureRequest, CommandOutcome, LifecycleCommand};
use crate::recorder::{RecordingSession, RecordingState};
use crate::services::permissions::gate::PermissionGate;
use crate::services::storage::{SaveResult, SaveSink};

/// Collaborators a capture host needs; cloned into every host incarnation
#[derive(Clone)]
pub struct CaptureServices {
    pub provider: Arc<dyn ContentProvider>,
    pub backend: Arc<dyn CaptureBackend>,
    pub permissions: Arc<dyn PermissionGate>,
    pub sink: Arc<dyn SaveSink>,
    pub chunk_interval: Duration,
}

pub struct CaptureHost {
    services: CaptureServices,
    session: RecordingSession,
    state_tx: Arc<watch::Sender<RecordingState>>,
}

impl CaptureHost {
    pub fn new(services: CaptureServices, state_tx: Arc<watch::Sender<RecordingState>>) -> Self {
        Self {
            services,
            session: RecordingSession::new(),
            state_tx,
        }
    }

    /// Signal `ready`, then serve requests until every sender is gone.
    pub async fn run(
        mut self,
        mut requests: mpsc::Receiver<CaptureRequest>,
        ready: oneshot::Sender<()>,
    ) {
        let period = self.services.chunk_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.publish();
        let _ = ready.send(());
        debug!("Capture host ready");

        loop {
            tokio::select! {
                request = requests.recv() => {
                    let Some(CaptureRequest { command, reply }) = request else {
                        break;
                    };
                    let result = self.handle(command).await;
                    let _ = reply.send(result);
                }
                _ = ticker.tick() => {
                    self.session.flush();
                }
            }
        }

        debug!("Capture host shutting down");
        self.session.reset();
        self.publish();
    }

    pub async fn handle(&mut self, command: LifecycleCommand) -> Result<CommandOutcome, RecorderError> {
        debug!("Capture host received {}", command.channel());
        let save = match command {
            LifecycleCommand::Start => {
                self.start().await?;
                None
            }
            LifecycleCommand::Pause => {
                self.session.pause()?;
                None
            }
            LifecycleCommand::Stop => self.stop().await,
        };
        self.publish();
        Ok(CommandOutcome {
            state: self.session.state(),
            save,
        })
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> &RecordingSession {
        &self.session
    }

    async fn start(&mut self) -> Result<(), RecorderError> {
        match self.session.state() {
            RecordingState::Idle => {}
            RecordingState::Paused => {
                info!("Resuming recording");
                self.session.resume()?;
                return Ok(());
            }
            state => {
                debug!("Start ignored while {:?}", state);
                return Ok(());
            }
        }

        self.services.permissions.ensure_granted().await?;
        let sources = self.services.provider.sources().await?;
        debug!("{} capture sources available", sources.len());
        let source = resolve_audio_source(&sources)?;
        self.session.start(source, self.services.backend.as_ref())?;
        Ok(())
    }

    /// Finalize and save. The session is back to `Idle` afterwards whatever
    /// the save outcome; `None` when there was nothing to stop.
    async fn stop(&mut self) -> Option<SaveResult> {
        if !self.session.stop() {
            return None;
        }
        self.publish();

        let bytes = self.session.finalize().unwrap_or_default();
        info!("Recording finalized: {} bytes", bytes.len());
        let result = self.services.sink.save(&bytes).await;
        self.session.reset();
        Some(result)
    }

    fn publish(&self) {
        let state = self.session.state();
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }
}
