//! Capture surface
//!
//! The control side's handle on the capture side: creation on first use,
//! readiness, liveness and reload.

use async_trait::async_trait;
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::AbortHandle;

use super::messages::{CaptureRequest, CommandOutcome, LifecycleCommand};
use crate::capture::host::{CaptureHost, CaptureServices};
use crate::error::RecorderError;
use crate::recorder::RecordingState;

#[async_trait]
pub trait CaptureSurface: Send {
    /// Whether the surface has been created at all
    fn exists(&self) -> bool;

    fn is_crashed(&self) -> bool;

    /// Create the surface if needed and wait until it can take commands.
    async fn ensure_ready(&mut self) -> Result<(), RecorderError>;

    /// Replace the surface with a fresh one, discarding any session it held.
    async fn reload(&mut self) -> Result<(), RecorderError>;

    async fn send(&mut self, command: LifecycleCommand) -> Result<CommandOutcome, RecorderError>;
}

/// Reported by the surface outside of any command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceFault {
    Crashed,
}

struct Incarnation {
    requests: mpsc::Sender<CaptureRequest>,
    ready: Option<oneshot::Receiver<()>>,
    crashed: Arc<AtomicBool>,
    task: AbortHandle,
}

/// Runs the capture host as a supervised tokio task
pub struct WorkerSurface {
    services: CaptureServices,
    state_tx: Arc<watch::Sender<RecordingState>>,
    faults: mpsc::UnboundedSender<SurfaceFault>,
    current: Option<Incarnation>,
}

impl WorkerSurface {
    pub fn new(
        services: CaptureServices,
        state_tx: Arc<watch::Sender<RecordingState>>,
    ) -> (Self, mpsc::UnboundedReceiver<SurfaceFault>) {
        let (faults, faults_rx) = mpsc::unbounded_channel();
        let surface = Self {
            services,
            state_tx,
            faults,
            current: None,
        };
        (surface, faults_rx)
    }

    fn spawn(&mut self) {
        let (requests, requests_rx) = mpsc::channel(16);
        let (ready_tx, ready_rx) = oneshot::channel();
        let host = CaptureHost::new(self.services.clone(), self.state_tx.clone());
        let worker = tokio::spawn(host.run(requests_rx, ready_tx));
        let task = worker.abort_handle();

        let crashed = Arc::new(AtomicBool::new(false));
        let flag = crashed.clone();
        let state_tx = self.state_tx.clone();
        let faults = self.faults.clone();
        tokio::spawn(async move {
            if let Err(e) = worker.await {
                if e.is_panic() {
                    error!("Capture host crashed; discarding the current recording");
                    flag.store(true, Ordering::SeqCst);
                    state_tx.send_replace(RecordingState::Idle);
                    let _ = faults.send(SurfaceFault::Crashed);
                }
            }
        });

        info!("Capture surface created");
        self.current = Some(Incarnation {
            requests,
            ready: Some(ready_rx),
            crashed,
            task,
        });
    }
}

#[async_trait]
impl CaptureSurface for WorkerSurface {
    fn exists(&self) -> bool {
        self.current.is_some()
    }

    fn is_crashed(&self) -> bool {
        self.current
            .as_ref()
            .map(|c| c.crashed.load(Ordering::SeqCst) || c.requests.is_closed())
            .unwrap_or(false)
    }

    async fn ensure_ready(&mut self) -> Result<(), RecorderError> {
        if self.current.is_none() {
            self.spawn();
        }
        let Some(current) = self.current.as_mut() else {
            return Err(RecorderError::SurfaceUnavailable("not created".into()));
        };
        if let Some(ready) = current.ready.take() {
            ready.await.map_err(|_| {
                RecorderError::SurfaceUnavailable("capture host exited before it was ready".into())
            })?;
        }
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), RecorderError> {
        warn!("Reloading capture surface");
        if let Some(old) = self.current.take() {
            old.task.abort();
        }
        self.state_tx.send_replace(RecordingState::Idle);
        self.spawn();
        self.ensure_ready().await
    }

    async fn send(&mut self, command: LifecycleCommand) -> Result<CommandOutcome, RecorderError> {
        let Some(requests) = self.current.as_ref().map(|c| c.requests.clone()) else {
            return Err(RecorderError::SurfaceUnavailable("not created".into()));
        };
        let (reply, reply_rx) = oneshot::channel();
        requests
            .send(CaptureRequest { command, reply })
            .await
            .map_err(|_| RecorderError::SurfaceUnavailable("capture host is not running".into()))?;
        reply_rx.await.map_err(|_| {
            RecorderError::SurfaceUnavailable(format!(
                "capture host stopped while handling {}",
                command.channel()
            ))
        })?
    }
}
