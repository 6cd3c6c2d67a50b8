//! Lifecycle coordinator
//!
//! The single authority for lifecycle commands on the control side. Commands
//! are processed strictly one after another; every failure ends in an alert
//! and never escapes the dispatch loop.

use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::RecorderError;
use crate::ipc::{CaptureSurface, CommandOutcome, LifecycleCommand, SurfaceFault};
use crate::services::alerts::Alerts;
use crate::services::storage::SaveResult;

pub struct LifecycleCoordinator<S: CaptureSurface> {
    surface: S,
    alerts: Arc<dyn Alerts>,
}

impl<S: CaptureSurface> LifecycleCoordinator<S> {
    pub fn new(surface: S, alerts: Arc<dyn Alerts>) -> Self {
        Self { surface, alerts }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Consume commands in arrival order until the sender side is dropped.
    /// Surface faults raised between commands are reported as they arrive.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<LifecycleCommand>,
        mut faults: mpsc::UnboundedReceiver<SurfaceFault>,
    ) {
        info!("Lifecycle coordinator running");
        loop {
            tokio::select! {
                biased;
                Some(fault) = faults.recv() => self.on_fault(fault).await,
                command = commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
            }
        }
        info!("Lifecycle coordinator stopped");
    }

    /// Run one command to completion and report its failures.
    pub async fn handle(&mut self, command: LifecycleCommand) {
        info!("Handling {}", command.channel());
        let result = match command {
            LifecycleCommand::Start => self.on_start().await,
            LifecycleCommand::Pause => self.on_pause().await,
            LifecycleCommand::Stop => self.on_stop().await,
        };

        match result {
            Ok(outcome) => {
                debug!("{} -> {:?}", command.channel(), outcome.state);
                if let Some(save) = outcome.save {
                    self.report_save(save).await;
                }
            }
            Err(e) => self.report(e).await,
        }
    }

    pub async fn on_start(&mut self) -> Result<CommandOutcome, RecorderError> {
        self.surface.ensure_ready().await?;
        if self.surface.is_crashed() {
            warn!("Capture surface crashed; reloading before start");
            self.surface.reload().await?;
            if self.surface.is_crashed() {
                return Err(RecorderError::SurfaceUnavailable(
                    "the capture surface did not recover after reload".into(),
                ));
            }
        }
        self.surface.send(LifecycleCommand::Start).await
    }

    pub async fn on_pause(&mut self) -> Result<CommandOutcome, RecorderError> {
        if !self.surface.exists() {
            debug!("Pause without a capture surface; nothing is recording");
            return Ok(CommandOutcome::idle());
        }
        if self.surface.is_crashed() {
            return Err(RecorderError::SurfaceUnavailable(
                "the capture surface has crashed".into(),
            ));
        }
        self.surface.send(LifecycleCommand::Pause).await
    }

    pub async fn on_stop(&mut self) -> Result<CommandOutcome, RecorderError> {
        if !self.surface.exists() {
            debug!("Stop without a capture surface; nothing is recording");
            return Ok(CommandOutcome::idle());
        }
        if self.surface.is_crashed() {
            warn!("Capture surface crashed; reloading before stop");
            self.surface.reload().await?;
            if self.surface.is_crashed() {
                return Err(RecorderError::SurfaceUnavailable(
                    "the capture surface did not recover after reload".into(),
                ));
            }
        }
        self.surface.send(LifecycleCommand::Stop).await
    }

    async fn on_fault(&mut self, fault: SurfaceFault) {
        match fault {
            SurfaceFault::Crashed => {
                self.alerts
                    .error(
                        "Recorder Crashed",
                        "The recorder stopped unexpectedly and the current recording was discarded. Please try again.",
                    )
                    .await;
            }
        }
    }

    async fn report(&mut self, err: RecorderError) {
        error!("Lifecycle command failed: {}", err);
        match &err {
            RecorderError::PermissionDenied(permission) => {
                let open = self
                    .alerts
                    .confirm(err.title(), permission.rationale(), "Open System Settings")
                    .await;
                if open {
                    self.alerts.open_url(permission.settings_url());
                }
            }
            _ => self.alerts.error(err.title(), &err.to_string()).await,
        }
    }

    async fn report_save(&mut self, save: SaveResult) {
        if save.success {
            info!("Recording saved to {:?}", save.path);
        } else if save.is_cancelled() {
            info!("Recording discarded: save cancelled");
        } else {
            let reason = save.error.unwrap_or_default();
            self.alerts
                .error(
                    "Save Failed",
                    &format!("The recording could not be saved: {}", reason),
                )
                .await;
        }
    }
}
