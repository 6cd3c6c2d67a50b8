//! Recording session state machine
//!
//! Owns the capture stream bound at start and the ordered chunk sequence that
//! becomes the output file at finalize time.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capture::config::CaptureSource;
use crate::capture::stream::{AudioStream, CaptureBackend};
use crate::error::RecorderError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Paused,
    Finalizing,
}

/// A single recording from start to finalize.
///
/// Transitions that do not apply to the current state are no-ops and report
/// `false`; only failures of the underlying stream are errors.
pub struct RecordingSession {
    /// Correlates log lines of one recording
    id: Option<Uuid>,
    state: RecordingState,
    chunks: Vec<Vec<u8>>,
    source: Option<CaptureSource>,
    stream: Option<Box<dyn AudioStream>>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            id: None,
            state: RecordingState::Idle,
            chunks: Vec::new(),
            source: None,
            stream: None,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn source(&self) -> Option<&CaptureSource> {
        self.source.as_ref()
    }

    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// `Idle -> Recording`. Opens a stream on `source` and binds it.
    pub fn start(
        &mut self,
        source: CaptureSource,
        backend: &dyn CaptureBackend,
    ) -> Result<bool, RecorderError> {
        if self.state != RecordingState::Idle {
            debug!("Ignoring start while {:?}", self.state);
            return Ok(false);
        }

        let stream = backend.open(&source)?;
        let id = Uuid::new_v4();
        info!("Session {} recording from {} ({})", id, source.name, source.id);

        self.chunks.clear();
        self.id = Some(id);
        self.source = Some(source);
        self.stream = Some(stream);
        self.state = RecordingState::Recording;
        Ok(true)
    }

    /// `Recording -> Paused`
    pub fn pause(&mut self) -> Result<bool, RecorderError> {
        if self.state != RecordingState::Recording {
            debug!("Ignoring pause while {:?}", self.state);
            return Ok(false);
        }
        if let Some(stream) = self.stream.as_mut() {
            stream.pause()?;
        }
        self.state = RecordingState::Paused;
        Ok(true)
    }

    /// `Paused -> Recording`
    pub fn resume(&mut self) -> Result<bool, RecorderError> {
        if self.state != RecordingState::Paused {
            debug!("Ignoring resume while {:?}", self.state);
            return Ok(false);
        }
        if let Some(stream) = self.stream.as_mut() {
            stream.resume()?;
        }
        self.state = RecordingState::Recording;
        Ok(true)
    }

    /// Pull buffered data from the stream into a new chunk.
    /// Only flushes while recording; empty flushes append nothing.
    pub fn flush(&mut self) -> bool {
        if self.state != RecordingState::Recording {
            return false;
        }
        let Some(stream) = self.stream.as_mut() else {
            return false;
        };
        let chunk = stream.take_chunk();
        if chunk.is_empty() {
            return false;
        }
        debug!("Chunk {} received: {} bytes", self.chunks.len(), chunk.len());
        self.chunks.push(chunk);
        true
    }

    /// `Recording | Paused -> Finalizing`. Closes the stream and keeps its tail.
    pub fn stop(&mut self) -> bool {
        if !matches!(self.state, RecordingState::Recording | RecordingState::Paused) {
            debug!("Ignoring stop while {:?}", self.state);
            return false;
        }
        if let Some(stream) = self.stream.as_mut() {
            let tail = stream.close();
            if !tail.is_empty() {
                self.chunks.push(tail);
            }
        }
        self.state = RecordingState::Finalizing;
        info!(
            "Session {} stopped with {} chunks",
            self.id.map(|id| id.to_string()).unwrap_or_default(),
            self.chunks.len()
        );
        true
    }

    /// Concatenate the chunks in insertion order into the output buffer.
    /// `None` unless the session is finalizing.
    pub fn finalize(&self) -> Option<Vec<u8>> {
        if self.state != RecordingState::Finalizing {
            return None;
        }
        let data = self.chunks.concat();
        Some(match self.stream.as_ref() {
            Some(stream) => stream.finalize(data),
            None => data,
        })
    }

    /// Back to `Idle`: drops the stream, the source binding and all chunks.
    pub fn reset(&mut self) {
        if let Some(id) = self.id.take() {
            debug!("Session {} cleared", id);
        }
        self.state = RecordingState::Idle;
        self.chunks.clear();
        self.source = None;
        self.stream = None;
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}
