//! Fakes for the seams between the lifecycle core and the platform.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::capture::config::CaptureSource;
use crate::capture::content_provider::ContentProvider;
use crate::capture::host::CaptureServices;
use crate::capture::stream::{AudioStream, CaptureBackend};
use crate::error::RecorderError;
use crate::services::alerts::Alerts;
use crate::services::permissions::gate::PermissionGate;
use crate::services::permissions::Permission;
use crate::services::storage::{DestinationPicker, SaveResult, SaveSink};

pub fn default_sources() -> Vec<CaptureSource> {
    vec![
        CaptureSource::new("screen:1", "Entire screen"),
        CaptureSource::new("audio:2", "System Audio"),
    ]
}

pub fn services(backend: Arc<FakeBackend>, sink: Arc<FakeSink>) -> CaptureServices {
    CaptureServices {
        provider: Arc::new(StaticProvider::new(default_sources())),
        backend,
        permissions: Arc::new(StaticGate::allowed()),
        sink,
        chunk_interval: Duration::from_millis(1000),
    }
}

#[derive(Default)]
struct StreamShared {
    pending: Vec<u8>,
    paused: bool,
    closed: bool,
}

pub struct FakeBackend {
    fail_open: bool,
    panic_on_flush: bool,
    opened: AtomicUsize,
    flushes: Arc<AtomicUsize>,
    current: Mutex<Arc<Mutex<StreamShared>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            fail_open: false,
            panic_on_flush: false,
            opened: AtomicUsize::new(0),
            flushes: Arc::new(AtomicUsize::new(0)),
            current: Mutex::new(Arc::new(Mutex::new(StreamShared::default()))),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::new()
        }
    }

    /// Streams that panic the first time they are flushed
    pub fn panicking() -> Self {
        Self {
            panic_on_flush: true,
            ..Self::new()
        }
    }

    fn shared(&self) -> Arc<Mutex<StreamShared>> {
        self.current.lock().unwrap().clone()
    }

    /// Push captured bytes into the most recently opened stream. A paused
    /// stream drops them, as a paused device delivers nothing.
    pub fn feed(&self, bytes: &[u8]) {
        let shared = self.shared();
        let mut shared = shared.lock().unwrap();
        if !shared.paused {
            shared.pending.extend_from_slice(bytes);
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of flushes that produced data
    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.shared().lock().unwrap().paused
    }

    pub fn is_closed(&self) -> bool {
        self.shared().lock().unwrap().closed
    }
}

impl CaptureBackend for FakeBackend {
    fn open(&self, _source: &CaptureSource) -> Result<Box<dyn AudioStream>, RecorderError> {
        if self.fail_open {
            return Err(RecorderError::Stream("device unavailable".into()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        let shared = Arc::new(Mutex::new(StreamShared::default()));
        *self.current.lock().unwrap() = shared.clone();
        Ok(Box::new(FakeStream {
            shared,
            flushes: self.flushes.clone(),
            panic_on_flush: self.panic_on_flush,
        }))
    }
}

struct FakeStream {
    shared: Arc<Mutex<StreamShared>>,
    flushes: Arc<AtomicUsize>,
    panic_on_flush: bool,
}

impl AudioStream for FakeStream {
    fn pause(&mut self) -> Result<(), RecorderError> {
        self.shared.lock().unwrap().paused = true;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), RecorderError> {
        self.shared.lock().unwrap().paused = false;
        Ok(())
    }

    fn take_chunk(&mut self) -> Vec<u8> {
        if self.panic_on_flush {
            panic!("capture stream fault");
        }
        let chunk = std::mem::take(&mut self.shared.lock().unwrap().pending);
        if !chunk.is_empty() {
            self.flushes.fetch_add(1, Ordering::SeqCst);
        }
        chunk
    }

    fn close(&mut self) -> Vec<u8> {
        let mut shared = self.shared.lock().unwrap();
        shared.closed = true;
        std::mem::take(&mut shared.pending)
    }
}

pub struct StaticProvider {
    sources: Vec<CaptureSource>,
}

impl StaticProvider {
    pub fn new(sources: Vec<CaptureSource>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl ContentProvider for StaticProvider {
    async fn sources(&self) -> Result<Vec<CaptureSource>, RecorderError> {
        Ok(self.sources.clone())
    }
}

pub struct StaticGate {
    allow: bool,
}

impl StaticGate {
    pub fn allowed() -> Self {
        Self { allow: true }
    }

    pub fn denied() -> Self {
        Self { allow: false }
    }
}

#[async_trait]
impl PermissionGate for StaticGate {
    async fn ensure_granted(&self) -> Result<(), RecorderError> {
        if self.allow {
            Ok(())
        } else {
            Err(RecorderError::PermissionDenied(Permission::Microphone))
        }
    }
}

pub struct FakeSink {
    result: SaveResult,
    saved: Mutex<Vec<Vec<u8>>>,
}

impl FakeSink {
    fn returning(result: SaveResult) -> Self {
        Self {
            result,
            saved: Mutex::new(Vec::new()),
        }
    }

    pub fn saving() -> Self {
        Self::returning(SaveResult::saved(PathBuf::from("recording.webm")))
    }

    pub fn cancelling() -> Self {
        Self::returning(SaveResult::cancelled())
    }

    pub fn failing(error: &str) -> Self {
        Self::returning(SaveResult::failed(error))
    }

    /// Buffers handed to the sink, including cancelled ones
    pub fn saved(&self) -> Vec<Vec<u8>> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl SaveSink for FakeSink {
    async fn save(&self, bytes: &[u8]) -> SaveResult {
        self.saved.lock().unwrap().push(bytes.to_vec());
        self.result.clone()
    }
}

pub struct FixedPicker {
    path: Option<PathBuf>,
    proposed: Mutex<Vec<String>>,
}

impl FixedPicker {
    pub fn cancel() -> Self {
        Self {
            path: None,
            proposed: Mutex::new(Vec::new()),
        }
    }

    pub fn to(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            proposed: Mutex::new(Vec::new()),
        }
    }

    pub fn proposed_names(&self) -> Vec<String> {
        self.proposed.lock().unwrap().clone()
    }
}

#[async_trait]
impl DestinationPicker for FixedPicker {
    async fn pick(&self, default_name: &str, _extension: &str) -> Option<PathBuf> {
        self.proposed.lock().unwrap().push(default_name.to_string());
        self.path.clone()
    }
}

#[derive(Default)]
pub struct RecordingAlerts {
    accept_confirm: bool,
    errors: Mutex<Vec<(String, String)>>,
    confirmations: Mutex<Vec<String>>,
    notifications: Mutex<Vec<(String, String)>>,
    opened: Mutex<Vec<String>>,
}

impl RecordingAlerts {
    pub fn accepting() -> Self {
        Self {
            accept_confirm: true,
            ..Self::default()
        }
    }

    pub fn errors(&self) -> Vec<(String, String)> {
        self.errors.lock().unwrap().clone()
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.confirmations.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl Alerts for RecordingAlerts {
    async fn error(&self, title: &str, message: &str) {
        self.errors
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }

    async fn confirm(&self, title: &str, _message: &str, _accept_label: &str) -> bool {
        self.confirmations.lock().unwrap().push(title.to_string());
        self.accept_confirm
    }

    fn notify(&self, title: &str, body: &str) {
        self.notifications
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }

    fn open_url(&self, url: &str) {
        self.opened.lock().unwrap().push(url.to_string());
    }
}
