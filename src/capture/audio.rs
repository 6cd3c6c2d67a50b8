//! cpal capture backend
//!
//! `screen:` sources record the default output device (loopback on hosts that
//! support it); `audio:<device>` sources record the named input device.
//! Samples are buffered as 16-bit little-endian PCM and wrapped in a WAV
//! container at finalize time.

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use log::{debug, error, info, warn};
use std::io::Cursor;
use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;

use crate::capture::config::{CaptureSource, SourceKind};
use crate::capture::content_provider::ContentProvider;
use crate::capture::stream::{AudioStream, CaptureBackend};
use crate::error::RecorderError;

/// Input device names that indicate a system mix rather than a microphone
const LOOPBACK_HINTS: [&str; 5] = ["monitor", "loopback", "stereo mix", "blackhole", "soundflower"];

pub fn is_loopback_device(name: &str) -> bool {
    let name = name.to_lowercase();
    LOOPBACK_HINTS.iter().any(|hint| name.contains(hint))
}

pub struct CpalContentProvider;

#[async_trait]
impl ContentProvider for CpalContentProvider {
    async fn sources(&self) -> Result<Vec<CaptureSource>, RecorderError> {
        tokio::task::spawn_blocking(enumerate_sources)
            .await
            .map_err(|e| RecorderError::Stream(format!("Device enumeration failed: {}", e)))?
    }
}

fn enumerate_sources() -> Result<Vec<CaptureSource>, RecorderError> {
    let host = cpal::default_host();
    let mut sources = Vec::new();

    if host.default_output_device().is_some() {
        sources.push(CaptureSource::new("screen:0", "Entire screen"));
    }

    let devices = host
        .input_devices()
        .map_err(|e| RecorderError::Stream(format!("Failed to enumerate input devices: {}", e)))?;
    for device in devices {
        let Ok(name) = device.name() else {
            continue;
        };
        if is_loopback_device(&name) {
            sources.push(CaptureSource::new(
                format!("audio:{}", name),
                format!("System Audio ({})", name),
            ));
        }
    }

    debug!("Enumerated capture sources: {:?}", sources);
    Ok(sources)
}

pub struct CpalBackend;

impl CaptureBackend for CpalBackend {
    fn open(&self, source: &CaptureSource) -> Result<Box<dyn AudioStream>, RecorderError> {
        Ok(Box::new(CpalStream::spawn(source.clone())?))
    }

    fn file_extension(&self) -> &'static str {
        "wav"
    }
}

enum Control {
    Pause,
    Resume,
    Close,
}

/// cpal streams are not `Send`, so each one lives on its own thread and is
/// driven through a control channel.
struct CpalStream {
    control: mpsc::Sender<Control>,
    buffer: Arc<Mutex<Vec<u8>>>,
    spec: hound::WavSpec,
    thread: Option<JoinHandle<()>>,
}

impl CpalStream {
    fn spawn(source: CaptureSource) -> Result<Self, RecorderError> {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let (control, control_rx) = mpsc::channel();
        let (opened_tx, opened_rx) = mpsc::channel();

        let sink = buffer.clone();
        let thread = std::thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || {
                let stream = match build_stream(&source, sink) {
                    Ok((stream, spec)) => {
                        let _ = opened_tx.send(Ok(spec));
                        stream
                    }
                    Err(e) => {
                        let _ = opened_tx.send(Err(e));
                        return;
                    }
                };

                while let Ok(command) = control_rx.recv() {
                    let result = match command {
                        Control::Pause => stream.pause(),
                        Control::Resume => stream.play(),
                        Control::Close => break,
                    };
                    if let Err(e) = result {
                        warn!("Capture stream control failed: {}", e);
                    }
                }
                debug!("Capture thread exiting");
            })?;

        let spec = opened_rx
            .recv()
            .map_err(|_| RecorderError::Stream("capture thread exited during setup".into()))??;

        Ok(Self {
            control,
            buffer,
            spec,
            thread: Some(thread),
        })
    }

    fn send(&self, command: Control) -> Result<(), RecorderError> {
        self.control
            .send(command)
            .map_err(|_| RecorderError::Stream("capture thread is gone".into()))
    }

    fn drain(&self) -> Vec<u8> {
        self.buffer
            .lock()
            .map(|mut buffer| std::mem::take(&mut *buffer))
            .unwrap_or_default()
    }
}

impl AudioStream for CpalStream {
    fn pause(&mut self) -> Result<(), RecorderError> {
        self.send(Control::Pause)
    }

    fn resume(&mut self) -> Result<(), RecorderError> {
        self.send(Control::Resume)
    }

    fn take_chunk(&mut self) -> Vec<u8> {
        self.drain()
    }

    fn close(&mut self) -> Vec<u8> {
        let _ = self.send(Control::Close);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Capture thread panicked");
            }
        }
        self.drain()
    }

    fn finalize(&self, data: Vec<u8>) -> Vec<u8> {
        match encode_wav(self.spec, &data) {
            Ok(wav) => wav,
            Err(e) => {
                error!("Failed to encode WAV container, saving raw PCM: {}", e);
                data
            }
        }
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        let _ = self.control.send(Control::Close);
    }
}

fn encode_wav(spec: hound::WavSpec, pcm: &[u8]) -> Result<Vec<u8>, hound::Error> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for sample in pcm.chunks_exact(2) {
            writer.write_sample(i16::from_le_bytes([sample[0], sample[1]]))?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

fn build_stream(
    source: &CaptureSource,
    sink: Arc<Mutex<Vec<u8>>>,
) -> Result<(Stream, hound::WavSpec), RecorderError> {
    let host = cpal::default_host();

    let (device, config) = match source.kind {
        SourceKind::Audio => {
            let name = source.id.trim_start_matches("audio:");
            let device = host
                .input_devices()
                .map_err(|e| RecorderError::Stream(format!("Failed to get devices: {}", e)))?
                .find(|d| d.name().ok().as_deref() == Some(name))
                .ok_or_else(|| RecorderError::Stream(format!("Device '{}' not found", name)))?;
            let config = device
                .default_input_config()
                .map_err(|e| RecorderError::Stream(format!("Failed to get input config: {}", e)))?;
            (device, config)
        }
        SourceKind::Screen | SourceKind::Window => {
            let device = host
                .default_output_device()
                .ok_or_else(|| RecorderError::Stream("No default output device found".into()))?;
            let config = device
                .default_output_config()
                .map_err(|e| RecorderError::Stream(format!("Failed to get output config: {}", e)))?;
            (device, config)
        }
    };

    info!(
        "Capturing {}: {} Hz, {} ch, {:?}",
        source.id,
        config.sample_rate().0,
        config.channels(),
        config.sample_format()
    );

    let spec = hound::WavSpec {
        channels: config.channels(),
        sample_rate: config.sample_rate().0,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let sample_format = config.sample_format();
    let stream_config: StreamConfig = config.into();
    let on_error = |e: cpal::StreamError| error!("Capture stream error: {}", e);

    let stream = match sample_format {
        SampleFormat::F32 => device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                append_samples(&sink, data.iter().map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16));
            },
            on_error,
            None,
        ),
        SampleFormat::I16 => device.build_input_stream(
            &stream_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                append_samples(&sink, data.iter().copied());
            },
            on_error,
            None,
        ),
        SampleFormat::U16 => device.build_input_stream(
            &stream_config,
            move |data: &[u16], _: &cpal::InputCallbackInfo| {
                append_samples(&sink, data.iter().map(|&s| (s as i32 - 32768) as i16));
            },
            on_error,
            None,
        ),
        other => {
            return Err(RecorderError::Stream(format!(
                "Unsupported sample format: {:?}",
                other
            )))
        }
    }
    .map_err(|e| RecorderError::Stream(format!("Failed to build input stream: {}", e)))?;

    stream
        .play()
        .map_err(|e| RecorderError::Stream(format!("Failed to start stream: {}", e)))?;

    Ok((stream, spec))
}

fn append_samples(sink: &Mutex<Vec<u8>>, samples: impl Iterator<Item = i16>) {
    if let Ok(mut buffer) = sink.lock() {
        for sample in samples {
            buffer.extend_from_slice(&sample.to_le_bytes());
        }
    }
}
