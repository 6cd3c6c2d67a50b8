use crate::capture::config::CaptureSource;
use crate::error::RecorderError;

/// Opens capture streams for resolved sources
pub trait CaptureBackend: Send + Sync {
    fn open(&self, source: &CaptureSource) -> Result<Box<dyn AudioStream>, RecorderError>;

    /// Extension of the container produced by [`AudioStream::finalize`]
    fn file_extension(&self) -> &'static str {
        "webm"
    }
}

/// A live capture stream.
///
/// The stream buffers encoded data internally; the owner pulls it out on its
/// own cadence with [`take_chunk`](AudioStream::take_chunk).
pub trait AudioStream: Send {
    fn pause(&mut self) -> Result<(), RecorderError>;

    fn resume(&mut self) -> Result<(), RecorderError>;

    /// Bytes captured since the previous flush. Empty when nothing arrived.
    fn take_chunk(&mut self) -> Vec<u8>;

    /// Stop capturing and return whatever was still buffered.
    fn close(&mut self) -> Vec<u8>;

    /// Wrap the concatenated chunk data into the stream's output container.
    fn finalize(&self, data: Vec<u8>) -> Vec<u8> {
        data
    }
}
