pub mod sink;

pub use sink::{default_file_name, DestinationPicker, FileSaveSink, SaveResult, SaveSink};
