use async_trait::async_trait;

use crate::capture::config::CaptureSource;
use crate::error::RecorderError;

/// Enumerates capturable endpoints. Called fresh for every start; nothing is cached.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn sources(&self) -> Result<Vec<CaptureSource>, RecorderError>;
}

/// Pick the candidate that represents system audio.
///
/// Rules are tried in priority order and the first rule with any match wins,
/// regardless of where the candidate sits in the list:
/// 1. id starts with `audio:`
/// 2. id starts with `screen:`
/// 3. name contains "system audio" (case-insensitive)
/// 4. name contains "系统音频"
///
/// The ordering is a heuristic. When different rules match different entries
/// the higher rule wins even if a lower rule names the system mix more precisely.
pub fn resolve_audio_source(candidates: &[CaptureSource]) -> Result<CaptureSource, RecorderError> {
    let rules: [fn(&CaptureSource) -> bool; 4] = [
        |s| s.id.starts_with("audio:"),
        |s| s.id.starts_with("screen:"),
        |s| s.name.to_lowercase().contains("system audio"),
        |s| s.name.contains("系统音频"),
    ];

    rules
        .iter()
        .find_map(|rule| candidates.iter().find(|s| rule(s)))
        .cloned()
        .ok_or(RecorderError::NoAudioSourceFound)
}
