//! Playback sink trait for synthesized audio.

use crate::error::Result;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Trait for audio playback.
///
/// `play` runs the audio through the output device synchronously, returning
/// only when playback has completed. One playback at a time; the caller
/// serializes.
pub trait PlaybackSink: Send {
    /// Play audio bytes to completion.
    fn play(&mut self, audio: &[u8]) -> Result<()>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// One recorded playback for [`MockPlaybackSink`].
#[derive(Debug, Clone)]
pub struct RecordedPlayback {
    /// The audio bytes that were played.
    pub audio: Vec<u8>,
    /// When playback started.
    pub started: Instant,
    /// When playback finished.
    pub finished: Instant,
}

/// Mock sink that records every playback with start/finish instants.
///
/// `playbacks()` can be read while the pipeline is still running — the record
/// is shared, so tests keep a clone of the sink.
#[derive(Clone, Default)]
pub struct MockPlaybackSink {
    playbacks: Arc<Mutex<Vec<RecordedPlayback>>>,
    play_duration: std::time::Duration,
    fail_with: Option<String>,
}

impl MockPlaybackSink {
    /// Create a sink that completes playback instantly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate each playback taking `duration`.
    pub fn with_play_duration(mut self, duration: std::time::Duration) -> Self {
        self.play_duration = duration;
        self
    }

    /// Fail every play call with the given message.
    pub fn with_failure(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    /// Everything played so far, in play order.
    pub fn playbacks(&self) -> Vec<RecordedPlayback> {
        self.playbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Played audio buffers only, in play order.
    pub fn played_audio(&self) -> Vec<Vec<u8>> {
        self.playbacks().into_iter().map(|p| p.audio).collect()
    }
}

impl PlaybackSink for MockPlaybackSink {
    fn play(&mut self, audio: &[u8]) -> Result<()> {
        if let Some(ref message) = self.fail_with {
            return Err(crate::error::DolmetError::Playback {
                message: message.clone(),
            });
        }

        let started = Instant::now();
        if !self.play_duration.is_zero() {
            std::thread::sleep(self.play_duration);
        }
        let finished = Instant::now();

        self.playbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedPlayback {
                audio: audio.to_vec(),
                started,
                finished,
            });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
