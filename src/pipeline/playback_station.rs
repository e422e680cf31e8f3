//! Playback station: plays synthesized utterances strictly in queue order.

use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::SynthesizedUtterance;
use crate::playback::sink::PlaybackSink;
use std::sync::{Arc, Mutex};

/// Terminal station consuming the ordered handoff queue.
///
/// Entries arrive FIFO in recognition order; the playback gate serializes
/// the sink write so two utterances are never audible at the same time.
/// Sentinel entries (`audio: None`) are skipped with a note — they must not
/// stall the queue, otherwise one failed synthesis would silence everything
/// after it.
pub struct PlaybackStation {
    sink: Box<dyn PlaybackSink>,
    playback_gate: Arc<Mutex<()>>,
    last_played: Option<u64>,
    quiet: bool,
}

impl PlaybackStation {
    /// Creates a playback station sharing the given playback gate.
    pub fn new(sink: Box<dyn PlaybackSink>, playback_gate: Arc<Mutex<()>>) -> Self {
        Self {
            sink,
            playback_gate,
            last_played: None,
            quiet: false,
        }
    }

    /// Suppress warning output.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Sequence id of the most recently played utterance.
    pub fn last_played(&self) -> Option<u64> {
        self.last_played
    }
}

impl Station for PlaybackStation {
    type Input = SynthesizedUtterance;
    type Output = ();

    fn name(&self) -> &'static str {
        "playback"
    }

    fn process(
        &mut self,
        utterance: SynthesizedUtterance,
    ) -> Result<Option<()>, StationError> {
        let Some(audio) = utterance.audio else {
            if !self.quiet {
                eprintln!(
                    "dolmet: skipping utterance {} — no audio to play",
                    utterance.sequence_id
                );
            }
            return Ok(None);
        };

        {
            let _playing = self
                .playback_gate
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            self.sink.play(&audio).map_err(|e| {
                StationError::Recoverable(format!(
                    "utterance {} not played: {e}",
                    utterance.sequence_id
                ))
            })?;
        }

        self.last_played = Some(utterance.sequence_id);
        Ok(Some(()))
    }
}
