//! Utterance segmentation over a streaming recognition engine.
//!
//! The engine decides segment boundaries; the segmenter drives it one chunk
//! at a time, filters noise recognitions, and assigns sequence ids.

use crate::error::Result;
use crate::output;
use crate::pipeline::types::{AudioChunk, Utterance};
use crate::recognize::engine::SpeechRecognizer;

/// Drives a recognition engine chunk by chunk and emits finalized utterances.
///
/// One `feed` per chunk, in arrival order — chunks are never skipped or
/// reordered. `flush` must be called exactly once, at end-of-stream.
pub struct Segmenter {
    engine: Box<dyn SpeechRecognizer>,
    /// Lowercased noise recognitions to discard.
    noise_words: Vec<String>,
    next_sequence: u64,
    /// True while inside a contiguous run of discarded utterances.
    in_silence_run: bool,
    /// Number of silence runs seen so far.
    silence_runs: u64,
    quiet: bool,
}

impl Segmenter {
    /// Creates a segmenter over a recognition engine.
    pub fn new(engine: Box<dyn SpeechRecognizer>) -> Self {
        Self {
            engine,
            noise_words: Vec::new(),
            next_sequence: 0,
            in_silence_run: false,
            silence_runs: 0,
            quiet: false,
        }
    }

    /// Set noise words (pre-lowercased for exact comparison).
    pub fn with_noise_words(mut self, words: &[&str]) -> Self {
        self.noise_words = words.iter().map(|w| w.to_lowercase()).collect();
        self
    }

    /// Suppress the silence indicator output.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Feed one chunk. Returns a finalized utterance when the engine closed a
    /// segment whose text survives the noise filter.
    pub fn feed(&mut self, chunk: &AudioChunk) -> Result<Option<Utterance>> {
        if !self.engine.accept_waveform(&chunk.bytes)? {
            return Ok(None);
        }
        let text = self.engine.result()?;
        Ok(self.accept(text, false))
    }

    /// Drain the engine's buffered state at end-of-stream.
    ///
    /// Returns the final pending utterance, or `None` when the stream ended
    /// in silence. Call exactly once.
    pub fn flush(&mut self) -> Result<Option<Utterance>> {
        let text = self.engine.final_result()?;
        Ok(self.accept(text, true))
    }

    /// Number of contiguous silence runs seen so far.
    pub fn silence_runs(&self) -> u64 {
        self.silence_runs
    }

    fn accept(&mut self, text: String, is_final: bool) -> Option<Utterance> {
        let trimmed = text.trim();
        let lowered = trimmed.to_lowercase();
        if trimmed.is_empty() || self.noise_words.iter().any(|w| w == &lowered) {
            // Indicate silence once per contiguous run, not per chunk
            if !self.in_silence_run {
                self.in_silence_run = true;
                self.silence_runs += 1;
                if !self.quiet {
                    output::print_silence();
                }
            }
            return None;
        }

        self.in_silence_run = false;
        let sequence_id = self.next_sequence;
        self.next_sequence += 1;
        Some(Utterance::new(sequence_id, trimmed.to_string(), is_final))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognize::engine::MockRecognizer;

    fn chunk() -> AudioChunk {
        AudioChunk::new(vec![0u8; 4000])
    }

    #[test]
    fn test_feed_forwards_finalized_segments_in_order() {
        let engine = MockRecognizer::new().with_script(vec![
            None,
            Some("hello world"),
            None,
            Some("goodbye"),
        ]);
        let mut segmenter = Segmenter::new(Box::new(engine)).with_quiet(true);

        assert_eq!(segmenter.feed(&chunk()).unwrap(), None);
        let first = segmenter.feed(&chunk()).unwrap().unwrap();
        assert_eq!(segmenter.feed(&chunk()).unwrap(), None);
        let second = segmenter.feed(&chunk()).unwrap().unwrap();

        assert_eq!(first.sequence_id, 0);
        assert_eq!(first.source_text, "hello world");
        assert!(!first.is_final);
        assert_eq!(second.sequence_id, 1);
        assert_eq!(second.source_text, "goodbye");
    }

    #[test]
    fn test_empty_recognitions_are_discarded() {
        let engine = MockRecognizer::new().with_script(vec![Some(""), Some("   "), Some("real")]);
        let mut segmenter = Segmenter::new(Box::new(engine)).with_quiet(true);

        assert_eq!(segmenter.feed(&chunk()).unwrap(), None);
        assert_eq!(segmenter.feed(&chunk()).unwrap(), None);
        let utt = segmenter.feed(&chunk()).unwrap().unwrap();
        // Discarded recognitions consume no sequence ids
        assert_eq!(utt.sequence_id, 0);
    }

    #[test]
    fn test_noise_words_are_discarded_case_insensitively() {
        let engine = MockRecognizer::new().with_script(vec![Some("The"), Some("the quick fox")]);
        let mut segmenter = Segmenter::new(Box::new(engine))
            .with_noise_words(&["the"])
            .with_quiet(true);

        assert_eq!(segmenter.feed(&chunk()).unwrap(), None);
        // Only an exact match is noise, not a prefix
        let utt = segmenter.feed(&chunk()).unwrap().unwrap();
        assert_eq!(utt.source_text, "the quick fox");
    }

    #[test]
    fn test_silence_indicated_once_per_contiguous_run() {
        let engine = MockRecognizer::new().with_script(vec![
            Some(""),
            Some(""),
            Some("speech"),
            Some(""),
            Some(""),
            Some(""),
        ]);
        let mut segmenter = Segmenter::new(Box::new(engine)).with_quiet(true);

        for _ in 0..6 {
            let _ = segmenter.feed(&chunk()).unwrap();
        }

        // Two runs: before and after the spoken segment
        assert_eq!(segmenter.silence_runs(), 2);
    }

    #[test]
    fn test_flush_yields_final_utterance_when_speech_pending() {
        let engine = MockRecognizer::new().with_final_text("last words");
        let mut segmenter = Segmenter::new(Box::new(engine)).with_quiet(true);

        let utt = segmenter.flush().unwrap().unwrap();
        assert!(utt.is_final);
        assert_eq!(utt.source_text, "last words");
    }

    #[test]
    fn test_flush_yields_nothing_after_silence() {
        let engine = MockRecognizer::new().with_final_text("");
        let mut segmenter = Segmenter::new(Box::new(engine)).with_quiet(true);

        assert_eq!(segmenter.flush().unwrap(), None);
        assert_eq!(segmenter.silence_runs(), 1);
    }

    #[test]
    fn test_sequence_ids_span_feed_and_flush() {
        let engine = MockRecognizer::new()
            .with_script(vec![Some("first")])
            .with_final_text("second");
        let mut segmenter = Segmenter::new(Box::new(engine)).with_quiet(true);

        let first = segmenter.feed(&chunk()).unwrap().unwrap();
        let second = segmenter.flush().unwrap().unwrap();
        assert_eq!(first.sequence_id, 0);
        assert_eq!(second.sequence_id, 1);
    }

    #[test]
    fn test_engine_failure_propagates() {
        let engine = MockRecognizer::new().with_failure();
        let mut segmenter = Segmenter::new(Box::new(engine)).with_quiet(true);
        assert!(segmenter.feed(&chunk()).is_err());
    }
}
