//! Translation pipeline that runs from startup until shutdown.
//!
//! One loop thread drives source → segmenter → translator; a synthesis
//! station and a playback station run in their own threads behind bounded
//! channels. The channel from synthesis to playback is the ordered handoff
//! queue: issuance serialization upstream means its entries are already in
//! recognition order.

use crate::audio::source::AudioSource;
use crate::error::Result;
use crate::output;
use crate::pipeline::error::{ErrorReporter, LogReporter};
use crate::pipeline::playback_station::PlaybackStation;
use crate::pipeline::station::StationRunner;
use crate::pipeline::synthesis_station::SynthesisStation;
use crate::pipeline::types::{TranslatedUtterance, Utterance};
use crate::playback::sink::PlaybackSink;
use crate::recognize::segmenter::Segmenter;
use crate::synth::synthesizer::Synthesizer;
use crate::translate::translator::Translator;
use crossbeam_channel::bounded;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Suppress recognition/translation output
    pub quiet: bool,
    /// Verbosity level (0=results only, 1=diagnostics)
    pub verbosity: u8,
    /// Utterances buffered between translation and synthesis
    pub synthesis_buffer: usize,
    /// Synthesized utterances buffered ahead of playback
    pub handoff_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quiet: false,
            verbosity: 0,
            synthesis_buffer: crate::defaults::SYNTHESIS_BUFFER,
            handoff_buffer: crate::defaults::HANDOFF_BUFFER,
        }
    }
}

/// Handle to a running pipeline.
pub struct PipelineHandle {
    /// Flag to signal shutdown
    running: Arc<AtomicBool>,
    /// Join handles for spawned threads
    threads: Vec<JoinHandle<()>>,
}

impl PipelineHandle {
    /// Returns true if stop has not been requested.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns true once every pipeline thread has exited on its own
    /// (finite source exhausted and all queued utterances played).
    pub fn is_finished(&self) -> bool {
        self.threads.iter().all(|h| h.is_finished())
    }

    /// Stops the pipeline and waits for its threads.
    ///
    /// In-flight synthesis and playback may either complete or be abandoned;
    /// after the deadline remaining threads are detached — they die with the
    /// process and hold no lock a later run could need.
    pub fn stop(mut self) {
        // Signal shutdown
        self.running.store(false, Ordering::SeqCst);

        let deadline = Instant::now() + Duration::from_secs(5);
        let poll_interval = Duration::from_millis(50);

        loop {
            // Drain finished threads, joining each to catch panics
            let mut remaining = Vec::new();
            for handle in self.threads.drain(..) {
                if handle.is_finished() {
                    if let Err(panic_info) = handle.join() {
                        let msg = panic_info
                            .downcast_ref::<&str>()
                            .copied()
                            .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                            .unwrap_or("unknown panic");
                        eprintln!("dolmet: pipeline thread panicked: {msg}");
                    }
                } else {
                    remaining.push(handle);
                }
            }
            self.threads = remaining;

            if self.threads.is_empty() {
                break;
            }

            if Instant::now() >= deadline {
                eprintln!(
                    "dolmet: shutdown timeout — {} thread(s) still running, detaching",
                    self.threads.len()
                );
                break;
            }

            thread::sleep(poll_interval);
        }
    }
}

/// Translation pipeline: AudioSource → Segmenter → Translator → Synthesis → Playback.
pub struct Pipeline {
    config: PipelineConfig,
    error_reporter: Arc<dyn ErrorReporter>,
}

impl Pipeline {
    /// Creates a new pipeline with the default error reporter.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            error_reporter: Arc::new(LogReporter),
        }
    }

    /// Sets a custom error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    /// Starts the pipeline.
    ///
    /// # Arguments
    /// * `source` - Audio byte-stream source
    /// * `segmenter` - Utterance segmentation over the recognition engine
    /// * `translator` - Text translation (called sequentially on the loop thread)
    /// * `synthesizer` - Text-to-speech engine
    /// * `sink` - Audio playback sink
    ///
    /// # Returns
    /// Handle to control and stop the pipeline
    pub fn start(
        self,
        mut source: Box<dyn AudioSource>,
        mut segmenter: Segmenter,
        mut translator: Box<dyn Translator>,
        synthesizer: Arc<dyn Synthesizer>,
        sink: Box<dyn PlaybackSink>,
    ) -> Result<PipelineHandle> {
        let running = Arc::new(AtomicBool::new(true));
        let quiet = self.config.quiet;

        // Create channels between stages
        let (synth_tx, synth_rx) = bounded(self.config.synthesis_buffer);
        let (handoff_tx, handoff_rx) = bounded(self.config.handoff_buffer);

        // The only shared mutable state besides the channels
        let issuance_gate = Arc::new(std::sync::Mutex::new(()));
        let playback_gate = Arc::new(std::sync::Mutex::new(()));

        let synthesis_station =
            SynthesisStation::new(synthesizer, issuance_gate).with_quiet(quiet);
        let playback_station =
            PlaybackStation::new(sink, playback_gate).with_quiet(quiet);

        let synthesis_runner = StationRunner::spawn(
            synthesis_station,
            synth_rx,
            handoff_tx,
            self.error_reporter.clone(),
        );

        // For the terminal station, create a dummy output channel
        let (play_out_tx, play_out_rx) = bounded::<()>(self.config.handoff_buffer);

        let playback_runner = StationRunner::spawn(
            playback_station,
            handoff_rx,
            play_out_tx,
            self.error_reporter.clone(),
        );

        // Drain the playback output in a separate thread
        let drain_running = running.clone();
        let drain_handle = thread::spawn(move || {
            loop {
                match play_out_rx.recv_timeout(Duration::from_millis(100)) {
                    Ok(()) => {}
                    Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                        if !drain_running.load(Ordering::SeqCst) {
                            break;
                        }
                    }
                    Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        // Start the audio source
        source.start()?;
        let source_is_finite = source.is_finite();

        // Spawn the recognition/translation loop thread
        let loop_running = running.clone();
        let loop_handle = thread::spawn(move || {
            let poll_interval = Duration::from_millis(16);
            let mut consecutive_errors: u32 = 0;
            const MAX_CONSECUTIVE_ERRORS: u32 = 10;

            while loop_running.load(Ordering::SeqCst) {
                let chunk = match source.read_chunk() {
                    Ok(chunk) => {
                        consecutive_errors = 0;
                        chunk
                    }
                    Err(e) => {
                        consecutive_errors += 1;
                        if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                            eprintln!(
                                "dolmet: audio source failed {consecutive_errors} times in a row: {e}"
                            );
                            break;
                        }
                        thread::sleep(poll_interval);
                        continue;
                    }
                };

                if chunk.is_empty() {
                    if source_is_finite {
                        // End-of-stream: the engine may still buffer speech
                        // that never crossed a segment boundary.
                        match segmenter.flush() {
                            Ok(Some(utterance)) => {
                                forward_utterance(utterance, translator.as_mut(), &synth_tx, quiet);
                            }
                            Ok(None) => {}
                            Err(e) => eprintln!("dolmet: final recognition failed: {e}"),
                        }
                        break;
                    }
                    // Live source: empty reads are normal while the capture
                    // process warms up. Keep polling.
                    thread::sleep(poll_interval);
                    continue;
                }

                match segmenter.feed(&chunk) {
                    Ok(Some(utterance)) => {
                        if !forward_utterance(utterance, translator.as_mut(), &synth_tx, quiet) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        // Engine refused this chunk; later chunks may still work
                        eprintln!("dolmet: recognition error: {e}");
                    }
                }
            }

            // Dropping synth_tx lets the stations drain and exit
            drop(synth_tx);

            if let Err(e) = source.stop() {
                eprintln!("dolmet: failed to stop audio source: {e}");
            }
        });

        // Collect all thread handles
        let mut threads = vec![loop_handle, drain_handle];

        threads.push(thread::spawn(move || {
            if let Err(msg) = synthesis_runner.join() {
                eprintln!("dolmet: {msg}");
            }
        }));
        threads.push(thread::spawn(move || {
            if let Err(msg) = playback_runner.join() {
                eprintln!("dolmet: {msg}");
            }
        }));

        Ok(PipelineHandle { running, threads })
    }
}

/// Translate one utterance and queue it for synthesis.
///
/// A translation failure removes the utterance from the pipeline (logged,
/// not played); nothing was queued, so ordering of the rest is unaffected.
/// Returns false when the synthesis channel is gone.
fn forward_utterance(
    utterance: Utterance,
    translator: &mut dyn Translator,
    synth_tx: &crossbeam_channel::Sender<TranslatedUtterance>,
    quiet: bool,
) -> bool {
    if !quiet {
        output::print_recognized(&utterance.source_text);
    }
    let translated = match translator.translate(&utterance.source_text) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("dolmet: utterance {} dropped: {e}", utterance.sequence_id);
            return true;
        }
    };
    if !quiet {
        output::print_translated(&translated);
    }
    synth_tx
        .send(TranslatedUtterance::new(utterance, translated))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::source::MockAudioSource;
    use crate::playback::sink::MockPlaybackSink;
    use crate::recognize::engine::MockRecognizer;
    use crate::synth::synthesizer::MockSynthesizer;
    use crate::translate::translator::MockTranslator;

    fn quiet_config() -> PipelineConfig {
        PipelineConfig {
            quiet: true,
            ..Default::default()
        }
    }

    fn wait_for_finish(handle: &PipelineHandle, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if handle.is_finished() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert!(!config.quiet);
        assert_eq!(config.verbosity, 0);
        assert_eq!(config.synthesis_buffer, 16);
        assert_eq!(config.handoff_buffer, 16);
    }

    #[test]
    fn test_handle_is_running() {
        let running = Arc::new(AtomicBool::new(true));
        let handle = PipelineHandle {
            running: running.clone(),
            threads: vec![],
        };

        assert!(handle.is_running());
        running.store(false, Ordering::SeqCst);
        assert!(!handle.is_running());
    }

    #[test]
    fn test_handle_stop_sets_running_false() {
        let running = Arc::new(AtomicBool::new(true));
        let handle = PipelineHandle {
            running: running.clone(),
            threads: vec![],
        };

        handle.stop();
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_pipeline_start_source_failure_is_fatal() {
        let pipeline = Pipeline::new(quiet_config());
        let source = Box::new(MockAudioSource::new().with_start_failure());
        let segmenter = Segmenter::new(Box::new(MockRecognizer::new())).with_quiet(true);

        let result = pipeline.start(
            source,
            segmenter,
            Box::new(MockTranslator::new()),
            Arc::new(MockSynthesizer::new()),
            Box::new(MockPlaybackSink::new()),
        );

        assert!(matches!(
            result,
            Err(crate::error::DolmetError::SourceStartup { .. })
        ));
    }

    #[test]
    fn test_pipeline_full_cycle_plays_translations_in_order() {
        let pipeline = Pipeline::new(quiet_config());

        let source = Box::new(MockAudioSource::new().with_uniform_chunks(3, 0));
        let engine = MockRecognizer::new().with_script(vec![
            Some("hello world"),
            None,
            Some("goodbye"),
        ]);
        let segmenter = Segmenter::new(Box::new(engine)).with_quiet(true);
        let translator = MockTranslator::new()
            .with_mapping("hello world", "hallo welt")
            .with_mapping("goodbye", "auf wiedersehen");
        let sink = MockPlaybackSink::new();
        let observer = sink.clone();

        let handle = pipeline
            .start(
                source,
                segmenter,
                Box::new(translator),
                Arc::new(MockSynthesizer::new()),
                Box::new(sink),
            )
            .unwrap();

        assert!(wait_for_finish(&handle, Duration::from_secs(5)));
        handle.stop();

        assert_eq!(
            observer.played_audio(),
            vec![b"hallo welt".to_vec(), b"auf wiedersehen".to_vec()]
        );
    }

    #[test]
    fn test_pipeline_translation_failure_drops_only_that_utterance() {
        let pipeline = Pipeline::new(quiet_config());

        let source = Box::new(MockAudioSource::new().with_uniform_chunks(2, 0));
        let engine = MockRecognizer::new().with_script(vec![Some("bad"), Some("good")]);
        let segmenter = Segmenter::new(Box::new(engine)).with_quiet(true);
        let translator = MockTranslator::new()
            .with_failure_on("bad")
            .with_mapping("good", "gut");
        let sink = MockPlaybackSink::new();
        let observer = sink.clone();

        let handle = pipeline
            .start(
                source,
                segmenter,
                Box::new(translator),
                Arc::new(MockSynthesizer::new()),
                Box::new(sink),
            )
            .unwrap();

        assert!(wait_for_finish(&handle, Duration::from_secs(5)));
        handle.stop();

        assert_eq!(observer.played_audio(), vec![b"gut".to_vec()]);
    }

    #[test]
    fn test_pipeline_flush_forwards_final_buffered_speech() {
        let pipeline = Pipeline::new(quiet_config());

        // No chunk finalizes; the final flush carries the pending words
        let source = Box::new(MockAudioSource::new().with_uniform_chunks(2, 0));
        let engine = MockRecognizer::new()
            .with_script(vec![None, None])
            .with_final_text("trailing words");
        let segmenter = Segmenter::new(Box::new(engine)).with_quiet(true);
        let sink = MockPlaybackSink::new();
        let observer = sink.clone();

        let handle = pipeline
            .start(
                source,
                segmenter,
                Box::new(MockTranslator::new()),
                Arc::new(MockSynthesizer::new()),
                Box::new(sink),
            )
            .unwrap();

        assert!(wait_for_finish(&handle, Duration::from_secs(5)));
        handle.stop();

        assert_eq!(
            observer.played_audio(),
            vec![b"trailing words (translated)".to_vec()]
        );
    }

    #[test]
    fn test_pipeline_persistent_read_errors_stop_the_loop() {
        let pipeline = Pipeline::new(quiet_config());

        let source = Box::new(MockAudioSource::new().with_read_failure());
        let segmenter = Segmenter::new(Box::new(MockRecognizer::new())).with_quiet(true);
        let translator = MockTranslator::new();
        let observer = translator.clone();

        let handle = pipeline
            .start(
                source,
                segmenter,
                Box::new(translator),
                Arc::new(MockSynthesizer::new()),
                Box::new(MockPlaybackSink::new()),
            )
            .unwrap();

        // 10 errors at 16ms poll ≈ 160ms; allow margin
        assert!(wait_for_finish(&handle, Duration::from_secs(5)));
        handle.stop();

        assert!(observer.calls().is_empty());
    }

    #[test]
    fn test_pipeline_stop_detaches_stuck_thread_within_deadline() {
        let running = Arc::new(AtomicBool::new(true));
        let stuck = thread::spawn(|| {
            thread::park();
        });

        let handle = PipelineHandle {
            running: running.clone(),
            threads: vec![stuck],
        };

        let start = Instant::now();
        handle.stop();
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_secs(10),
            "stop() took {elapsed:?} — should detach within the deadline"
        );
        assert!(!running.load(Ordering::SeqCst));
    }
}
