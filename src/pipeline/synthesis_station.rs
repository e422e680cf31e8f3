//! Synthesis station: converts translated text to audio via the TTS engine.

use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::{SynthesizedUtterance, TranslatedUtterance};
use crate::synth::synthesizer::Synthesizer;
use std::sync::{Arc, Mutex};

/// Station that issues synthesis calls strictly one at a time.
///
/// A stateful TTS server can answer a short request faster than an earlier
/// long one; issuing call N+1 only after call N returned fixes result order
/// at the point entries reach the handoff queue. The issuance gate makes the
/// critical section explicit and keeps ordering intact even if more than one
/// synthesis worker is ever wired up.
///
/// Every input produces exactly one output entry. A failed or empty
/// synthesis yields the `audio: None` sentinel — the playback consumer must
/// always receive a value for each started utterance or it would block
/// forever waiting for one that never arrives.
pub struct SynthesisStation {
    synthesizer: Arc<dyn Synthesizer>,
    issuance_gate: Arc<Mutex<()>>,
    quiet: bool,
}

impl SynthesisStation {
    /// Creates a synthesis station sharing the given issuance gate.
    pub fn new(synthesizer: Arc<dyn Synthesizer>, issuance_gate: Arc<Mutex<()>>) -> Self {
        Self {
            synthesizer,
            issuance_gate,
            quiet: false,
        }
    }

    /// Suppress warning output.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

impl Station for SynthesisStation {
    type Input = TranslatedUtterance;
    type Output = SynthesizedUtterance;

    fn name(&self) -> &'static str {
        "synthesis"
    }

    fn process(
        &mut self,
        utterance: TranslatedUtterance,
    ) -> Result<Option<SynthesizedUtterance>, StationError> {
        let audio = {
            let _issued = self
                .issuance_gate
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            match self.synthesizer.synthesize(&utterance.translated_text) {
                Ok(Some(audio)) => Some(audio),
                Ok(None) => {
                    if !self.quiet {
                        eprintln!(
                            "dolmet: no audio for utterance {} (\"{}\")",
                            utterance.sequence_id, utterance.translated_text
                        );
                    }
                    None
                }
                Err(e) => {
                    if !self.quiet {
                        eprintln!("dolmet: utterance {}: {e}", utterance.sequence_id);
                    }
                    None
                }
            }
        };

        Ok(Some(SynthesizedUtterance::new(utterance, audio)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::Utterance;
    use crate::synth::synthesizer::{MockSynthesizer, ScriptedSynthesis};
    use std::time::Duration;

    fn translated(id: u64, text: &str) -> TranslatedUtterance {
        TranslatedUtterance::new(Utterance::new(id, "src".to_string(), false), text.to_string())
    }

    #[test]
    fn test_successful_synthesis_carries_audio() {
        let synthesizer = Arc::new(MockSynthesizer::new());
        let mut station =
            SynthesisStation::new(synthesizer, Arc::new(Mutex::new(()))).with_quiet(true);

        let out = station.process(translated(4, "hallo")).unwrap().unwrap();
        assert_eq!(out.sequence_id, 4);
        assert_eq!(out.audio, Some(b"hallo".to_vec()));
    }

    #[test]
    fn test_no_audio_becomes_sentinel_not_silence() {
        let synthesizer = Arc::new(
            MockSynthesizer::new().with_script(vec![ScriptedSynthesis::no_audio(Duration::ZERO)]),
        );
        let mut station =
            SynthesisStation::new(synthesizer, Arc::new(Mutex::new(()))).with_quiet(true);

        // The entry still flows downstream, with audio: None
        let out = station.process(translated(1, "kaputt")).unwrap().unwrap();
        assert_eq!(out.audio, None);
    }

    #[test]
    fn test_engine_error_becomes_sentinel_not_station_error() {
        let synthesizer = Arc::new(MockSynthesizer::new().with_script(vec![
            ScriptedSynthesis::fail(Duration::ZERO, "server crashed"),
        ]));
        let mut station =
            SynthesisStation::new(synthesizer, Arc::new(Mutex::new(()))).with_quiet(true);

        let out = station.process(translated(2, "text")).unwrap().unwrap();
        assert_eq!(out.audio, None);
    }

    #[test]
    fn test_issuance_gate_is_held_during_call() {
        let gate = Arc::new(Mutex::new(()));
        let synthesizer = Arc::new(
            MockSynthesizer::new()
                .with_script(vec![ScriptedSynthesis::echo(Duration::from_millis(200))]),
        );
        let observer = synthesizer.clone();
        let mut station = SynthesisStation::new(synthesizer, gate.clone()).with_quiet(true);

        let probe_gate = gate.clone();
        let worker = std::thread::spawn(move || {
            station.process(translated(0, "slow")).unwrap();
        });

        // The mock records the call at entry, inside the critical section:
        // once a call is visible the gate must be held.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while observer.calls().is_empty() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(!observer.calls().is_empty(), "synthesis never started");
        assert!(probe_gate.try_lock().is_err());

        worker.join().unwrap();
        assert!(probe_gate.try_lock().is_ok());
    }
}
