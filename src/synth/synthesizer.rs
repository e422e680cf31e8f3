//! Synthesizer trait for text-to-speech conversion.

use crate::error::Result;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Trait for speech synthesis.
///
/// This trait allows swapping implementations (real TTS server vs mock).
///
/// `Ok(None)` means the engine answered but produced no usable audio (wrong
/// content type, empty body). Transport failures are `Err`. Callers must turn
/// both into an explicit no-result entry for the playback consumer — the
/// consumer must never block waiting for audio that will not arrive.
pub trait Synthesizer: Send + Sync {
    /// Synthesize text to playable audio bytes.
    fn synthesize(&self, text: &str) -> Result<Option<Vec<u8>>>;

    /// Name of the engine for logging.
    fn name(&self) -> &str;
}

/// One scripted response for [`MockSynthesizer`].
#[derive(Debug, Clone)]
pub struct ScriptedSynthesis {
    /// Simulated engine latency before the call returns.
    pub latency: Duration,
    /// The result: audio bytes, explicit no-audio, or a transport error.
    pub outcome: ScriptedOutcome,
}

#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Return the given audio bytes.
    Audio(Vec<u8>),
    /// Return the input text as audio bytes (lets tests correlate output).
    EchoText,
    /// Return `Ok(None)` — engine produced no audio.
    NoAudio,
    /// Return a synthesis error.
    Fail(String),
}

impl ScriptedSynthesis {
    /// Echo the text back after `latency`.
    pub fn echo(latency: Duration) -> Self {
        Self {
            latency,
            outcome: ScriptedOutcome::EchoText,
        }
    }

    /// Produce no audio after `latency`.
    pub fn no_audio(latency: Duration) -> Self {
        Self {
            latency,
            outcome: ScriptedOutcome::NoAudio,
        }
    }

    /// Fail with an engine error after `latency`.
    pub fn fail(latency: Duration, message: &str) -> Self {
        Self {
            latency,
            outcome: ScriptedOutcome::Fail(message.to_string()),
        }
    }
}

/// Mock synthesizer for testing.
///
/// Pops one scripted response per call; once the script is exhausted, every
/// call echoes the input text as audio bytes with no latency.
pub struct MockSynthesizer {
    script: Mutex<VecDeque<ScriptedSynthesis>>,
    calls: Mutex<Vec<String>>,
}

impl MockSynthesizer {
    /// Create a mock that echoes text immediately.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Configure scripted responses, consumed in call order.
    pub fn with_script(self, script: Vec<ScriptedSynthesis>) -> Self {
        *self.script.lock().unwrap_or_else(|e| e.into_inner()) = script.into();
        self
    }

    /// Texts passed to `synthesize`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer for MockSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Option<Vec<u8>>> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        let Some(scripted) = scripted else {
            return Ok(Some(text.as_bytes().to_vec()));
        };

        if !scripted.latency.is_zero() {
            std::thread::sleep(scripted.latency);
        }

        match scripted.outcome {
            ScriptedOutcome::Audio(bytes) => Ok(Some(bytes)),
            ScriptedOutcome::EchoText => Ok(Some(text.as_bytes().to_vec())),
            ScriptedOutcome::NoAudio => Ok(None),
            ScriptedOutcome::Fail(message) => Err(crate::error::DolmetError::Synthesis { message }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_echoes_text_by_default() {
        let synth = MockSynthesizer::new();
        let audio = synth.synthesize("hallo welt").unwrap();
        assert_eq!(audio, Some(b"hallo welt".to_vec()));
    }

    #[test]
    fn test_mock_scripted_no_audio_then_echo() {
        let synth = MockSynthesizer::new()
            .with_script(vec![ScriptedSynthesis::no_audio(Duration::ZERO)]);

        assert_eq!(synth.synthesize("first").unwrap(), None);
        // Script exhausted — falls back to echo
        assert_eq!(synth.synthesize("second").unwrap(), Some(b"second".to_vec()));
    }

    #[test]
    fn test_mock_scripted_failure() {
        let synth = MockSynthesizer::new().with_script(vec![ScriptedSynthesis::fail(
            Duration::ZERO,
            "server gone",
        )]);

        let err = synth.synthesize("text").unwrap_err();
        assert!(err.to_string().contains("server gone"));
    }

    #[test]
    fn test_mock_records_calls_in_order() {
        let synth = MockSynthesizer::new();
        synth.synthesize("one").unwrap();
        synth.synthesize("two").unwrap();
        assert_eq!(synth.calls(), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_synthesizer_trait_is_object_safe() {
        let synth: Box<dyn Synthesizer> = Box::new(MockSynthesizer::new());
        assert_eq!(synth.name(), "mock");
    }
}
