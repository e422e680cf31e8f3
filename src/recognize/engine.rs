//! Speech recognition engine boundary.

use crate::error::{DolmetError, Result};
use std::collections::VecDeque;

/// Trait for a streaming speech recognition engine.
///
/// The engine buffers acoustic state across calls and decides utterance
/// boundaries internally. This trait allows swapping implementations
/// (real Vosk vs mock).
pub trait SpeechRecognizer: Send {
    /// Feed one chunk of s16le mono PCM bytes.
    ///
    /// Returns `true` when the engine finalized a segment; the text is then
    /// available from `result`.
    fn accept_waveform(&mut self, pcm: &[u8]) -> Result<bool>;

    /// Text of the segment finalized by the last `accept_waveform` call.
    fn result(&mut self) -> Result<String>;

    /// Text of whatever the engine still buffers, at end-of-stream.
    fn final_result(&mut self) -> Result<String>;
}

/// Mock recognizer for testing.
///
/// Plays back a script: each `accept_waveform` call consumes one entry —
/// `None` keeps buffering, `Some(text)` finalizes a segment with that text.
/// Past the end of the script, nothing finalizes.
#[derive(Debug, Clone, Default)]
pub struct MockRecognizer {
    script: VecDeque<Option<String>>,
    pending_result: Option<String>,
    final_text: String,
    fed_bytes: usize,
    should_fail: bool,
}

impl MockRecognizer {
    /// Create a mock that never finalizes anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome of consecutive `accept_waveform` calls.
    pub fn with_script(mut self, script: Vec<Option<&str>>) -> Self {
        self.script = script
            .into_iter()
            .map(|entry| entry.map(str::to_string))
            .collect();
        self
    }

    /// Text that `final_result` reports at end-of-stream.
    pub fn with_final_text(mut self, text: &str) -> Self {
        self.final_text = text.to_string();
        self
    }

    /// Make every engine call fail.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Total bytes fed so far.
    pub fn fed_bytes(&self) -> usize {
        self.fed_bytes
    }
}

impl SpeechRecognizer for MockRecognizer {
    fn accept_waveform(&mut self, pcm: &[u8]) -> Result<bool> {
        if self.should_fail {
            return Err(DolmetError::Recognition {
                message: "mock recognizer failure".to_string(),
            });
        }
        self.fed_bytes += pcm.len();
        match self.script.pop_front().flatten() {
            Some(text) => {
                self.pending_result = Some(text);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn result(&mut self) -> Result<String> {
        if self.should_fail {
            return Err(DolmetError::Recognition {
                message: "mock recognizer failure".to_string(),
            });
        }
        Ok(self.pending_result.take().unwrap_or_default())
    }

    fn final_result(&mut self) -> Result<String> {
        if self.should_fail {
            return Err(DolmetError::Recognition {
                message: "mock recognizer failure".to_string(),
            });
        }
        Ok(std::mem::take(&mut self.final_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_plays_back_script() {
        let mut engine = MockRecognizer::new().with_script(vec![None, Some("hello"), None]);

        assert!(!engine.accept_waveform(&[0; 8]).unwrap());
        assert!(engine.accept_waveform(&[0; 8]).unwrap());
        assert_eq!(engine.result().unwrap(), "hello");
        assert!(!engine.accept_waveform(&[0; 8]).unwrap());
    }

    #[test]
    fn test_mock_past_script_never_finalizes() {
        let mut engine = MockRecognizer::new().with_script(vec![Some("only")]);
        assert!(engine.accept_waveform(&[0; 4]).unwrap());
        engine.result().unwrap();
        assert!(!engine.accept_waveform(&[0; 4]).unwrap());
        assert!(!engine.accept_waveform(&[0; 4]).unwrap());
    }

    #[test]
    fn test_mock_final_result_drains_once() {
        let mut engine = MockRecognizer::new().with_final_text("pending words");
        assert_eq!(engine.final_result().unwrap(), "pending words");
        assert_eq!(engine.final_result().unwrap(), "");
    }

    #[test]
    fn test_mock_counts_fed_bytes() {
        let mut engine = MockRecognizer::new();
        engine.accept_waveform(&[0; 4000]).unwrap();
        engine.accept_waveform(&[0; 100]).unwrap();
        assert_eq!(engine.fed_bytes(), 4100);
    }

    #[test]
    fn test_mock_failure_mode() {
        let mut engine = MockRecognizer::new().with_failure();
        assert!(engine.accept_waveform(&[0; 4]).is_err());
        assert!(engine.result().is_err());
        assert!(engine.final_result().is_err());
    }

    #[test]
    fn test_recognizer_is_object_safe() {
        let _engine: Box<dyn SpeechRecognizer> = Box::new(MockRecognizer::new());
    }
}
