//! Vosk-backed speech recognizer.
//!
//! Wraps the Kaldi-based Vosk engine: the model directory is loaded once,
//! then waveform bytes stream through a recognizer that finalizes segments
//! on its own timing.

use crate::error::{DolmetError, Result};
use crate::recognize::engine::SpeechRecognizer;
use std::path::Path;
use vosk::{DecodingState, Model, Recognizer};

/// Speech recognizer backed by a local Vosk model.
pub struct VoskRecognizer {
    recognizer: Recognizer,
}

impl VoskRecognizer {
    /// Load a model directory and create a recognizer for `sample_rate` Hz.
    pub fn new(model_dir: &Path, sample_rate: u32) -> Result<Self> {
        let model_str = model_dir.to_string_lossy();
        let model = Model::new(&model_str).ok_or_else(|| DolmetError::ModelNotFound {
            path: model_str.to_string(),
        })?;

        let recognizer =
            Recognizer::new(&model, sample_rate as f32).ok_or_else(|| DolmetError::Recognition {
                message: format!("Failed to create recognizer at {sample_rate} Hz"),
            })?;

        Ok(Self { recognizer })
    }

    /// Reinterpret s16le bytes as samples, dropping a trailing odd byte.
    fn to_samples(pcm: &[u8]) -> Vec<i16> {
        pcm.chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }
}

impl SpeechRecognizer for VoskRecognizer {
    fn accept_waveform(&mut self, pcm: &[u8]) -> Result<bool> {
        let samples = Self::to_samples(pcm);
        match self.recognizer.accept_waveform(&samples) {
            DecodingState::Finalized => Ok(true),
            DecodingState::Running => Ok(false),
            DecodingState::Failed => Err(DolmetError::Recognition {
                message: "engine rejected waveform".to_string(),
            }),
        }
    }

    fn result(&mut self) -> Result<String> {
        let text = self
            .recognizer
            .result()
            .single()
            .map(|r| r.text.to_string())
            .unwrap_or_default();
        Ok(text)
    }

    fn final_result(&mut self) -> Result<String> {
        let text = self
            .recognizer
            .final_result()
            .single()
            .map(|r| r.text.to_string())
            .unwrap_or_default();
        Ok(text)
    }
}
