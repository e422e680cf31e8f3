//! Static catalog of engine models per language pair.
//!
//! dolmet translates between English and German in either direction; the
//! input language selects one model per engine.

use crate::error::{DolmetError, Result};

/// Supported input languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    German,
}

impl Language {
    /// Parse a two-letter language code.
    pub fn parse(code: &str) -> Result<Self> {
        match code {
            "en" => Ok(Self::English),
            "de" => Ok(Self::German),
            other => Err(DolmetError::ConfigInvalidValue {
                key: "languages.input".to_string(),
                message: format!("unsupported language '{other}', expected 'en' or 'de'"),
            }),
        }
    }

    /// Two-letter code.
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::German => "de",
        }
    }

    /// The language this input is translated into.
    pub fn target(self) -> Self {
        match self {
            Self::English => Self::German,
            Self::German => Self::English,
        }
    }
}

/// A speech recognition model.
#[derive(Debug, Clone, Copy)]
pub struct RecognizerModelInfo {
    /// Model directory name, also the archive stem.
    pub name: &'static str,
}

impl RecognizerModelInfo {
    /// Download URL for the model archive.
    pub fn url(&self) -> String {
        format!("https://alphacephei.com/vosk/models/{}.zip", self.name)
    }
}

/// The recognition model for an input language.
pub fn recognizer_model(language: Language) -> RecognizerModelInfo {
    match language {
        Language::English => RecognizerModelInfo {
            name: "vosk-model-en-us-0.22",
        },
        Language::German => RecognizerModelInfo {
            name: "vosk-model-de-0.21",
        },
    }
}

/// A translation model checkpoint plus its converted tokenizers.
#[derive(Debug, Clone, Copy)]
pub struct TranslationModelInfo {
    pub name: &'static str,
    /// HuggingFace repo holding the safetensors weights.
    pub hf_repo: &'static str,
    /// Repo holding tokenizer.json conversions of the SentencePiece models.
    pub tokenizer_repo: &'static str,
    pub source_tokenizer: &'static str,
    pub target_tokenizer: &'static str,
    /// Shared source/target vocabulary size of the checkpoint.
    pub vocab_size: usize,
}

/// The translation model for an input language (target is implied).
pub fn translation_model(input: Language) -> TranslationModelInfo {
    match input {
        Language::English => TranslationModelInfo {
            name: "opus-mt-en-de",
            hf_repo: "Helsinki-NLP/opus-mt-en-de",
            tokenizer_repo: "lmz/candle-marian",
            source_tokenizer: "tokenizer-marian-base-en.json",
            target_tokenizer: "tokenizer-marian-base-de.json",
            vocab_size: 58101,
        },
        Language::German => TranslationModelInfo {
            name: "opus-mt-de-en",
            hf_repo: "Helsinki-NLP/opus-mt-de-en",
            tokenizer_repo: "lmz/candle-marian",
            source_tokenizer: "tokenizer-marian-base-de.json",
            target_tokenizer: "tokenizer-marian-base-en.json",
            vocab_size: 58101,
        },
    }
}

/// A synthesis voice on the TTS server.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisModelInfo {
    /// Coqui model name the server is started with.
    pub model_name: &'static str,
    /// Speaker id for multi-speaker models.
    pub speaker_id: Option<&'static str>,
}

/// The synthesis voice for an input language — the voice speaks the target.
pub fn synthesis_model(input: Language) -> SynthesisModelInfo {
    match input {
        // German speech output
        Language::English => SynthesisModelInfo {
            model_name: "tts_models/de/thorsten/vits",
            speaker_id: None,
        },
        // English speech output; vctk is multi-speaker
        Language::German => SynthesisModelInfo {
            model_name: "tts_models/en/vctk/vits",
            speaker_id: Some("p364"),
        },
    }
}
