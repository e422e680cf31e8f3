//! Data types flowing through the translation pipeline.
//!
//! Each stage produces its own type; fields are set once at construction and
//! ownership moves between stages over channels, never shared.

/// One fixed-size buffer of raw PCM bytes read from the audio source.
///
/// Chunks carry no identity beyond arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    /// s16le mono PCM bytes, at most the nominal chunk size.
    pub bytes: Vec<u8>,
}

impl AudioChunk {
    /// Creates a new audio chunk.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// True for the zero-length read that signals end-of-stream.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One finalized segment of recognized speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    /// Monotonically increasing id assigned at recognition-finalization time.
    pub sequence_id: u64,
    /// Recognized text, already past the noise filter.
    pub source_text: String,
    /// True only for the end-of-stream flush result.
    pub is_final: bool,
}

impl Utterance {
    /// Creates a new utterance.
    pub fn new(sequence_id: u64, source_text: String, is_final: bool) -> Self {
        Self {
            sequence_id,
            source_text,
            is_final,
        }
    }
}

/// An utterance with its translation attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedUtterance {
    pub sequence_id: u64,
    pub source_text: String,
    pub translated_text: String,
    pub is_final: bool,
}

impl TranslatedUtterance {
    /// Attaches a translation to a recognized utterance.
    pub fn new(utterance: Utterance, translated_text: String) -> Self {
        Self {
            sequence_id: utterance.sequence_id,
            source_text: utterance.source_text,
            translated_text,
            is_final: utterance.is_final,
        }
    }
}

/// The synthesis result handed to playback.
///
/// `audio` is `None` when the engine produced no usable audio. The entry
/// still travels the handoff queue so the playback consumer always receives
/// exactly one value per utterance and can skip cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedUtterance {
    pub sequence_id: u64,
    pub translated_text: String,
    pub audio: Option<Vec<u8>>,
    pub is_final: bool,
}

impl SynthesizedUtterance {
    /// Creates a synthesis result, successful or sentinel.
    pub fn new(utterance: TranslatedUtterance, audio: Option<Vec<u8>>) -> Self {
        Self {
            sequence_id: utterance.sequence_id,
            translated_text: utterance.translated_text,
            audio,
            is_final: utterance.is_final,
        }
    }
}
