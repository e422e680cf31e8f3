//! Speech recognition: engine boundary, segmentation, and the Vosk backend.

pub mod engine;
pub mod segmenter;
#[cfg(feature = "vosk-engine")]
pub mod vosk;

pub use engine::{MockRecognizer, SpeechRecognizer};
pub use segmenter::Segmenter;
#[cfg(feature = "vosk-engine")]
pub use vosk::VoskRecognizer;
