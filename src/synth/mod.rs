//! Speech synthesis: engine trait and the Coqui TTS server client.

pub mod coqui;
pub mod synthesizer;

pub use coqui::CoquiSynthesizer;
pub use synthesizer::{MockSynthesizer, ScriptedOutcome, ScriptedSynthesis, Synthesizer};
