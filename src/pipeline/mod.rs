//! Translation pipeline core.
//!
//! Implements a multi-station pipeline where each station runs in its own
//! thread, connected by bounded crossbeam channels for backpressure. The
//! channel between synthesis and playback is the ordered handoff queue.

pub mod error;
pub mod orchestrator;
pub mod playback_station;
pub mod station;
pub mod synthesis_station;
pub mod types;

pub use error::{ErrorReporter, LogReporter, StationError};
pub use orchestrator::{Pipeline, PipelineConfig, PipelineHandle};
pub use playback_station::PlaybackStation;
pub use station::{Station, StationRunner};
pub use synthesis_station::SynthesisStation;
pub use types::{AudioChunk, SynthesizedUtterance, TranslatedUtterance, Utterance};
