//! Audio playback: sink trait and the `aplay` subprocess sink.

pub mod aplay;
pub mod sink;

pub use aplay::AplaySink;
pub use sink::{MockPlaybackSink, PlaybackSink, RecordedPlayback};
