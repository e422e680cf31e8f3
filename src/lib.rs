//! dolmet - Live speech-to-speech translation for Linux
//!
//! Continuous audio is segmented into utterances, translated, synthesized,
//! and played back strictly in recognition order.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod playback;
pub mod recognize;
pub mod supervisor;
pub mod synth;
pub mod sys;
pub mod translate;

// Core traits (source → stages → sink)
pub use audio::source::AudioSource;
pub use playback::sink::PlaybackSink;
pub use recognize::engine::SpeechRecognizer;
pub use synth::synthesizer::Synthesizer;
pub use translate::translator::Translator;

// Pipeline
pub use pipeline::orchestrator::{Pipeline, PipelineConfig, PipelineHandle};
pub use recognize::segmenter::Segmenter;

// Error handling
pub use error::{DolmetError, Result};

// Config
pub use config::Config;

// Station framework (for advanced users)
pub use pipeline::error::{ErrorReporter, StationError};
pub use pipeline::station::Station;

// Process supervision
pub use supervisor::readiness::ReadinessProbe;
pub use supervisor::supervisor::ProcessSupervisor;
