//! Error types for dolmet.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DolmetError {
    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Fatal startup errors
    #[error("Audio source failed to start: {message}")]
    SourceStartup { message: String },

    #[error("{engine} did not become ready within {waited:?}")]
    StartupTimeout {
        engine: String,
        waited: std::time::Duration,
    },

    #[error("Model not found at {path}")]
    ModelNotFound { path: String },

    // Per-utterance errors (logged, utterance dropped, pipeline continues)
    #[error("Recognition failed: {message}")]
    Recognition { message: String },

    #[error("Translation failed: {message}")]
    Translation { message: String },

    #[error("Synthesis failed: {message}")]
    Synthesis { message: String },

    #[error("Playback failed: {message}")]
    Playback { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DolmetError>;
