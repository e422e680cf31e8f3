//! Configuration loading for dolmet.

use crate::defaults;
use crate::error::{DolmetError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub languages: LanguagesConfig,
    pub synthesis: SynthesisConfig,
    pub filter: FilterConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// PulseAudio source name or index; None uses the default source
    pub device: Option<String>,
    /// Capture sample rate (media files keep their own rate)
    pub sample_rate: u32,
    /// Run the denoise filter on captured audio
    pub denoise: bool,
}

/// Language pair configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LanguagesConfig {
    /// Input language code ("en" or "de"); the target is the other one
    pub input: String,
}

/// Synthesis server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Base URL of the TTS server
    pub server_url: String,
    /// Spawn the server as a supervised subprocess
    pub start_server: bool,
    /// How long to wait for server readiness ("2m", "30s", "none")
    pub startup_timeout: String,
}

/// Noise filter configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct FilterConfig {
    /// Override the built-in per-language noise word list
    pub noise_words: Option<Vec<String>>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            denoise: false,
        }
    }
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            input: defaults::INPUT_LANGUAGE.to_string(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            server_url: defaults::SYNTHESIS_SERVER_URL.to_string(),
            start_server: true,
            startup_timeout: "2m".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only falls back to defaults when the file is missing; invalid TOML
    /// is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(DolmetError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - DOLMET_INPUT_LANGUAGE → languages.input
    /// - DOLMET_AUDIO_DEVICE → audio.device
    /// - DOLMET_TTS_URL → synthesis.server_url
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("DOLMET_INPUT_LANGUAGE")
            && !language.is_empty()
        {
            self.languages.input = language;
        }

        if let Ok(device) = std::env::var("DOLMET_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(url) = std::env::var("DOLMET_TTS_URL")
            && !url.is_empty()
        {
            self.synthesis.server_url = url;
        }

        self
    }

    /// Parse the synthesis startup timeout.
    ///
    /// `"none"` and `"0"` disable the bound (wait forever).
    pub fn startup_timeout(&self) -> Result<Option<Duration>> {
        parse_timeout(&self.synthesis.startup_timeout)
    }

    /// Noise words for the configured input language, honoring the override.
    pub fn noise_words(&self) -> Vec<String> {
        match &self.filter.noise_words {
            Some(words) => words.clone(),
            None => defaults::noise_words(&self.languages.input)
                .iter()
                .map(|w| w.to_string())
                .collect(),
        }
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/dolmet/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("dolmet")
            .join("config.toml")
    }
}

/// Parse a timeout string: humantime durations, bare seconds, or "none"/"0".
pub fn parse_timeout(s: &str) -> Result<Option<Duration>> {
    let s = s.trim();
    if s.is_empty() || s == "none" || s == "0" {
        return Ok(None);
    }
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Some(Duration::from_secs(secs)));
    }
    humantime::parse_duration(s)
        .map(Some)
        .map_err(|e| DolmetError::ConfigInvalidValue {
            key: "synthesis.startup_timeout".to_string(),
            message: e.to_string(),
        })
}
