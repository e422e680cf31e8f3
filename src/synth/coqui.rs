//! Client for a Coqui-style TTS server.
//!
//! The server exposes `GET /api/tts?text=…&speaker_id=…` and answers with WAV
//! bytes and an `audio/*` content type on success. Anything else counts as
//! "no audio": the caller gets `Ok(None)` and decides what to skip.

use crate::defaults;
use crate::error::{DolmetError, Result};
use crate::synth::synthesizer::Synthesizer;
use std::time::Duration;

/// Characters accepted as end-of-phrase by the VITS models.
const VALID_END_OF_PHRASE: [char; 4] = ['.', ';', '!', '?'];

/// Append a stop character when the text lacks end-of-phrase punctuation.
///
/// Without it the decoder can run past the text and emit garbled trailing
/// audio (`MAX_DECODER_STEPS` overruns in the server).
pub fn prepare_text(text: &str) -> String {
    match text.chars().last() {
        Some(last) if VALID_END_OF_PHRASE.contains(&last) => text.to_string(),
        Some(_) => format!("{text}."),
        None => String::new(),
    }
}

/// Synthesizer backed by a Coqui TTS server over HTTP.
pub struct CoquiSynthesizer {
    client: reqwest::blocking::Client,
    base_url: String,
    speaker_id: Option<String>,
}

impl CoquiSynthesizer {
    /// Create a client for the server at `base_url` (no trailing slash).
    ///
    /// `speaker_id` selects a voice on multi-speaker models; single-speaker
    /// models ignore an empty value.
    pub fn new(base_url: &str, speaker_id: Option<String>) -> Result<Self> {
        Self::with_timeout(base_url, speaker_id, defaults::SYNTHESIS_REQUEST_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(
        base_url: &str,
        speaker_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DolmetError::Synthesis {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            speaker_id,
        })
    }
}

impl Synthesizer for CoquiSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Option<Vec<u8>>> {
        let prepared = prepare_text(text);
        if prepared.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .get(format!("{}/api/tts", self.base_url))
            .query(&[
                ("text", prepared.as_str()),
                ("speaker_id", self.speaker_id.as_deref().unwrap_or("")),
            ])
            .send()
            .map_err(|e| DolmetError::Synthesis {
                message: format!("TTS server request failed: {e}"),
            })?;

        if !response.status().is_success() {
            eprintln!(
                "dolmet: TTS server returned status {} — no audio",
                response.status()
            );
            return Ok(None);
        }

        let is_audio = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("audio/"));
        if !is_audio {
            eprintln!("dolmet: TTS server returned a non-audio response — no audio");
            return Ok(None);
        }

        let bytes = response.bytes().map_err(|e| DolmetError::Synthesis {
            message: format!("Failed to read TTS response body: {e}"),
        })?;

        if bytes.is_empty() {
            return Ok(None);
        }

        Ok(Some(bytes.to_vec()))
    }

    fn name(&self) -> &str {
        "coqui"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_text_appends_stop_char() {
        assert_eq!(prepare_text("hello world"), "hello world.");
    }

    #[test]
    fn prepare_text_keeps_existing_punctuation() {
        assert_eq!(prepare_text("hello world."), "hello world.");
        assert_eq!(prepare_text("really?"), "really?");
        assert_eq!(prepare_text("stop!"), "stop!");
        assert_eq!(prepare_text("wait;"), "wait;");
    }

    #[test]
    fn prepare_text_empty_stays_empty() {
        assert_eq!(prepare_text(""), "");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let synth = CoquiSynthesizer::new("http://localhost:5002/", None).unwrap();
        assert_eq!(synth.base_url, "http://localhost:5002");
    }

    #[test]
    fn synthesize_unreachable_server_is_transport_error() {
        // Port 1 is never a TTS server; connection is refused immediately.
        let synth = CoquiSynthesizer::with_timeout(
            "http://127.0.0.1:1",
            None,
            Duration::from_millis(500),
        )
        .unwrap();

        let err = synth.synthesize("hello").unwrap_err();
        assert!(err.to_string().contains("Synthesis failed"));
    }

    #[test]
    fn synthesize_empty_text_is_no_audio_without_request() {
        let synth = CoquiSynthesizer::with_timeout(
            "http://127.0.0.1:1",
            None,
            Duration::from_millis(500),
        )
        .unwrap();

        // No request is made for empty text, so the dead server doesn't matter.
        assert_eq!(synth.synthesize("").unwrap(), None);
    }
}
