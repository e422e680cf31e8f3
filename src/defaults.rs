//! Default configuration constants for dolmet.
//!
//! This module provides shared constants used across different configuration
//! types to ensure consistency and eliminate duplication.

use std::time::Duration;

/// Default audio sample rate in Hz for microphone capture.
///
/// 16kHz is the standard for speech recognition and the rate the Vosk
/// examples use for live capture. Media files keep their own rate,
/// discovered via ffprobe.
pub const SAMPLE_RATE: u32 = 16000;

/// Nominal size of one audio chunk in bytes (s16le mono PCM).
///
/// Changing this changes recognizer segmentation granularity but not
/// correctness: the engine buffers acoustic state across chunks.
pub const CHUNK_SIZE: usize = 4000;

/// Interval between readiness probes of the synthesis server.
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default ceiling on waiting for the synthesis server to come up.
///
/// The first start downloads the TTS model, which can take minutes on a
/// slow connection. Set `synthesis.startup_timeout = "none"` to wait forever.
pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(120);

/// Grace period before checking that a spawned source process is still alive.
///
/// ffmpeg fails fast on a bad device or file, so one poll after this delay
/// distinguishes "failed to start" from "running".
pub const SOURCE_STARTUP_GRACE: Duration = Duration::from_secs(2);

/// Per-request timeout for synthesis calls.
///
/// Long sentences through a VITS model can take several seconds; the timeout
/// only has to catch a hung server, not a slow one.
pub const SYNTHESIS_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default URL of the Coqui TTS server.
pub const SYNTHESIS_SERVER_URL: &str = "http://localhost:5002";

/// Bound on utterances buffered between translation and synthesis.
pub const SYNTHESIS_BUFFER: usize = 16;

/// Bound on synthesized utterances buffered ahead of playback.
pub const HANDOFF_BUFFER: usize = 16;

/// Default input language code.
pub const INPUT_LANGUAGE: &str = "en";

/// Short recognitions that are noise more often than speech, per language.
///
/// A finalized segment whose trimmed text equals one of these (or is empty)
/// is discarded before translation. Lists come from observed false positives
/// on silence and breath noise.
pub fn noise_words(language: &str) -> &'static [&'static str] {
    match language {
        "de" => &["einen", "und"],
        _ => &["the", "one", "now"],
    }
}
