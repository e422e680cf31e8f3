//! Playback through an `aplay` subprocess.

use crate::error::{DolmetError, Result};
use crate::playback::sink::PlaybackSink;
use std::io::Write;
use std::process::{Command, Stdio};

/// Sink that pipes WAV bytes into `aplay` and waits for it to finish.
///
/// One child per utterance; the caller's playback gate guarantees only one is
/// alive at a time.
pub struct AplaySink {
    program: String,
    args: Vec<String>,
}

impl AplaySink {
    pub fn new() -> Self {
        Self {
            program: "aplay".to_string(),
            args: ["-", "-t", "wav", "--quiet"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Replace the player invocation (e.g. a different player or a wrapper).
    pub fn with_command(mut self, program: &str, args: &[&str]) -> Self {
        self.program = program.to_string();
        self.args = args.iter().map(|s| s.to_string()).collect();
        self
    }
}

impl Default for AplaySink {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSink for AplaySink {
    fn play(&mut self, audio: &[u8]) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| DolmetError::Playback {
                message: format!("Failed to spawn {}: {e}", self.program),
            })?;

        // stdin is piped above, so take() always yields a handle
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(audio).map_err(|e| DolmetError::Playback {
                message: format!("Failed to write audio to {}: {e}", self.program),
            })?;
            // Dropping stdin closes the pipe so the player sees end-of-input
        }

        let status = child.wait().map_err(|e| DolmetError::Playback {
            message: format!("Failed to wait for {}: {e}", self.program),
        })?;

        if !status.success() {
            return Err(DolmetError::Playback {
                message: format!("{} exited with {status}", self.program),
            });
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "aplay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_player_binary_is_playback_error() {
        let mut sink = AplaySink::new().with_command("dolmet-test-no-such-player", &[]);
        let err = sink.play(b"RIFF").unwrap_err();
        assert!(matches!(err, DolmetError::Playback { .. }));
    }

    #[test]
    fn sink_waits_for_player_to_consume_stdin() {
        // A shell that drains stdin stands in for a player binary.
        let mut sink = AplaySink::new().with_command("sh", &["-c", "cat > /dev/null"]);
        sink.play(b"not really wav data").unwrap();
    }

    #[test]
    fn failing_player_exit_status_is_reported() {
        let mut sink = AplaySink::new().with_command("false", &[]);
        let result = sink.play(b"");
        // Either the broken pipe on write or the exit status surfaces as a
        // playback error, depending on timing.
        assert!(result.is_err());
    }

    #[test]
    fn default_invocation_targets_aplay_wav_stdin() {
        let sink = AplaySink::new();
        assert_eq!(sink.program, "aplay");
        assert_eq!(sink.args, vec!["-", "-t", "wav", "--quiet"]);
    }
}
