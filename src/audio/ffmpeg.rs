//! ffmpeg-based audio sources and command construction.
//!
//! The capture/demux process itself is spawned and supervised elsewhere;
//! this module builds the command lines and reads the PCM byte stream from
//! the child's stdout.

use crate::defaults;
use crate::error::{DolmetError, Result};
use crate::pipeline::types::AudioChunk;
use crate::audio::source::AudioSource;
use std::io::Read;
use std::path::Path;
use std::process::Command;

/// Frequency-domain denoise filter for noisy microphones and soundtracks.
const DENOISE_FILTER: &str = "afftdn=nf=-30";

/// ffmpeg arguments for PulseAudio microphone capture.
///
/// Produces raw s16le mono PCM on stdout at the given sample rate.
pub fn mic_capture_args(device: &str, sample_rate: u32, denoise: bool) -> Vec<String> {
    let mut args: Vec<String> = [
        "-loglevel", "fatal", "-f", "pulse", "-i", device,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.extend(["-ar".into(), sample_rate.to_string()]);
    args.extend(["-ac".into(), "1".into(), "-f".into(), "s16le".into()]);
    if denoise {
        args.extend(["-filter:a".into(), DENOISE_FILTER.into()]);
    }
    args.push("-".into());
    args
}

/// ffmpeg arguments for media-file demux.
///
/// Copies the container unchanged into `video_pipe` for the player and
/// decodes mono WAV audio to stdout for the recognizer.
pub fn media_demux_args(input: &Path, video_pipe: &Path, denoise: bool) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-loglevel".into(),
        "fatal".into(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-movflags".into(),
        "empty_moov".into(),
        "-codec".into(),
        "copy".into(),
        "-f".into(),
        "mp4".into(),
        video_pipe.to_string_lossy().into_owned(),
        "-ac".into(),
        "1".into(),
        "-f".into(),
        "wav".into(),
    ];
    if denoise {
        args.extend(["-filter:a".into(), DENOISE_FILTER.into()]);
    }
    args.push("-".into());
    args
}

/// Query the sample rate of a media file's first audio stream via ffprobe.
pub fn probe_sample_rate(path: &Path) -> Result<u32> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "a:0",
            "-show_entries",
            "stream=sample_rate",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .map_err(|e| DolmetError::SourceStartup {
            message: format!("Failed to run ffprobe: {e}"),
        })?;

    if !output.status.success() {
        return Err(DolmetError::SourceStartup {
            message: format!(
                "ffprobe failed for {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse::<u32>()
        .map_err(|e| DolmetError::SourceStartup {
            message: format!("ffprobe returned no usable sample rate: {e}"),
        })
}

/// Audio source reading PCM bytes from a supervised ffmpeg child's stdout.
///
/// `start`/`stop` are no-ops: the process lifecycle belongs to the
/// supervisor, which kills the child on shutdown and thereby unblocks any
/// in-flight read.
pub struct FfmpegAudioSource {
    stdout: Box<dyn Read + Send>,
    chunk_size: usize,
    finite: bool,
}

impl FfmpegAudioSource {
    /// Wrap a child's stdout. `finite` is true for media demux, false for
    /// live capture.
    pub fn from_stdout(stdout: impl Read + Send + 'static, finite: bool) -> Self {
        Self {
            stdout: Box::new(stdout),
            chunk_size: defaults::CHUNK_SIZE,
            finite,
        }
    }

    /// Override the nominal chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

impl AudioSource for FfmpegAudioSource {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_finite(&self) -> bool {
        self.finite
    }

    fn read_chunk(&mut self) -> Result<AudioChunk> {
        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;

        // Fill the whole chunk unless the stream ends first
        while filled < buf.len() {
            match self.stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        buf.truncate(filled);
        Ok(AudioChunk::new(buf))
    }
}
