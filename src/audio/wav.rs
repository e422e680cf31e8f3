//! WAV file audio source.
//!
//! Reads an entire WAV file into s16le bytes and serves it in nominal
//! chunks. Used for plain WAV input without spawning ffmpeg, and by tests.

use crate::audio::source::AudioSource;
use crate::defaults;
use crate::error::{DolmetError, Result};
use crate::pipeline::types::AudioChunk;
use std::io::Read;

/// Finite audio source over decoded WAV data.
#[derive(Debug)]
pub struct WavFileSource {
    bytes: Vec<u8>,
    position: usize,
    chunk_size: usize,
    sample_rate: u32,
}

impl WavFileSource {
    /// Create from any reader (for testing/flexibility).
    ///
    /// Stereo input is averaged down to mono; the file's own sample rate is
    /// kept and exposed for recognizer construction.
    pub fn from_reader(reader: Box<dyn Read + Send>) -> Result<Self> {
        let mut wav_reader =
            hound::WavReader::new(reader).map_err(|e| DolmetError::SourceStartup {
                message: format!("Failed to parse WAV file: {e}"),
            })?;

        let spec = wav_reader.spec();
        let raw_samples: Vec<i16> = wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| DolmetError::SourceStartup {
                message: format!("Failed to read WAV samples: {e}"),
            })?;

        let mono_samples = if spec.channels == 2 {
            raw_samples
                .chunks_exact(2)
                .map(|pair| {
                    let left = pair[0] as i32;
                    let right = pair[1] as i32;
                    ((left + right) / 2) as i16
                })
                .collect()
        } else {
            raw_samples
        };

        let bytes = mono_samples
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();

        Ok(Self {
            bytes,
            position: 0,
            chunk_size: defaults::CHUNK_SIZE,
            sample_rate: spec.sample_rate,
        })
    }

    /// Open a WAV file from disk.
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| DolmetError::SourceStartup {
            message: format!("Failed to open {}: {e}", path.display()),
        })?;
        Self::from_reader(Box::new(std::io::BufReader::new(file)))
    }

    /// Sample rate of the source file.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl AudioSource for WavFileSource {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_finite(&self) -> bool {
        true
    }

    fn read_chunk(&mut self) -> Result<AudioChunk> {
        if self.position >= self.bytes.len() {
            return Ok(AudioChunk::new(Vec::new()));
        }

        let end = std::cmp::min(self.position + self.chunk_size, self.bytes.len());
        let chunk = self.bytes[self.position..end].to_vec();
        self.position = end;

        Ok(AudioChunk::new(chunk))
    }
}
