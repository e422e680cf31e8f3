//! Audio source trait and mock.

use crate::defaults;
use crate::error::{DolmetError, Result};
use crate::pipeline::types::AudioChunk;

/// Trait for audio byte-stream sources.
///
/// This trait allows swapping implementations (ffmpeg subprocess, WAV file,
/// mock). Sources produce fixed-size chunks of s16le mono PCM; a finite
/// source signals end-of-stream with an empty chunk.
pub trait AudioSource: Send {
    /// Start producing audio.
    fn start(&mut self) -> Result<()>;

    /// Stop producing audio.
    fn stop(&mut self) -> Result<()>;

    /// True when the source ends on its own (file/pipe) rather than running
    /// until cancelled (microphone).
    fn is_finite(&self) -> bool;

    /// Read the next chunk, blocking until data is available.
    ///
    /// An empty chunk from a finite source means end-of-stream.
    fn read_chunk(&mut self) -> Result<AudioChunk>;
}

/// One phase of scripted mock output: `count` repetitions of `chunk`.
#[derive(Debug, Clone)]
pub struct ChunkPhase {
    pub chunk: Vec<u8>,
    pub count: usize,
}

/// Mock audio source for testing.
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    phases: Vec<ChunkPhase>,
    phase_index: usize,
    emitted_in_phase: usize,
    live: bool,
    is_started: bool,
    should_fail_start: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    /// Create a finite source that is immediately exhausted.
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            phase_index: 0,
            emitted_in_phase: 0,
            live: false,
            is_started: false,
            should_fail_start: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Script the chunks this source emits, phase by phase.
    pub fn with_chunk_phases(mut self, phases: Vec<ChunkPhase>) -> Self {
        self.phases = phases;
        self
    }

    /// Emit `count` copies of a default-sized chunk filled with `fill`.
    pub fn with_uniform_chunks(self, count: usize, fill: u8) -> Self {
        self.with_chunk_phases(vec![ChunkPhase {
            chunk: vec![fill; defaults::CHUNK_SIZE],
            count,
        }])
    }

    /// Behave like a live capture source (never finite).
    pub fn as_live_source(mut self) -> Self {
        self.live = true;
        self
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on read.
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Check if the source is started.
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(DolmetError::SourceStartup {
                message: self.error_message.clone(),
            });
        }
        self.is_started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn is_finite(&self) -> bool {
        !self.live
    }

    fn read_chunk(&mut self) -> Result<AudioChunk> {
        if self.should_fail_read {
            return Err(DolmetError::SourceStartup {
                message: self.error_message.clone(),
            });
        }

        while let Some(phase) = self.phases.get(self.phase_index) {
            if self.emitted_in_phase < phase.count {
                self.emitted_in_phase += 1;
                return Ok(AudioChunk::new(phase.chunk.clone()));
            }
            self.phase_index += 1;
            self.emitted_in_phase = 0;
        }

        // Script exhausted: end-of-stream
        Ok(AudioChunk::new(Vec::new()))
    }
}
