//! Audio input: source trait, ffmpeg subprocess sources, WAV files.

pub mod ffmpeg;
pub mod source;
pub mod wav;

pub use ffmpeg::{FfmpegAudioSource, media_demux_args, mic_capture_args, probe_sample_rate};
pub use source::{AudioSource, ChunkPhase, MockAudioSource};
pub use wav::WavFileSource;
