//! Application entry points.
//!
//! Orchestrates a complete run: model loading, engine supervision, readiness
//! gates, the translation pipeline, and supervised teardown.

use crate::audio::ffmpeg::{FfmpegAudioSource, media_demux_args, mic_capture_args, probe_sample_rate};
use crate::config::Config;
use crate::defaults;
use crate::error::{DolmetError, Result};
use crate::models::catalog::{self, Language};
use crate::output;
use crate::pipeline::orchestrator::{Pipeline, PipelineConfig, PipelineHandle};
use crate::playback::aplay::AplaySink;
use crate::recognize::engine::SpeechRecognizer;
use crate::recognize::segmenter::Segmenter;
use crate::supervisor::readiness::{HttpProbe, wait_until_ready};
use crate::supervisor::supervisor::ProcessSupervisor;
use crate::synth::coqui::CoquiSynthesizer;
use crate::synth::synthesizer::Synthesizer;
use crate::translate::translator::Translator;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

/// Run live translation on a microphone stream.
pub async fn run_mic_command(
    config: Config,
    device: Option<String>,
    quiet: bool,
    verbosity: u8,
    no_download: bool,
) -> Result<()> {
    let language = Language::parse(&config.languages.input)?;
    let device = device
        .or_else(|| config.audio.device.clone())
        .unwrap_or_else(|| "default".to_string());
    let sample_rate = config.audio.sample_rate;

    if !quiet {
        eprintln!("Setting up recognizer on microphone stream...");
    }

    let mut supervisor = ProcessSupervisor::new();
    let (segmenter, translator, synthesizer) =
        prepare_engines(&config, language, sample_rate, quiet, no_download, &mut supervisor)
            .await?;

    // Audio capture process
    if !quiet {
        eprintln!("Starting ffmpeg...");
    }
    let args = mic_capture_args(&device, sample_rate, config.audio.denoise);
    let ffmpeg = supervisor.spawn_piped("ffmpeg", Command::new("ffmpeg").args(&args))?;

    tokio::time::sleep(defaults::SOURCE_STARTUP_GRACE).await;
    if !ffmpeg.is_alive() {
        return Err(DolmetError::SourceStartup {
            message: "ffmpeg exited during startup — check the audio device".to_string(),
        });
    }

    let stdout = ffmpeg.take_stdout().ok_or_else(|| DolmetError::Other(
        "ffmpeg stdout unavailable".to_string(),
    ))?;
    let source = Box::new(FfmpegAudioSource::from_stdout(stdout, false));

    let pipeline = Pipeline::new(PipelineConfig {
        quiet,
        verbosity,
        ..Default::default()
    });
    let handle = pipeline.start(
        source,
        segmenter,
        translator,
        synthesizer,
        Box::new(AplaySink::new()),
    )?;

    if !quiet {
        output::print_banner();
    }

    wait_for_stop(&handle).await?;

    // Killing the capture process unblocks any in-flight chunk read
    supervisor.shutdown();
    handle.stop();

    if !quiet {
        output::print_done();
    }
    Ok(())
}

/// Translate the audio track of a media file while playing the video.
///
/// Plain WAV files are read directly; anything else goes through ffmpeg,
/// with the original video routed to a player over a named pipe.
pub async fn run_media_command(
    config: Config,
    in_media: PathBuf,
    quiet: bool,
    verbosity: u8,
    no_download: bool,
) -> Result<()> {
    if in_media
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
    {
        return run_wav_command(config, in_media, quiet, verbosity, no_download).await;
    }

    let language = Language::parse(&config.languages.input)?;

    if !quiet {
        eprintln!("Setting up recognizer on media file...");
    }

    // The recognizer must match the file's own rate — the demuxed WAV keeps it
    let sample_rate = probe_sample_rate(&in_media)?;

    let mut supervisor = ProcessSupervisor::new();
    let (segmenter, translator, synthesizer) =
        prepare_engines(&config, language, sample_rate, quiet, no_download, &mut supervisor)
            .await?;

    // Named pipe feeding the original video to the player
    let video_pipe = PathBuf::from("video_pipe");
    supervisor.create_fifo(&video_pipe)?;

    if !quiet {
        eprintln!("Starting ffmpeg...");
    }
    let args = media_demux_args(&in_media, &video_pipe, config.audio.denoise);
    let ffmpeg = supervisor.spawn_piped("ffmpeg", Command::new("ffmpeg").args(&args))?;

    if !quiet {
        eprintln!("Starting mpv...");
    }
    supervisor.spawn(
        "mpv",
        Command::new("mpv")
            .arg(&video_pipe)
            .args(["--really-quiet", "--volume=70"]),
    )?;

    tokio::time::sleep(defaults::SOURCE_STARTUP_GRACE).await;
    if !ffmpeg.is_alive() {
        return Err(DolmetError::SourceStartup {
            message: format!("ffmpeg exited during startup — check {}", in_media.display()),
        });
    }

    let stdout = ffmpeg.take_stdout().ok_or_else(|| DolmetError::Other(
        "ffmpeg stdout unavailable".to_string(),
    ))?;
    let source = Box::new(FfmpegAudioSource::from_stdout(stdout, true));

    let pipeline = Pipeline::new(PipelineConfig {
        quiet,
        verbosity,
        ..Default::default()
    });
    let handle = pipeline.start(
        source,
        segmenter,
        translator,
        synthesizer,
        Box::new(AplaySink::new()),
    )?;

    if !quiet {
        output::print_banner();
    }

    wait_for_stop(&handle).await?;

    supervisor.shutdown();
    handle.stop();

    if !quiet {
        output::print_done();
    }
    Ok(())
}

/// Translate a plain WAV file without demuxing or a video player.
async fn run_wav_command(
    config: Config,
    in_wav: PathBuf,
    quiet: bool,
    verbosity: u8,
    no_download: bool,
) -> Result<()> {
    let language = Language::parse(&config.languages.input)?;

    if !quiet {
        eprintln!("Setting up recognizer on WAV file...");
    }

    let source = crate::audio::wav::WavFileSource::from_path(&in_wav)?;
    let sample_rate = source.sample_rate();

    let mut supervisor = ProcessSupervisor::new();
    let (segmenter, translator, synthesizer) =
        prepare_engines(&config, language, sample_rate, quiet, no_download, &mut supervisor)
            .await?;

    let pipeline = Pipeline::new(PipelineConfig {
        quiet,
        verbosity,
        ..Default::default()
    });
    let handle = pipeline.start(
        Box::new(source),
        segmenter,
        translator,
        synthesizer,
        Box::new(AplaySink::new()),
    )?;

    if !quiet {
        output::print_banner();
    }

    wait_for_stop(&handle).await?;

    supervisor.shutdown();
    handle.stop();

    if !quiet {
        output::print_done();
    }
    Ok(())
}

/// Load all engines and gate on the synthesis server's readiness.
async fn prepare_engines(
    config: &Config,
    language: Language,
    sample_rate: u32,
    quiet: bool,
    no_download: bool,
    supervisor: &mut ProcessSupervisor,
) -> Result<(Segmenter, Box<dyn Translator>, Arc<dyn Synthesizer>)> {
    if !quiet {
        eprintln!(
            "Loading recognition model '{}'...",
            catalog::recognizer_model(language).name
        );
    }
    let recognizer = create_recognizer(language, sample_rate, quiet, no_download).await?;
    let noise_words = config.noise_words();
    let noise_refs: Vec<&str> = noise_words.iter().map(String::as_str).collect();
    let segmenter = Segmenter::new(recognizer)
        .with_noise_words(&noise_refs)
        .with_quiet(quiet);

    if !quiet {
        eprintln!(
            "Loading translation model '{}'...",
            catalog::translation_model(language).name
        );
    }
    let translator = create_translator(language).await?;

    let voice = catalog::synthesis_model(language);
    if config.synthesis.start_server {
        if !quiet {
            eprintln!("Starting tts-server...");
        }
        supervisor.spawn_quiet(
            "tts-server",
            Command::new("tts-server").args(["--model_name", voice.model_name]),
        )?;
    }

    if !quiet {
        eprintln!("Waiting for tts-server to be available...");
    }
    let timeout = config.startup_timeout()?;
    wait_for_server(config.synthesis.server_url.clone(), timeout).await?;

    let synthesizer: Arc<dyn Synthesizer> = Arc::new(CoquiSynthesizer::new(
        &config.synthesis.server_url,
        voice.speaker_id.map(String::from),
    )?);

    Ok((segmenter, translator, synthesizer))
}

/// Poll the synthesis server until it answers, off the async runtime.
async fn wait_for_server(url: String, timeout: Option<Duration>) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        let probe = HttpProbe::new(&url, "tts-server")?;
        wait_until_ready(&probe, defaults::READY_POLL_INTERVAL, timeout)
    })
    .await
    .map_err(|e| DolmetError::Other(format!("Readiness task failed: {e}")))?
}

/// Block until Ctrl+C or until the pipeline ran to completion on its own.
async fn wait_for_stop(handle: &PipelineHandle) -> Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result.map_err(|e| DolmetError::Other(format!("Failed to wait for Ctrl+C: {e}")))?;
                return Ok(());
            }
            _ = tokio::time::sleep(Duration::from_millis(200)) => {
                if handle.is_finished() {
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(feature = "vosk-engine")]
async fn create_recognizer(
    language: Language,
    sample_rate: u32,
    quiet: bool,
    no_download: bool,
) -> Result<Box<dyn SpeechRecognizer>> {
    use crate::models::download::{download_recognizer_model, recognizer_model_path};
    use crate::recognize::vosk::VoskRecognizer;

    let info = catalog::recognizer_model(language);
    let model_dir = if no_download {
        let path = recognizer_model_path(&info);
        if !path.is_dir() {
            return Err(DolmetError::ModelNotFound {
                path: path.display().to_string(),
            });
        }
        path
    } else {
        download_recognizer_model(&info, !quiet).await?
    };

    let recognizer =
        tokio::task::spawn_blocking(move || VoskRecognizer::new(&model_dir, sample_rate))
            .await
            .map_err(|e| DolmetError::Other(format!("Recognizer load task failed: {e}")))??;
    Ok(Box::new(recognizer))
}

#[cfg(not(feature = "vosk-engine"))]
async fn create_recognizer(
    _language: Language,
    _sample_rate: u32,
    _quiet: bool,
    _no_download: bool,
) -> Result<Box<dyn SpeechRecognizer>> {
    Err(DolmetError::Other(
        "dolmet was built without a recognition engine; rebuild with --features vosk-engine"
            .to_string(),
    ))
}

#[cfg(feature = "marian")]
async fn create_translator(language: Language) -> Result<Box<dyn Translator>> {
    use crate::translate::marian::MarianTranslator;

    let info = catalog::translation_model(language);
    let translator = tokio::task::spawn_blocking(move || MarianTranslator::load(&info))
        .await
        .map_err(|e| DolmetError::Other(format!("Translator load task failed: {e}")))??;
    Ok(Box::new(translator))
}

#[cfg(not(feature = "marian"))]
async fn create_translator(_language: Language) -> Result<Box<dyn Translator>> {
    Err(DolmetError::Other(
        "dolmet was built without a translation engine; rebuild with --features marian"
            .to_string(),
    ))
}
