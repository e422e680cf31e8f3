use anyhow::Result;
use clap::Parser;
use dolmet::app::{run_media_command, run_mic_command};
use dolmet::cli::{Cli, Commands, ModelsAction};
use dolmet::config::Config;
use dolmet::models::catalog::{Language, recognizer_model};
use dolmet::models::download::{download_recognizer_model, is_recognizer_model_installed};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;

    // Apply CLI overrides
    if let Some(language) = cli.input_language {
        config.languages.input = language;
    }
    if cli.denoise {
        config.audio.denoise = true;
    }
    if let Some(timeout) = cli.startup_timeout {
        config.synthesis.startup_timeout = timeout;
    }

    match cli.command {
        Commands::Mic {
            device,
            list_devices,
        } => {
            if list_devices {
                list_audio_sources()?;
                return Ok(());
            }
            run_mic_command(config, device, cli.quiet, cli.verbose, cli.no_download).await?;
        }
        Commands::Media { in_media } => {
            run_media_command(config, in_media, cli.quiet, cli.verbose, cli.no_download).await?;
        }
        Commands::Models { action } => {
            handle_models_command(action, &config).await?;
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/dolmet/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    // Apply environment variable overrides
    Ok(config.with_env_overrides())
}

/// List PulseAudio sources via pactl.
fn list_audio_sources() -> Result<()> {
    println!("index   name");
    let status = std::process::Command::new("pactl")
        .args(["list", "short", "sources"])
        .status();

    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => {
            eprintln!("pactl exited with {status}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to run pactl: {e}");
            eprintln!("Is PulseAudio (or PipeWire with pactl) installed?");
            std::process::exit(1);
        }
    }
}

/// Handle model management commands.
async fn handle_models_command(action: ModelsAction, config: &Config) -> Result<()> {
    match action {
        ModelsAction::List => {
            println!("Recognition models:");
            for code in ["en", "de"] {
                let language = Language::parse(code)?;
                let info = recognizer_model(language);
                let status = if is_recognizer_model_installed(&info) {
                    "installed"
                } else {
                    "not installed"
                };
                println!("  {} — {} ({})", code, info.name, status);
            }
        }
        ModelsAction::Install { language } => {
            let code = language.unwrap_or_else(|| config.languages.input.clone());
            let language = Language::parse(&code)?;
            let info = recognizer_model(language);
            let path = download_recognizer_model(&info, true).await?;
            println!("Model '{}' installed successfully", info.name);
            println!("Location: {}", path.display());
        }
    }
    Ok(())
}
