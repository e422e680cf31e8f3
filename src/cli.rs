//! Command-line interface for dolmet
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Live speech-to-speech translation for Linux
#[derive(Parser, Debug)]
#[command(
    name = "dolmet",
    version,
    about = "Live speech-to-speech translation for Linux"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Input language (default: en). The target language is the other one
    #[arg(short = 'i', long, global = true, value_name = "LANG")]
    pub input_language: Option<String>,

    /// Run the noise filter on captured audio
    #[arg(short = 'f', long, global = true)]
    pub denoise: bool,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Prevent automatic model download if a model is missing
    #[arg(long, global = true)]
    pub no_download: bool,

    /// Ceiling on waiting for engine readiness (e.g. 30s, 2m, none)
    #[arg(long, global = true, value_name = "DURATION")]
    pub startup_timeout: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate live speech from a microphone
    Mic {
        /// PulseAudio source (name recommended, index works)
        #[arg(short, long, value_name = "DEVICE")]
        device: Option<String>,

        /// Show PulseAudio sources and exit ('pactl list short sources')
        #[arg(short = 'l', long)]
        list_devices: bool,
    },

    /// Translate the audio track of a media file while playing the video
    Media {
        /// Media file for input
        in_media: PathBuf,
    },

    /// Manage recognition models
    Models {
        /// Action to perform
        #[command(subcommand)]
        action: ModelsAction,
    },
}

/// Model management actions
#[derive(Subcommand, Debug)]
pub enum ModelsAction {
    /// List catalog models and their installation status
    List,

    /// Download the recognition model for a language
    Install {
        /// Language code (defaults to the configured input language)
        language: Option<String>,
    },
}
