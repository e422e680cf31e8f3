//! Recognition model download and installation.
//!
//! Vosk models ship as zip archives with the model directory at the top
//! level. Archives are streamed to a temp file, then extracted into the
//! cache directory.

use crate::error::{DolmetError, Result};
use crate::models::catalog::RecognizerModelInfo;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Get the directory where models are stored.
///
/// Uses `~/.cache/dolmet/models/` on Linux/Unix.
pub fn models_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("dolmet")
        .join("models")
}

/// Directory a recognizer model is (or would be) installed at.
pub fn recognizer_model_path(info: &RecognizerModelInfo) -> PathBuf {
    models_dir().join(info.name)
}

/// Check if a recognizer model is installed.
pub fn is_recognizer_model_installed(info: &RecognizerModelInfo) -> bool {
    recognizer_model_path(info).is_dir()
}

/// Download and extract a recognizer model.
///
/// Returns the installed model directory. Already-installed models are
/// returned as-is.
pub async fn download_recognizer_model(
    info: &RecognizerModelInfo,
    progress: bool,
) -> Result<PathBuf> {
    let target = recognizer_model_path(info);
    if target.is_dir() {
        return Ok(target);
    }

    let dir = models_dir();
    fs::create_dir_all(&dir)
        .map_err(|e| DolmetError::Other(format!("Failed to create models directory: {e}")))?;

    if progress {
        eprintln!("Downloading {}...", info.name);
    }

    let archive_path = fetch_archive(&info.url(), &dir, info.name, progress).await?;
    let extract_result = extract_archive(&archive_path, &dir);

    // The archive is only an intermediate artifact
    if let Err(e) = fs::remove_file(&archive_path) {
        eprintln!("dolmet: failed to remove downloaded archive: {e}");
    }
    extract_result?;

    if !target.is_dir() {
        return Err(DolmetError::Other(format!(
            "Archive did not contain the expected model directory '{}'",
            info.name
        )));
    }

    if progress {
        eprintln!("Model installed to: {}", target.display());
    }

    Ok(target)
}

/// Stream `url` into `<dir>/<name>.zip` with an optional progress bar.
async fn fetch_archive(
    url: &str,
    dir: &std::path::Path,
    name: &str,
    progress: bool,
) -> Result<PathBuf> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DolmetError::Other(format!("Failed to start download: {e}")))?;

    if !response.status().is_success() {
        return Err(DolmetError::Other(format!(
            "Download failed with status: {}",
            response.status()
        )));
    }

    let total_size = response.content_length().unwrap_or(0);
    let pb = if progress {
        let pb = ProgressBar::new(total_size);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    let archive_path = dir.join(format!("{name}.zip"));
    let mut file = fs::File::create(&archive_path)
        .map_err(|e| DolmetError::Other(format!("Failed to create archive file: {e}")))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| DolmetError::Other(format!("Failed to read download chunk: {e}")))?;

        file.write_all(&chunk)
            .map_err(|e| DolmetError::Other(format!("Failed to write to file: {e}")))?;

        if let Some(ref pb) = pb {
            pb.inc(chunk.len() as u64);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Downloaded");
    }

    Ok(archive_path)
}

/// Unpack a model archive into the models directory.
fn extract_archive(archive_path: &std::path::Path, dir: &std::path::Path) -> Result<()> {
    let file = fs::File::open(archive_path)
        .map_err(|e| DolmetError::Other(format!("Failed to open archive: {e}")))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| DolmetError::Other(format!("Failed to read archive: {e}")))?;
    archive
        .extract(dir)
        .map_err(|e| DolmetError::Other(format!("Failed to extract archive: {e}")))?;
    Ok(())
}
