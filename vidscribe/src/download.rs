use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::DownloadResult;

/// Resolves a URL to a local audio file plus source metadata.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Fetch the audio behind `url`, transcoded to WAV.
    ///
    /// `output_template` is a yt-dlp style template (`<dir>/<id>.%(ext)s`);
    /// a successful call leaves `<dir>/<id>.wav` on disk.
    async fn download(&self, url: &str, output_template: &Path) -> Result<DownloadResult>;
}

#[derive(Deserialize)]
struct YtDlpInfo {
    title: Option<String>,
    duration: Option<f64>,
}

/// [`Downloader`] backed by the `yt-dlp` executable (ffmpeg is needed for
/// the WAV extraction).
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    program: PathBuf,
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self {
            program: PathBuf::from("yt-dlp"),
        }
    }
}

impl YtDlpDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific yt-dlp binary instead of the one on `PATH`.
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

/// Validate that a string looks like a URL.
/// Rejects anything that isn't http:// or https://.
fn validate_url(url: &str) -> Result<()> {
    let trimmed = url.trim();
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        Ok(())
    } else {
        Err(Error::Download(format!(
            "invalid URL (must start with http:// or https://): {trimmed}"
        )))
    }
}

/// Pick title and duration out of yt-dlp's `--dump-json` output.
///
/// One JSON object per line; the last parseable one wins. Unparseable
/// output falls back to the defaults rather than failing the download.
fn parse_metadata(stdout: &[u8]) -> DownloadResult {
    let info = String::from_utf8_lossy(stdout)
        .lines()
        .rev()
        .filter(|line| !line.trim().is_empty())
        .find_map(|line| serde_json::from_str::<YtDlpInfo>(line).ok());

    match info {
        Some(info) => DownloadResult::from_metadata(info.title, info.duration),
        None => DownloadResult::from_metadata(None, None),
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    /// # Security
    /// - URL is validated to start with http:// or https://
    /// - Arguments are passed to yt-dlp via `.arg()` (no shell expansion)
    /// - `--no-exec` prevents yt-dlp from running post-processing commands
    async fn download(&self, url: &str, output_template: &Path) -> Result<DownloadResult> {
        validate_url(url)?;

        info!(%url, "downloading audio");

        let output = tokio::process::Command::new(&self.program)
            .args([
                "--format",
                "bestaudio/best",
                "--extract-audio",
                "--audio-format",
                "wav",
                "--audio-quality",
                "192K",
                "--no-playlist",
                "--no-exec",
                "--quiet",
                "--no-warnings",
                "--dump-json",
                "--no-simulate",
                "--output",
            ])
            .arg(output_template)
            .arg(url.trim())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::YtDlpNotFound
                } else {
                    Error::Download(format!("failed to run yt-dlp: {e}"))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Limit error message length to avoid dumping huge stderr
            let stderr_truncated: String = stderr.trim().chars().take(1000).collect();
            return Err(Error::Download(format!("yt-dlp failed: {stderr_truncated}")));
        }

        let result = parse_metadata(&output.stdout);
        debug!(title = %result.title, duration = result.duration, "audio downloaded");
        Ok(result)
    }
}
