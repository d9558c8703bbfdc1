//! Model resolution at server startup.
//!
//! Named models are cached as `ggml-<name>.bin`. A missing one is streamed
//! into `<file>.part` next to its final path and renamed into place only once
//! its size checks out, so the cache never holds a truncated model.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use futures_util::{Stream, StreamExt};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::Model;
use crate::error::{Error, Result};

const HUGGINGFACE_BASE: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Anything smaller than this is an HTML error page, not a ggml model.
const MIN_MODEL_BYTES: u64 = 1_000_000;

/// Resolve `model` to a file on disk, fetching it into `cache_dir` on first use.
///
/// A [`Model::Custom`] path is never fetched; it must already exist.
pub async fn ensure_model(model: &Model, cache_dir: &Path) -> Result<PathBuf> {
    if let Model::Custom(path) = model {
        return match tokio::fs::try_exists(path).await {
            Ok(true) => Ok(path.clone()),
            _ => Err(Error::ModelNotFound { path: path.clone() }),
        };
    }

    let model_path = cache_dir.join(model.filename());
    if matches!(tokio::fs::try_exists(&model_path).await, Ok(true)) {
        info!(model = model.name(), path = %model_path.display(), "using cached model");
        return Ok(model_path);
    }

    tokio::fs::create_dir_all(cache_dir).await.map_err(|e| {
        Error::Model(format!(
            "failed to create cache dir {}: {e}",
            cache_dir.display()
        ))
    })?;

    let url = model_url(model);
    info!(model = model.name(), %url, "fetching model");
    fetch_model(&url, &model_path).await?;
    Ok(model_path)
}

fn model_url(model: &Model) -> String {
    format!("{HUGGINGFACE_BASE}/{}", model.filename())
}

async fn fetch_model(url: &str, dest: &Path) -> Result<()> {
    let response = reqwest::get(url)
        .await?
        .error_for_status()
        .map_err(|e| Error::ModelDownload(format!("HTTP error: {e}")))?;

    let expected = response.content_length();
    let progress = progress_bar(expected, dest)?;
    let saved = save_stream(response.bytes_stream(), dest, expected, &progress).await;
    progress.finish_and_clear();

    let size = saved?;
    info!(path = %dest.display(), size, "model saved");
    Ok(())
}

// The server logs to stderr as well, so the bar is only drawn for a terminal.
fn progress_bar(expected: Option<u64>, dest: &Path) -> Result<ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return Ok(ProgressBar::hidden());
    }

    let style = ProgressStyle::default_bar()
        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
        .map_err(|e| Error::ModelDownload(format!("progress template: {e}")))?
        .progress_chars("#>-");
    let name = dest
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(ProgressBar::with_draw_target(expected, ProgressDrawTarget::stderr())
        .with_style(style)
        .with_message(format!("Downloading {name}")))
}

/// Write `chunks` to `dest` by way of its `.part` sibling. On any failure the
/// part file is removed and `dest` is left untouched.
async fn save_stream<S, B, E>(
    chunks: S,
    dest: &Path,
    expected: Option<u64>,
    progress: &ProgressBar,
) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<Error>,
{
    let part = dest.with_extension("bin.part");
    let result = store_part(chunks, &part, dest, expected, progress).await;
    if result.is_err() {
        discard_part(&part).await;
    }
    result
}

async fn store_part<S, B, E>(
    chunks: S,
    part: &Path,
    dest: &Path,
    expected: Option<u64>,
    progress: &ProgressBar,
) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<Error>,
{
    let mut chunks = std::pin::pin!(chunks);
    let mut file = tokio::fs::File::create(part).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(Into::<Error>::into)?;
        let bytes = chunk.as_ref();
        file.write_all(bytes).await?;
        written += bytes.len() as u64;
        progress.set_position(written);
    }
    file.flush().await?;
    drop(file);

    check_size(written, expected)?;
    tokio::fs::rename(part, dest).await?;
    Ok(written)
}

fn check_size(size: u64, expected: Option<u64>) -> Result<()> {
    if let Some(expected) = expected.filter(|&n| n > 0) {
        if size != expected {
            return Err(Error::ModelIncomplete {
                expected,
                actual: size,
            });
        }
    }
    if size < MIN_MODEL_BYTES {
        return Err(Error::ModelTooSmall { size });
    }
    Ok(())
}

async fn discard_part(part: &Path) {
    if let Err(e) = tokio::fs::remove_file(part).await {
        debug!(path = %part.display(), error = %e, "no part file to remove");
    }
}
