use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use vidscribe::{Pipeline, WhisperTranscriber, YtDlpDownloader};
use vidscribe_server::{create_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("vidscribe=info,vidscribe_server=info,tower_http=info")
        }))
        .with_writer(std::io::stderr)
        .init();

    let options = config.transcribe_options()?;
    let cache_dir = options.resolve_cache_dir();
    let model_path = vidscribe::model::ensure_model(&options.model, &cache_dir)
        .await
        .context("failed to prepare whisper model")?;

    // Loaded once, shared by every request
    let transcriber =
        tokio::task::spawn_blocking(move || WhisperTranscriber::new(&model_path, &options))
            .await
            .context("model loading task failed")??;

    let downloader = YtDlpDownloader::new().program(config.yt_dlp.clone());
    let mut pipeline = Pipeline::new(Arc::new(downloader), Arc::new(transcriber));
    if let Some(dir) = &config.workspace_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create workspace dir {}", dir.display()))?;
        pipeline = pipeline.with_workspace_root(dir);
    }

    let frontend = config.frontend();
    let router = create_router(AppState::new(pipeline), frontend.as_deref());

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
