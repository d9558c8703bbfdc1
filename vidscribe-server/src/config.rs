use std::path::PathBuf;

use clap::Parser;
use vidscribe::{Model, TranscribeOptions};

/// Command-line and environment configuration for the server.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "vidscribe-server",
    about = "Transcribe videos by URL over HTTP"
)]
pub struct ServerConfig {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Whisper model name (e.g. "small", "large-v3") or path to a ggml file.
    #[arg(short, long, default_value = "small")]
    pub model: String,

    /// Model cache directory.
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Transcriptions allowed to run at once; further requests wait.
    #[arg(long, default_value_t = 1)]
    pub workers: usize,

    /// Threads per transcription (default: whisper.cpp's choice).
    #[arg(long)]
    pub threads: Option<u32>,

    /// Disable GPU acceleration.
    #[arg(long)]
    pub no_gpu: bool,

    /// GPU device ID.
    #[arg(long, default_value_t = 0)]
    pub gpu_device: u32,

    /// Beam search size (default: greedy).
    #[arg(long)]
    pub beam_size: Option<u32>,

    /// Sampling temperature.
    #[arg(long, default_value_t = 0.0)]
    pub temperature: f32,

    /// Prebuilt frontend; served at `/` and `/assets` when the directory exists.
    #[arg(long, default_value = "frontend/dist")]
    pub frontend_dir: PathBuf,

    /// yt-dlp executable.
    #[arg(long, default_value = "yt-dlp")]
    pub yt_dlp: PathBuf,

    /// Where per-request workspaces are created (default: OS temp dir).
    #[arg(long)]
    pub workspace_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve `--model` as a known name first, then as a file path.
    pub fn model(&self) -> vidscribe::Result<Model> {
        if let Some(model) = Model::parse_name(&self.model) {
            return Ok(model);
        }
        let path = PathBuf::from(&self.model);
        if path.exists() {
            Ok(Model::Custom(path))
        } else {
            Err(vidscribe::Error::InvalidOption(format!(
                "unknown model \"{}\" (expected a model name or a path to a ggml file)",
                self.model
            )))
        }
    }

    pub fn transcribe_options(&self) -> vidscribe::Result<TranscribeOptions> {
        let mut opts = TranscribeOptions::new()
            .model(self.model()?)
            .gpu(!self.no_gpu)
            .gpu_device(self.gpu_device)
            .temperature(self.temperature)?
            .workers(self.workers)?;

        if let Some(n) = self.threads {
            opts = opts.n_threads(n)?;
        }
        if let Some(size) = self.beam_size {
            opts = opts.beam_size(size)?;
        }
        if let Some(dir) = &self.cache_dir {
            opts = opts.cache_dir(dir.clone());
        }
        Ok(opts)
    }

    /// The frontend directory, if it exists on disk.
    pub fn frontend(&self) -> Option<PathBuf> {
        self.frontend_dir.is_dir().then(|| self.frontend_dir.clone())
    }
}
