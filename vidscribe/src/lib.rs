//! Video URL in, cleaned transcript out.
//!
//! **vidscribe** runs one request through a fixed pipeline: a per-request
//! [`Workspace`] is created, the audio track is fetched with yt-dlp
//! ([`YtDlpDownloader`]), whisper.cpp transcribes it ([`WhisperTranscriber`]),
//! and the raw text is cleaned by [`normalize`]. The workspace is removed
//! however the request ends.
//!
//! # Quick start
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # #[tokio::main]
//! # async fn main() -> vidscribe::Result<()> {
//! use vidscribe::{Pipeline, TranscribeOptions, TranscriptionRequest, WhisperTranscriber, YtDlpDownloader};
//!
//! let options = TranscribeOptions::default();
//! let model_path = vidscribe::model::ensure_model(&options.model, &options.resolve_cache_dir()).await?;
//! let transcriber = WhisperTranscriber::new(&model_path, &options)?;
//!
//! let pipeline = Pipeline::new(Arc::new(YtDlpDownloader::new()), Arc::new(transcriber));
//! let response = pipeline
//!     .run(&TranscriptionRequest::new("https://example.com/video").language("en"))
//!     .await?;
//! println!("{}: {}", response.title, response.text);
//! # Ok(())
//! # }
//! ```

pub(crate) mod audio;
pub mod config;
pub mod download;
pub mod error;
pub mod languages;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod transcribe;
pub mod types;
pub mod workspace;

pub use config::{Model, TranscribeOptions};
pub use download::{Downloader, YtDlpDownloader};
pub use error::{Error, ErrorKind, Result};
pub use normalize::normalize;
pub use pipeline::Pipeline;
pub use transcribe::{Transcriber, WhisperTranscriber};
pub use types::{DownloadResult, TranscriptionRequest, TranscriptionResponse, TranscriptionResult};
pub use workspace::Workspace;
