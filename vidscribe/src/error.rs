use std::fmt;
use std::path::PathBuf;

/// All errors that can occur in vidscribe.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("download error: {0}")]
    Download(String),

    #[error("yt-dlp not found — install with: pip install yt-dlp")]
    YtDlpNotFound,

    #[error("failed to download audio: nothing written to {path}")]
    AudioMissing { path: PathBuf },

    #[error("model error: {0}")]
    Model(String),

    #[error("model not found: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("model download failed: {0}")]
    ModelDownload(String),

    #[error("model download incomplete: got {actual} of {expected} bytes")]
    ModelIncomplete { expected: u64, actual: u64 },

    #[error("model download too small ({size} bytes), not a ggml model")]
    ModelTooSmall { size: u64 },

    #[error("audio decoding error: {0}")]
    AudioDecode(String),

    #[error("audio file not found: {path}")]
    AudioNotFound { path: PathBuf },

    #[error("unsupported language: \"{0}\"")]
    UnsupportedLanguage(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("transcription error: {0}")]
    Transcription(String),

    #[error("whisper error: {0}")]
    Whisper(#[from] whisper_rs::WhisperError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure category, stable enough for API clients to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Temp storage for the request could not be allocated.
    Workspace,
    /// The URL could not be fetched, or no audio artifact was produced.
    Download,
    /// Audio decoding or inference failed.
    Transcription,
    /// Anything else.
    Unexpected,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Workspace => "workspace",
            ErrorKind::Download => "download",
            ErrorKind::Transcription => "transcription",
            ErrorKind::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Which pipeline stage this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Workspace(_) => ErrorKind::Workspace,
            Error::Download(_) | Error::YtDlpNotFound | Error::AudioMissing { .. } => {
                ErrorKind::Download
            }
            Error::Transcription(_)
            | Error::Whisper(_)
            | Error::AudioDecode(_)
            | Error::AudioNotFound { .. }
            | Error::UnsupportedLanguage(_)
            | Error::Model(_)
            | Error::ModelNotFound { .. } => ErrorKind::Transcription,
            Error::ModelDownload(_)
            | Error::ModelIncomplete { .. }
            | Error::ModelTooSmall { .. }
            | Error::InvalidOption(_)
            | Error::Io(_)
            | Error::Http(_)
            | Error::Json(_) => ErrorKind::Unexpected,
        }
    }
}
