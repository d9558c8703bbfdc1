use serde::{Deserialize, Serialize};

/// Language sentinel meaning "let the model detect it".
pub const AUTO_LANGUAGE: &str = "auto";

/// Title used when the source does not report one.
pub const UNTITLED: &str = "Untitled";

/// Detected language used when the model does not report one.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// One transcription job as submitted by a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionRequest {
    pub url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    AUTO_LANGUAGE.to_string()
}

impl TranscriptionRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            language: default_language(),
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Language to pin the model to: `None` for auto-detection, otherwise
    /// the requested code exactly as given.
    pub fn language_hint(&self) -> Option<&str> {
        if self.language == AUTO_LANGUAGE {
            None
        } else {
            Some(&self.language)
        }
    }
}

/// Metadata reported by a [`Downloader`](crate::download::Downloader).
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    pub title: String,
    /// Seconds, never negative.
    pub duration: f64,
}

impl DownloadResult {
    /// Build from optional source metadata, applying the defaults.
    pub fn from_metadata(title: Option<String>, duration: Option<f64>) -> Self {
        Self {
            title: title.unwrap_or_else(|| UNTITLED.to_string()),
            duration: duration.filter(|d| d.is_finite() && *d >= 0.0).unwrap_or(0.0),
        }
    }
}

/// Raw output of a [`Transcriber`](crate::transcribe::Transcriber).
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionResult {
    pub text: String,
    pub detected_language: String,
}

/// The cleaned transcript plus source metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
    pub duration: f64,
    pub title: String,
    pub detected_language: String,
}
