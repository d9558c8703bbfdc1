use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::download::Downloader;
use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::transcribe::Transcriber;
use crate::types::{TranscriptionRequest, TranscriptionResponse};
use crate::workspace::Workspace;

/// Drives one request end to end: download, transcribe, clean up text.
///
/// Collaborators are injected so the expensive model is loaded once and
/// shared by every request.
#[derive(Clone)]
pub struct Pipeline {
    downloader: Arc<dyn Downloader>,
    transcriber: Arc<dyn Transcriber>,
    workspace_root: PathBuf,
}

impl Pipeline {
    /// Workspaces are created under the OS temp dir unless
    /// [`with_workspace_root`](Self::with_workspace_root) says otherwise.
    pub fn new(downloader: Arc<dyn Downloader>, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            downloader,
            transcriber,
            workspace_root: std::env::temp_dir(),
        }
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    /// Process one request.
    ///
    /// The workspace is removed before this returns, on success and on
    /// every error path.
    pub async fn run(&self, request: &TranscriptionRequest) -> Result<TranscriptionResponse> {
        let workspace = Workspace::create(&self.workspace_root)?;

        let id = Uuid::new_v4();
        let output_template = workspace.join(format!("{id}.%(ext)s"));
        let audio_path = workspace.join(format!("{id}.wav"));

        info!(%id, url = %request.url, language = %request.language, "transcription requested");

        let download = self.downloader.download(&request.url, &output_template).await?;

        if !tokio::fs::try_exists(&audio_path).await.unwrap_or(false) {
            warn!(%id, path = %audio_path.display(), "downloader reported success but wrote no audio");
            return Err(Error::AudioMissing { path: audio_path });
        }

        let transcription = self
            .transcriber
            .transcribe(&audio_path, request.language_hint())
            .await?;

        let text = normalize(&transcription.text);

        info!(
            %id,
            title = %download.title,
            duration = download.duration,
            detected_language = %transcription.detected_language,
            chars = text.len(),
            "transcription finished"
        );

        Ok(TranscriptionResponse {
            text,
            duration: download.duration,
            title: download.title,
            detected_language: transcription.detected_language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::ErrorKind;
    use crate::types::{DownloadResult, TranscriptionResult};

    /// Writes `<template stem>.wav` unless told not to, and records where.
    struct MockDownloader {
        title: Option<String>,
        duration: Option<f64>,
        write_file: bool,
        fail: Option<String>,
        written: Mutex<Option<PathBuf>>,
    }

    impl MockDownloader {
        fn ok(title: &str, duration: f64) -> Self {
            Self {
                title: Some(title.to_string()),
                duration: Some(duration),
                write_file: true,
                fail: None,
                written: Mutex::new(None),
            }
        }

        fn silent() -> Self {
            Self {
                write_file: false,
                ..Self::ok("Silent", 1.0)
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                fail: Some(message.to_string()),
                ..Self::ok("Broken", 1.0)
            }
        }

        fn workspace(&self) -> PathBuf {
            self.written
                .lock()
                .unwrap()
                .as_ref()
                .and_then(|p| p.parent().map(Path::to_path_buf))
                .unwrap()
        }
    }

    #[async_trait]
    impl Downloader for MockDownloader {
        async fn download(&self, _url: &str, output_template: &Path) -> Result<DownloadResult> {
            let template = output_template.to_string_lossy();
            let audio = PathBuf::from(template.replace("%(ext)s", "wav"));
            *self.written.lock().unwrap() = Some(audio.clone());

            if let Some(message) = &self.fail {
                return Err(Error::Download(message.clone()));
            }
            if self.write_file {
                std::fs::write(&audio, b"RIFF....WAVE").unwrap();
            }
            Ok(DownloadResult::from_metadata(self.title.clone(), self.duration))
        }
    }

    /// Returns canned text and records the language hint it was given.
    struct MockTranscriber {
        text: String,
        language: Option<String>,
        fail: bool,
        calls: Mutex<Vec<(PathBuf, Option<String>)>>,
    }

    impl MockTranscriber {
        fn ok(text: &str, language: Option<&str>) -> Self {
            Self {
                text: text.to_string(),
                language: language.map(str::to_string),
                fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::ok("", None)
            }
        }

        fn calls(&self) -> Vec<(PathBuf, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transcriber for MockTranscriber {
        async fn transcribe(
            &self,
            audio_path: &Path,
            language: Option<&str>,
        ) -> Result<TranscriptionResult> {
            self.calls
                .lock()
                .unwrap()
                .push((audio_path.to_path_buf(), language.map(str::to_string)));
            assert!(audio_path.exists(), "transcriber called without audio");

            if self.fail {
                return Err(Error::Transcription("model exploded".into()));
            }
            Ok(TranscriptionResult {
                text: self.text.clone(),
                detected_language: self
                    .language
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
            })
        }
    }

    fn pipeline(
        root: &Path,
        downloader: &Arc<MockDownloader>,
        transcriber: &Arc<MockTranscriber>,
    ) -> Pipeline {
        Pipeline::new(downloader.clone(), transcriber.clone()).with_workspace_root(root)
    }

    fn entries(root: &Path) -> usize {
        std::fs::read_dir(root).unwrap().count()
    }

    #[tokio::test]
    async fn test_end_to_end() {
        let root = tempfile::tempdir().unwrap();
        let downloader = Arc::new(MockDownloader::ok("Test Video", 42.5));
        let transcriber = Arc::new(MockTranscriber::ok(
            "  [intro] Hello (whispering) world ♪♪  ",
            Some("en"),
        ));

        let response = pipeline(root.path(), &downloader, &transcriber)
            .run(&TranscriptionRequest::new("https://example.com/watch?v=1"))
            .await
            .unwrap();

        assert_eq!(
            response,
            TranscriptionResponse {
                text: "Hello world".into(),
                duration: 42.5,
                title: "Test Video".into(),
                detected_language: "en".into(),
            }
        );
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_keeps_words_between_notes() {
        let root = tempfile::tempdir().unwrap();
        let downloader = Arc::new(MockDownloader::ok("Test Video", 42.5));
        let transcriber = Arc::new(MockTranscriber::ok(
            "  [intro] Hello (whispering) world ♪music♪  ",
            Some("en"),
        ));

        let response = pipeline(root.path(), &downloader, &transcriber)
            .run(&TranscriptionRequest::new("https://example.com/watch?v=1"))
            .await
            .unwrap();

        assert_eq!(response.text, "Hello world music");
        assert_eq!(response.detected_language, "en");
    }

    #[tokio::test]
    async fn test_audio_path_derives_from_request_id() {
        let root = tempfile::tempdir().unwrap();
        let downloader = Arc::new(MockDownloader::ok("T", 1.0));
        let transcriber = Arc::new(MockTranscriber::ok("hi", Some("en")));
        let pipeline = pipeline(root.path(), &downloader, &transcriber);
        let request = TranscriptionRequest::new("https://example.com/v");

        pipeline.run(&request).await.unwrap();
        pipeline.run(&request).await.unwrap();

        let calls = transcriber.calls();
        assert_eq!(calls.len(), 2);
        assert_ne!(calls[0].0, calls[1].0);
        assert_ne!(calls[0].0.parent(), calls[1].0.parent());
        for (path, _) in &calls {
            assert_eq!(path.extension().unwrap(), "wav");
            let stem = path.file_stem().unwrap().to_str().unwrap();
            assert!(Uuid::parse_str(stem).is_ok(), "stem {stem} is not a uuid");
        }
    }

    #[tokio::test]
    async fn test_auto_forwards_no_language() {
        let root = tempfile::tempdir().unwrap();
        let downloader = Arc::new(MockDownloader::ok("T", 1.0));
        let transcriber = Arc::new(MockTranscriber::ok("hi", None));

        let response = pipeline(root.path(), &downloader, &transcriber)
            .run(&TranscriptionRequest::new("https://example.com/v").language("auto"))
            .await
            .unwrap();

        assert_eq!(transcriber.calls()[0].1, None);
        assert_eq!(response.detected_language, "unknown");
    }

    #[tokio::test]
    async fn test_explicit_language_forwarded_verbatim() {
        let root = tempfile::tempdir().unwrap();
        let downloader = Arc::new(MockDownloader::ok("T", 1.0));
        let transcriber = Arc::new(MockTranscriber::ok("hi", Some("zz")));
        let pipeline = pipeline(root.path(), &downloader, &transcriber);

        for code in ["fr", "not-a-language", "EN"] {
            pipeline
                .run(&TranscriptionRequest::new("https://example.com/v").language(code))
                .await
                .unwrap();
        }

        let hints: Vec<_> = transcriber.calls().into_iter().map(|(_, l)| l).collect();
        assert_eq!(
            hints,
            vec![
                Some("fr".to_string()),
                Some("not-a-language".to_string()),
                Some("EN".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_audio_is_download_error() {
        let root = tempfile::tempdir().unwrap();
        let downloader = Arc::new(MockDownloader::silent());
        let transcriber = Arc::new(MockTranscriber::ok("hi", Some("en")));

        let err = pipeline(root.path(), &downloader, &transcriber)
            .run(&TranscriptionRequest::new("https://example.com/v"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AudioMissing { .. }));
        assert_eq!(err.kind(), ErrorKind::Download);
        assert!(transcriber.calls().is_empty());
        assert!(!downloader.workspace().exists());
    }

    #[tokio::test]
    async fn test_download_failure_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let downloader = Arc::new(MockDownloader::failing("HTTP Error 404"));
        let transcriber = Arc::new(MockTranscriber::ok("hi", Some("en")));

        let err = pipeline(root.path(), &downloader, &transcriber)
            .run(&TranscriptionRequest::new("https://example.com/v"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Download);
        assert!(err.to_string().contains("HTTP Error 404"));
        assert!(transcriber.calls().is_empty());
        assert!(!downloader.workspace().exists());
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_transcription_failure_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let downloader = Arc::new(MockDownloader::ok("T", 1.0));
        let transcriber = Arc::new(MockTranscriber::failing());

        let err = pipeline(root.path(), &downloader, &transcriber)
            .run(&TranscriptionRequest::new("https://example.com/v"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transcription);
        assert!(err.to_string().contains("model exploded"));
        assert_eq!(transcriber.calls().len(), 1);
        assert!(!downloader.workspace().exists());
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_unusable_workspace_root() {
        let downloader = Arc::new(MockDownloader::ok("T", 1.0));
        let transcriber = Arc::new(MockTranscriber::ok("hi", Some("en")));

        let err = pipeline(Path::new("/nonexistent/root"), &downloader, &transcriber)
            .run(&TranscriptionRequest::new("https://example.com/v"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Workspace);
        assert!(transcriber.calls().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_requests_use_separate_workspaces() {
        let root = tempfile::tempdir().unwrap();
        let downloader = Arc::new(MockDownloader::ok("T", 1.0));
        let transcriber = Arc::new(MockTranscriber::ok("hi", Some("en")));
        let pipeline = pipeline(root.path(), &downloader, &transcriber);

        let request = TranscriptionRequest::new("https://example.com/v");
        let (a, b) = tokio::join!(pipeline.run(&request), pipeline.run(&request));
        assert!(a.is_ok() && b.is_ok());

        let calls = transcriber.calls();
        assert_ne!(calls[0].0.parent(), calls[1].0.parent());
        assert_eq!(entries(root.path()), 0);
    }
}
