use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::{self, WHISPER_SAMPLE_RATE};
use crate::config::TranscribeOptions;
use crate::error::{Error, Result};
use crate::types::{TranscriptionResult, UNKNOWN_LANGUAGE};

/// Speech-to-text over a local audio file.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe `audio_path`. `language` pins the model to a language;
    /// `None` lets it detect one.
    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<TranscriptionResult>;
}

#[derive(Debug, Clone)]
struct DecodeSettings {
    n_threads: Option<u32>,
    temperature: f32,
    beam_size: Option<u32>,
}

/// [`Transcriber`] running whisper.cpp in-process.
///
/// The model is loaded once in [`WhisperTranscriber::new`] and shared
/// read-only; every call decodes on a fresh `WhisperState` on the blocking
/// thread pool, with at most `workers` calls in flight.
pub struct WhisperTranscriber {
    context: Arc<WhisperContext>,
    settings: DecodeSettings,
    permits: Arc<Semaphore>,
}

impl WhisperTranscriber {
    /// Load the ggml model at `model_path`. Blocking and slow; call at startup.
    pub fn new(model_path: &Path, options: &TranscribeOptions) -> Result<Self> {
        info!(model = %model_path.display(), workers = options.workers, "loading whisper model");

        let mut ctx_params = WhisperContextParameters::new();
        ctx_params.use_gpu(options.gpu);
        ctx_params.gpu_device(options.gpu_device as i32);

        let context = WhisperContext::new_with_params(
            model_path
                .to_str()
                .ok_or_else(|| Error::Model("model path contains invalid UTF-8".into()))?,
            ctx_params,
        )?;

        Ok(Self {
            context: Arc::new(context),
            settings: DecodeSettings {
                n_threads: options.n_threads,
                temperature: options.temperature,
                beam_size: options.beam_size,
            },
            permits: Arc::new(Semaphore::new(options.workers.max(1))),
        })
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<TranscriptionResult> {
        let language = resolve_language(language)?;

        // Queue here when all workers are busy
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| Error::Transcription(format!("inference pool closed: {e}")))?;

        let context = Arc::clone(&self.context);
        let settings = self.settings.clone();
        let audio_path: PathBuf = audio_path.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            run_whisper(&context, &settings, &audio_path, language.as_deref())
        })
        .await
        .map_err(|e| Error::Transcription(format!("transcription task failed: {e}")))?
    }
}

/// Check a language hint against whisper.cpp's table and normalize it to
/// the short code ("english" -> "en").
fn resolve_language(language: Option<&str>) -> Result<Option<String>> {
    let Some(requested) = language else {
        return Ok(None);
    };
    let id = whisper_rs::get_lang_id(&requested.to_lowercase())
        .ok_or_else(|| Error::UnsupportedLanguage(requested.to_string()))?;
    let code = whisper_rs::get_lang_str(id).unwrap_or(requested);
    Ok(Some(code.to_string()))
}

fn run_whisper(
    context: &WhisperContext,
    settings: &DecodeSettings,
    audio_path: &Path,
    language: Option<&str>,
) -> Result<TranscriptionResult> {
    let samples = audio::load_audio(audio_path)?;

    let mut state = context.create_state()?;

    let mut params = match settings.beam_size {
        Some(beam_size) => FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: beam_size as i32,
            patience: -1.0,
        }),
        None => FullParams::new(SamplingStrategy::Greedy { best_of: 1 }),
    };

    params.set_language(Some(language.unwrap_or("auto")));
    params.set_temperature(settings.temperature);
    params.set_no_context(true);

    if let Some(n) = settings.n_threads {
        params.set_n_threads(n as i32);
    }

    // Disable stderr printing from whisper.cpp
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);
    params.set_print_special(false);

    info!(
        samples = samples.len(),
        language = language.unwrap_or("auto"),
        "running transcription"
    );
    state.full(params, &samples)?;

    let num_segments = state.full_n_segments();
    let mut text = String::new();

    for i in 0..num_segments {
        let segment = state
            .get_segment(i)
            .ok_or_else(|| Error::Transcription(format!("segment {i} not found")))?;
        let segment_text = segment
            .to_str_lossy()
            .map_err(|e| Error::Transcription(format!("segment text error: {e}")))?;
        text.push_str(&segment_text);
    }

    let detected_language = match language {
        Some(code) => code.to_string(),
        None => whisper_rs::get_lang_str(state.full_lang_id_from_state())
            .unwrap_or(UNKNOWN_LANGUAGE)
            .to_string(),
    };

    debug!(
        num_segments,
        chars = text.len(),
        duration_secs = format!("{:.1}", samples.len() as f64 / WHISPER_SAMPLE_RATE as f64),
        %detected_language,
        "transcription complete"
    );

    Ok(TranscriptionResult {
        text,
        detected_language,
    })
}
