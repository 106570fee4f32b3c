//! whisper.cpp recognizer

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use scanwatch_core::resample::resample_linear;
use scanwatch_core::{Recognizer, RecognizerError, Transcription, RECOGNITION_SAMPLE_RATE};
use tracing::{debug, info, warn};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::wav::read_wav_mono_f32;

/// Confidence reported for non-empty text when token probabilities are
/// unavailable
const DEFAULT_TEXT_CONFIDENCE: f32 = 0.8;

/// Recognizer configuration
#[derive(Debug, Clone)]
pub struct AsrConfig {
    /// GGML model file name, e.g. `ggml-base.en.bin`
    pub model: String,
    /// Directory holding downloaded models
    pub models_directory: PathBuf,
    /// Offload decoding to the GPU when the build supports it
    pub use_gpu: bool,
    /// Decoder threads; 0 picks a sensible default for the machine
    pub threads: usize,
    /// Language code, or `auto` to let the model detect it
    pub language: String,
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            model: "ggml-base.en.bin".into(),
            models_directory: PathBuf::from("models"),
            use_gpu: false,
            threads: 0,
            language: "en".into(),
        }
    }
}

/// Whisper model behind the core recognizer capability.
///
/// The context loads once and is reused; per-call decoding state is created
/// fresh. The lock serializes decoding because whisper states share the
/// model's backend buffers.
pub struct WhisperRecognizer {
    config: AsrConfig,
    ctx: Mutex<Option<WhisperContext>>,
}

impl WhisperRecognizer {
    /// Create an uninitialized recognizer; the model loads on
    /// [`initialize`](Recognizer::initialize)
    pub fn new(config: AsrConfig) -> Self {
        Self {
            config,
            ctx: Mutex::new(None),
        }
    }

    fn decoder_threads(&self) -> i32 {
        if self.config.threads > 0 {
            self.config.threads as i32
        } else {
            // Leave headroom so decoding does not starve the capture thread.
            num_cpus::get().min(8) as i32
        }
    }
}

impl Recognizer for WhisperRecognizer {
    fn is_ready(&self) -> bool {
        self.ctx.lock().expect("recognizer lock poisoned").is_some()
    }

    fn initialize(&self) -> bool {
        let mut guard = self.ctx.lock().expect("recognizer lock poisoned");
        if guard.is_some() {
            return true;
        }

        let path = self.config.models_directory.join(&self.config.model);
        if !path.exists() {
            warn!(model = %path.display(), "whisper model file not found");
            return false;
        }
        let Some(path_str) = path.to_str() else {
            warn!(model = %path.display(), "model path is not valid UTF-8");
            return false;
        };

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(self.config.use_gpu);

        match WhisperContext::new_with_params(path_str, ctx_params) {
            Ok(ctx) => {
                info!(model = %path.display(), "whisper model loaded");
                *guard = Some(ctx);
                true
            }
            Err(e) => {
                warn!("failed to load whisper model: {e}");
                false
            }
        }
    }

    fn transcribe(&self, samples: &[f32]) -> Result<Transcription, RecognizerError> {
        let started = Instant::now();

        let guard = self.ctx.lock().expect("recognizer lock poisoned");
        let Some(ctx) = guard.as_ref() else {
            // Recognizer unavailable: transmissions still flow through the
            // pipeline, they just transcribe to nothing.
            return Ok(Transcription::default());
        };

        let mut state = ctx
            .create_state()
            .map_err(|e| RecognizerError::Decode(e.to_string()))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        let language = self.config.language.clone();
        if language.eq_ignore_ascii_case("auto") {
            params.set_language(None);
            params.set_detect_language(true);
        } else {
            params.set_language(Some(&language));
        }
        params.set_n_threads(self.decoder_threads());
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_token_timestamps(false);

        state
            .full(params, samples)
            .map_err(|e| RecognizerError::Decode(e.to_string()))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| RecognizerError::Decode(e.to_string()))?;

        let mut text = String::new();
        let mut prob_sum = 0f64;
        let mut prob_count = 0usize;
        for segment in 0..num_segments {
            match state.full_get_segment_text_lossy(segment) {
                Ok(seg) => text.push_str(&seg),
                Err(e) => debug!("failed to read whisper segment {segment}: {e}"),
            }
            if let Ok(n_tokens) = state.full_n_tokens(segment) {
                for token in 0..n_tokens {
                    if let Ok(prob) = state.full_get_token_prob(segment, token) {
                        prob_sum += prob as f64;
                        prob_count += 1;
                    }
                }
            }
        }

        let text = text.replace("[BLANK_AUDIO]", "").trim().to_string();
        let confidence = if text.is_empty() {
            0.0
        } else if prob_count > 0 {
            ((prob_sum / prob_count as f64) as f32).clamp(0.0, 1.0)
        } else {
            DEFAULT_TEXT_CONFIDENCE
        };

        Ok(Transcription {
            text,
            confidence,
            duration: started.elapsed(),
        })
    }

    fn transcribe_file(&self, path: &std::path::Path) -> Result<Transcription, RecognizerError> {
        let (samples, sample_rate) = read_wav_mono_f32(path)?;
        let samples = if sample_rate != RECOGNITION_SAMPLE_RATE {
            resample_linear(&samples, sample_rate, RECOGNITION_SAMPLE_RATE)
        } else {
            samples
        };
        self.transcribe(&samples)
    }
}
