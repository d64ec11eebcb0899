use super::error::TtsServiceError;
use std::time::Duration;

const PREVIEW_CHARS: usize = 100;

/// One text-to-speech request as the front end hands it to the core.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub language_code: String,
    pub domain_variant: Option<String>,
    pub speed: f32,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, language_code: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language_code: language_code.into(),
            domain_variant: None,
            speed: 1.0,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_domain_variant(mut self, domain_variant: impl Into<String>) -> Self {
        self.domain_variant = Some(domain_variant.into());
        self
    }
}

/// Successful generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAudio {
    /// MP3 bytes.
    pub audio_data: Vec<u8>,
    pub from_cache: bool,
    /// Wall time of the provider call; `None` when served from cache.
    pub generation_time: Option<Duration>,
    /// Language actually used, after auto-detection.
    pub language_code: String,
    /// Speed the audio was produced at, after the speed policy was applied.
    pub speed: f32,
}

impl GeneratedAudio {
    pub fn size_bytes(&self) -> usize {
        self.audio_data.len()
    }
}

pub type GenerationResult = Result<GeneratedAudio, TtsServiceError>;

/// Outcome of one item of a batch, in input order.
#[derive(Debug)]
pub struct BatchItemResult {
    pub index: usize,
    pub text_preview: String,
    pub result: GenerationResult,
}

impl BatchItemResult {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// First 100 characters of `text`, with `...` when it was cut.
pub fn text_preview(text: &str) -> String {
    let mut chars = text.chars();
    let preview: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}
