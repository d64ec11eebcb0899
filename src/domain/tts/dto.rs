use super::language::SupportedLanguage;
use super::model::BatchItemResult;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Request for POST /api/tts/synthesize
#[derive(Debug, Serialize, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_variant: Option<String>,
}

/// Request for POST /api/tts/batch
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchRequest {
    pub texts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_variant: Option<String>,
}

/// Response for POST /api/tts/batch
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItemResponse>,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchItemResponse {
    pub index: usize,
    /// Preview of the input text
    pub text: String,
    pub success: bool,
    pub from_cache: bool,
    pub size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_time_seconds: Option<f64>,
    /// MP3 bytes, base64 encoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<BatchItemResult> for BatchItemResponse {
    fn from(item: BatchItemResult) -> Self {
        match item.result {
            Ok(audio) => Self {
                index: item.index,
                text: item.text_preview,
                success: true,
                from_cache: audio.from_cache,
                size_bytes: audio.size_bytes(),
                generation_time_seconds: audio.generation_time.map(|t| t.as_secs_f64()),
                audio_base64: Some(STANDARD.encode(&audio.audio_data)),
                error: None,
            },
            Err(e) => Self {
                index: item.index,
                text: item.text_preview,
                success: false,
                from_cache: false,
                size_bytes: 0,
                generation_time_seconds: None,
                audio_base64: None,
                error: Some(e.to_string()),
            },
        }
    }
}

impl BatchResponse {
    pub fn from_results(results: Vec<BatchItemResult>) -> Self {
        let results: Vec<BatchItemResponse> = results.into_iter().map(Into::into).collect();
        let succeeded = results.iter().filter(|item| item.success).count();
        let failed = results.len() - succeeded;

        Self {
            results,
            succeeded,
            failed,
        }
    }
}

/// Entry of GET /api/languages
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LanguageResponse {
    pub code: String,
    pub name: String,
    pub domain_variant: String,
}

impl From<&SupportedLanguage> for LanguageResponse {
    fn from(language: &SupportedLanguage) -> Self {
        Self {
            code: language.code.to_string(),
            name: language.name.to_string(),
            domain_variant: language.domain_variant.to_string(),
        }
    }
}
