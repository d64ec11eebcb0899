use super::text_batches::split_into_batches;
use super::tts_repository::TtsRepository;
use crate::domain::tts::{language, SynthesisError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// Google Translate TTS accepts at most 100 characters per request
const MAX_BATCH_SIZE: usize = 100;

const DEFAULT_DOMAIN_VARIANT: &str = "com";
const NORMAL_SPEED: &str = "1";
const SLOW_SPEED: &str = "0.24";

/// Google Translate TTS implementation of TTS repository
///
/// The domain variant selects the regional host (`translate.google.com.br`),
/// which is what gives the voice its accent.
pub struct GoogleTtsRepository {
    client: Client,
    base_url_override: Option<String>,
    slow: bool,
}

impl GoogleTtsRepository {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url_override: None,
            slow: false,
        }
    }

    /// Send every request to `base_url` instead of the regional Google host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    /// Use the provider's slow reading mode
    pub fn with_slow(mut self, slow: bool) -> Self {
        self.slow = slow;
        self
    }

    fn endpoint(&self, domain_variant: &str) -> String {
        match &self.base_url_override {
            Some(base_url) => format!("{}/translate_tts", base_url.trim_end_matches('/')),
            None => format!("https://translate.google.{}/translate_tts", domain_variant),
        }
    }

    /// Language tag in the form the endpoint expects (`pt-br` -> `pt`, `zh-cn` -> `zh-CN`)
    fn provider_language(language_code: &str) -> String {
        match language_code {
            "zh-cn" | "zh-tw" => {
                let (lang, region) = language_code.split_at(2);
                format!("{}{}", lang, region.to_uppercase())
            }
            other => language::primary_subtag(other).to_string(),
        }
    }

    fn build_query(
        &self,
        text: &str,
        language: &str,
        index: usize,
        total: usize,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("ie", "UTF-8".to_string()),
            ("q", text.to_string()),
            ("tl", language.to_string()),
            ("total", total.to_string()),
            ("idx", index.to_string()),
            ("textlen", text.chars().count().to_string()),
            ("client", "tw-ob".to_string()),
            (
                "ttsspeed",
                if self.slow { SLOW_SPEED } else { NORMAL_SPEED }.to_string(),
            ),
        ]
    }

    /// Fetch a single text batch
    async fn call_google(
        &self,
        endpoint: &str,
        text: &str,
        language: &str,
        index: usize,
        total: usize,
    ) -> Result<Vec<u8>, SynthesisError> {
        tracing::debug!(
            endpoint = endpoint,
            language = language,
            batch_index = index,
            text_length = text.len(),
            "Calling Google Translate TTS"
        );

        let response = self
            .client
            .get(endpoint)
            .query(&self.build_query(text, language, index, total))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, endpoint = endpoint, "Google TTS request failed");
                SynthesisError::Provider(format!("Google TTS request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                status = %status,
                language = language,
                batch_index = index,
                "Google TTS returned an error status"
            );
            return Err(SynthesisError::Provider(Self::describe_status(status, language)));
        }

        let audio = response.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read Google TTS response body");
            SynthesisError::Provider(format!("Failed to read audio stream: {}", e))
        })?;

        if audio.is_empty() {
            return Err(SynthesisError::Provider(
                "Google TTS returned an empty audio stream".to_string(),
            ));
        }

        Ok(audio.to_vec())
    }

    fn describe_status(status: StatusCode, language: &str) -> String {
        match status {
            StatusCode::TOO_MANY_REQUESTS => "Google TTS rate limit reached (429)".to_string(),
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
                format!("Google TTS rejected the request ({}), language '{}' may be unsupported", status.as_u16(), language)
            }
            other => format!("Google TTS returned HTTP {}", other.as_u16()),
        }
    }
}

#[async_trait]
impl TtsRepository for GoogleTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        language_code: &str,
        domain_variant: Option<&str>,
    ) -> Result<Vec<u8>, SynthesisError> {
        let start_time = std::time::Instant::now();
        let domain_variant = domain_variant.unwrap_or(DEFAULT_DOMAIN_VARIANT);
        let language = Self::provider_language(language_code);
        let endpoint = self.endpoint(domain_variant);

        let batches = split_into_batches(text, MAX_BATCH_SIZE);
        tracing::info!(
            batch_count = batches.len(),
            text_length = text.len(),
            language = %language,
            domain_variant = domain_variant,
            "Text split into batches"
        );

        // MP3 frames can be concatenated, so batches are merged by appending
        let mut merged_audio = Vec::new();
        for (index, batch) in batches.iter().enumerate() {
            let audio = self
                .call_google(&endpoint, batch, &language, index, batches.len())
                .await?;
            merged_audio.extend(audio);
        }

        tracing::info!(
            provider = "google",
            language = %language,
            latency_ms = start_time.elapsed().as_millis(),
            batch_count = batches.len(),
            audio_size_bytes = merged_audio.len(),
            "TTS synthesis completed"
        );

        Ok(merged_audio)
    }

    fn provider_name(&self) -> &'static str {
        "google"
    }
}
