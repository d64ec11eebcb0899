use super::text_batches::split_into_batches;
use super::tts_repository::TtsRepository;
use crate::domain::tts::{language, SynthesisError};
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly has a limit of 3000 characters per request
const MAX_BATCH_SIZE: usize = 3000;

/// Voices that support the neural engine (AWS Polly documentation)
const NEURAL_VOICES: &[&str] = &[
    "Joanna", "Amy", "Olivia", "Camila", "Ines", "Lucia", "Mia", "Lea", "Vicki", "Bianca",
    "Zhiyu", "Takumi", "Seoyeon", "Hala", "Kajal",
];

/// AWS Polly implementation of TTS repository
///
/// Polly has no regional hosts; regional accents come from the voice, so the
/// domain variant is not used.
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }

    /// Select the appropriate Polly voice for a language code
    fn get_voice_for_language(language_code: &str) -> Option<&'static str> {
        let voice = match language_code {
            "en-gb" => "Amy",
            "en-au" => "Olivia",
            "pt-pt" => "Ines",
            "es-mx" => "Mia",
            other => match language::primary_subtag(other) {
                "en" => "Joanna",
                "pt" => "Camila",
                "es" => "Lucia",
                "fr" => "Lea",
                "de" => "Vicki",
                "it" => "Bianca",
                "ru" => "Tatyana",
                "zh" => "Zhiyu",
                "ja" => "Takumi",
                "ko" => "Seoyeon",
                "ar" => "Hala",
                "hi" => "Kajal",
                _ => return None,
            },
        };
        Some(voice)
    }

    fn engine_for_voice(voice: &str) -> Engine {
        if NEURAL_VOICES.contains(&voice) {
            Engine::Neural
        } else {
            Engine::Standard
        }
    }

    /// Call AWS Polly to synthesize a single text batch
    async fn call_polly(&self, text: &str, voice_name: &'static str) -> Result<Vec<u8>, SynthesisError> {
        let voice_id = VoiceId::from(voice_name);
        let engine = Self::engine_for_voice(voice_name);

        tracing::info!(
            voice = voice_name,
            engine = ?engine,
            output_format = "Mp3",
            text_length = text.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %e,
                    voice = voice_name,
                    engine = ?engine,
                    text_length = text.len(),
                    "AWS Polly synthesize_speech failed"
                );
                SynthesisError::Provider(format!("AWS Polly error: {}", e))
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            SynthesisError::Provider(format!("Failed to read audio stream: {}", e))
        })?;

        Ok(audio_stream.into_bytes().to_vec())
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        language_code: &str,
        _domain_variant: Option<&str>,
    ) -> Result<Vec<u8>, SynthesisError> {
        let start_time = std::time::Instant::now();

        let voice = Self::get_voice_for_language(language_code).ok_or_else(|| {
            SynthesisError::Provider(format!("AWS Polly has no voice for language '{}'", language_code))
        })?;

        let batches = split_into_batches(text, MAX_BATCH_SIZE);
        tracing::info!(
            batch_count = batches.len(),
            text_length = text.len(),
            voice = voice,
            "Text split into batches"
        );

        let mut merged_audio = Vec::new();
        for (index, batch) in batches.iter().enumerate() {
            let audio_data = self.call_polly(batch, voice).await?;
            merged_audio.extend(audio_data);

            tracing::debug!(
                batch_index = index,
                total_audio_size = merged_audio.len(),
                "Batch synthesized and merged"
            );
        }

        tracing::info!(
            provider = "polly",
            latency_ms = start_time.elapsed().as_millis(),
            batch_count = batches.len(),
            audio_size_bytes = merged_audio.len(),
            "TTS synthesis completed"
        );

        Ok(merged_audio)
    }

    fn provider_name(&self) -> &'static str {
        "polly"
    }
}
