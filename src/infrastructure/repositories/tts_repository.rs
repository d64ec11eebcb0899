use crate::domain::tts::SynthesisError;
use async_trait::async_trait;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (Google Translate, AWS Polly, OpenAI)
///
/// Implementations are responsible for:
/// - Handling provider-specific text length limitations
/// - Splitting text into batches if needed
/// - Merging audio chunks into a single audio stream
/// - Provider-specific voice selection
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize text to speech
    ///
    /// Returns merged audio data ready for playback (MP3 format)
    ///
    /// # Arguments
    /// * `text` - The validated text to synthesize
    /// * `language_code` - Normalized language tag such as `pt-br`
    /// * `domain_variant` - Regional routing hint such as `com.br`
    ///
    /// # Errors
    /// Returns `SynthesisError::Provider` if synthesis fails or the provider is unavailable
    async fn synthesize(
        &self,
        text: &str,
        language_code: &str,
        domain_variant: Option<&str>,
    ) -> Result<Vec<u8>, SynthesisError>;

    /// Short provider name for logs and readiness checks
    fn provider_name(&self) -> &'static str;
}
