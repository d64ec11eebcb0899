use super::cache_key::CacheKey;
use super::error::{SynthesisError, TtsServiceError};
use super::language;
use super::model::{text_preview, BatchItemResult, GeneratedAudio, GenerationResult, SynthesisRequest};
use super::settings::GenerationSettings;
use crate::infrastructure::audio::SpeedAdjuster;
use crate::infrastructure::cache::{CacheLookup, CacheStats, DiskAudioCache};
use crate::infrastructure::repositories::TtsRepository;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use futures::stream::{self, StreamExt};
use lingua::LanguageDetector;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Audio produced by one provider round trip, shared by every caller that
/// asked for the same key while it was running.
#[derive(Debug, Clone)]
struct Synthesized {
    audio: Arc<Vec<u8>>,
    elapsed: Duration,
}

type PendingGeneration = Shared<BoxFuture<'static, Result<Synthesized, SynthesisError>>>;
type InFlight = Arc<Mutex<HashMap<CacheKey, PendingGeneration>>>;

/// The parts of a generation that run detached from the caller.
struct SynthesisPipeline {
    tts_repo: Arc<dyn TtsRepository>,
    speed_adjuster: Arc<dyn SpeedAdjuster>,
    cache: Option<Arc<DiskAudioCache>>,
    synthesis_timeout: Duration,
}

pub struct TtsService {
    pipeline: Arc<SynthesisPipeline>,
    settings: GenerationSettings,
    language_detector: LanguageDetector,
    in_flight: InFlight,
}

impl TtsService {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        speed_adjuster: Arc<dyn SpeedAdjuster>,
        cache: Option<Arc<DiskAudioCache>>,
        settings: GenerationSettings,
    ) -> Self {
        let pipeline = SynthesisPipeline {
            tts_repo,
            speed_adjuster,
            cache,
            synthesis_timeout: settings.synthesis_timeout,
        };

        Self {
            pipeline: Arc::new(pipeline),
            settings,
            language_detector: language::build_detector(),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn provider_name(&self) -> &'static str {
        self.pipeline.tts_repo.provider_name()
    }

    pub fn cache_enabled(&self) -> bool {
        self.pipeline.cache.is_some()
    }

    /// `None` when caching is disabled.
    pub async fn cache_stats(&self) -> Option<CacheStats> {
        match &self.pipeline.cache {
            Some(cache) => Some(cache.stats().await),
            None => None,
        }
    }

    /// Whether the cache directory is usable; `None` when caching is disabled.
    pub async fn cache_available(&self) -> Option<bool> {
        match &self.pipeline.cache {
            Some(cache) => Some(cache.is_available().await),
            None => None,
        }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Produce the audio for one request
    ///
    /// This operation:
    /// - Validates text and speed before any I/O
    /// - Resolves the language (`auto` runs detection) and domain variant
    /// - Serves from the disk cache when possible
    /// - Otherwise synthesizes, adjusts speed and stores the result
    ///
    /// Concurrent requests for the same cache key share a single provider call.
    async fn generate(&self, request: SynthesisRequest) -> GenerationResult;

    /// Run `generate` for each text with bounded concurrency
    ///
    /// Results keep input order; one item failing does not affect the others.
    async fn generate_batch(
        &self,
        texts: Vec<String>,
        language_code: &str,
        speed: f32,
        domain_variant: Option<&str>,
    ) -> Result<Vec<BatchItemResult>, TtsServiceError>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn generate(&self, request: SynthesisRequest) -> GenerationResult {
        // 1. Validate before touching the cache or the provider
        let request = self.settings.validate(request)?;

        // 2. Resolve language and regional variant
        let language_code = self.resolve_language(&request.text, &request.language_code);
        let domain_variant = request
            .domain_variant
            .clone()
            .or_else(|| language::default_domain_variant(&language_code).map(str::to_string));

        let key = CacheKey::derive(
            &request.text,
            &language_code,
            request.speed,
            domain_variant.as_deref(),
        );

        tracing::info!(
            key = %key,
            language = %language_code,
            domain_variant = ?domain_variant,
            speed = request.speed,
            text_length = request.text.chars().count(),
            "TTS generation request"
        );

        // 3. Cache lookup
        if let Some(cache) = &self.pipeline.cache {
            match cache.lookup(&key).await {
                CacheLookup::Hit(audio_data) => {
                    tracing::info!(
                        key = %key,
                        cached_audio_size = audio_data.len(),
                        "TTS cache hit - returning cached audio"
                    );
                    return Ok(GeneratedAudio {
                        audio_data,
                        from_cache: true,
                        generation_time: None,
                        language_code,
                        speed: request.speed,
                    });
                }
                CacheLookup::Miss => {}
                CacheLookup::ReadError(error) => {
                    tracing::warn!(key = %key, error = %error, "Cache read failed, regenerating");
                }
            }
        }

        // 4. Join or start the generation for this key
        let synthesized = self
            .join_or_start(key, request.text, language_code.clone(), domain_variant, request.speed)
            .await?;

        Ok(GeneratedAudio {
            audio_data: Arc::unwrap_or_clone(synthesized.audio),
            from_cache: false,
            generation_time: Some(synthesized.elapsed),
            language_code,
            speed: request.speed,
        })
    }

    async fn generate_batch(
        &self,
        texts: Vec<String>,
        language_code: &str,
        speed: f32,
        domain_variant: Option<&str>,
    ) -> Result<Vec<BatchItemResult>, TtsServiceError> {
        self.settings.validate_batch_size(texts.len())?;

        let total = texts.len();
        let concurrency = self.settings.batch_concurrency.max(1);
        tracing::info!(
            batch_size = total,
            concurrency = concurrency,
            "Starting batch generation"
        );

        let results: Vec<BatchItemResult> = stream::iter(texts.into_iter().enumerate())
            .map(|(index, text)| {
                let preview = text_preview(&text);
                let mut request = SynthesisRequest::new(text, language_code).with_speed(speed);
                request.domain_variant = domain_variant.map(str::to_string);

                async move {
                    let result = self.generate(request).await;
                    if let Err(e) = &result {
                        tracing::warn!(index = index, error = %e, "Batch item failed");
                    }
                    BatchItemResult {
                        index,
                        text_preview: preview,
                        result,
                    }
                }
            })
            .buffered(concurrency)
            .collect()
            .await;

        let succeeded = results.iter().filter(|item| item.is_success()).count();
        tracing::info!(
            batch_size = total,
            succeeded = succeeded,
            failed = total - succeeded,
            "Batch generation finished"
        );

        Ok(results)
    }
}

impl TtsService {
    /// Map the requested code to the one used for synthesis.
    fn resolve_language(&self, text: &str, requested: &str) -> String {
        let code = language::normalize_language_code(requested);
        if code.is_empty() {
            return self.settings.default_language.clone();
        }
        if code != language::AUTO_DETECT {
            return code;
        }

        match language::detect_language(&self.language_detector, text) {
            Some(detected) => {
                tracing::info!(language_detected = detected, "Language detected for TTS synthesis");
                detected.to_string()
            }
            None => {
                tracing::warn!(
                    fallback = %self.settings.default_language,
                    "Could not detect language, falling back to default"
                );
                self.settings.default_language.clone()
            }
        }
    }

    /// Await the pending generation for `key`, starting it if there is none.
    ///
    /// The generation runs as its own task so it finishes (and fills the
    /// cache) even if every caller goes away.
    async fn join_or_start(
        &self,
        key: CacheKey,
        text: String,
        language_code: String,
        domain_variant: Option<String>,
        speed: f32,
    ) -> Result<Synthesized, SynthesisError> {
        let pending = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.get(&key) {
                Some(pending) => {
                    tracing::info!(key = %key, "Joining in-flight generation");
                    pending.clone()
                }
                None => {
                    let pipeline = Arc::clone(&self.pipeline);
                    let task_in_flight = Arc::clone(&self.in_flight);
                    let task_key = key.clone();
                    let handle = tokio::spawn(async move {
                        let result = pipeline
                            .run(&task_key, &text, &language_code, domain_variant.as_deref(), speed)
                            .await;
                        task_in_flight.lock().remove(&task_key);
                        result
                    });

                    let join_in_flight = Arc::clone(&self.in_flight);
                    let join_key = key.clone();
                    let pending = async move {
                        handle.await.unwrap_or_else(|e| {
                            join_in_flight.lock().remove(&join_key);
                            Err(SynthesisError::Provider(format!("generation task failed: {}", e)))
                        })
                    }
                    .boxed()
                    .shared();

                    in_flight.insert(key, pending.clone());
                    pending
                }
            }
        };

        pending.await
    }
}

impl SynthesisPipeline {
    /// Synthesize, adjust and store one artifact.
    async fn run(
        &self,
        key: &CacheKey,
        text: &str,
        language_code: &str,
        domain_variant: Option<&str>,
        speed: f32,
    ) -> Result<Synthesized, SynthesisError> {
        let start_time = Instant::now();
        let audio = tokio::time::timeout(
            self.synthesis_timeout,
            self.tts_repo.synthesize(text, language_code, domain_variant),
        )
        .await
        .map_err(|_| SynthesisError::Timeout(self.synthesis_timeout))
        .and_then(|result| result)
        .inspect_err(|e| {
            tracing::error!(
                key = %key,
                provider = self.tts_repo.provider_name(),
                error = %e,
                "TTS synthesis failed"
            );
        })?;
        let elapsed = start_time.elapsed();

        let audio = if speed != 1.0 {
            self.adjust_speed(audio, speed).await
        } else {
            audio
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(key, &audio).await {
                tracing::warn!(key = %key, error = %e, "Failed to store audio in cache");
            }
        }

        tracing::info!(
            key = %key,
            provider = self.tts_repo.provider_name(),
            latency_ms = elapsed.as_millis(),
            audio_size_bytes = audio.len(),
            "TTS generation completed"
        );

        Ok(Synthesized {
            audio: Arc::new(audio),
            elapsed,
        })
    }

    /// Apply the speed factor on the blocking pool, keeping the original
    /// audio if adjustment fails.
    async fn adjust_speed(&self, audio: Vec<u8>, speed: f32) -> Vec<u8> {
        let adjuster = Arc::clone(&self.speed_adjuster);
        let original = Arc::new(audio);
        let input = Arc::clone(&original);

        match tokio::task::spawn_blocking(move || adjuster.adjust(&input, speed)).await {
            Ok(Ok(adjusted)) => adjusted,
            Ok(Err(e)) => {
                tracing::warn!(speed = speed, error = %e, "Speed adjustment failed, using original audio");
                Arc::unwrap_or_clone(original)
            }
            Err(e) => {
                tracing::warn!(speed = speed, error = %e, "Speed adjustment task failed, using original audio");
                Arc::unwrap_or_clone(original)
            }
        }
    }
}
