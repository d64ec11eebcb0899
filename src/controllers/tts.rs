use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use chrono::Local;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::{
    domain::{
        session::SessionState,
        tts::{
            dto::{BatchRequest, BatchResponse, LanguageResponse, SynthesizeRequest},
            filename::download_file_name,
            language::SUPPORTED_LANGUAGES,
            SynthesisRequest, TtsService, TtsServiceApi,
        },
    },
    error::{AppError, AppResult},
    infrastructure::cache::CacheStats,
};

pub struct TtsController {
    tts_service: Arc<TtsService>,
    session: Arc<RwLock<SessionState>>,
}

impl TtsController {
    pub fn new(tts_service: Arc<TtsService>, session: Arc<RwLock<SessionState>>) -> Self {
        Self {
            tts_service,
            session,
        }
    }

    /// POST /api/tts/synthesize - Convert text to speech
    pub async fn synthesize(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<SynthesizeRequest>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let settings = controller.tts_service.settings();
        let speed = request.speed.unwrap_or(settings.default_speed);
        let language = request
            .language
            .unwrap_or_else(|| settings.default_language.clone());

        let mut synthesis_request = SynthesisRequest::new(request.text.clone(), language).with_speed(speed);
        synthesis_request.domain_variant = request.domain_variant;

        let audio = controller.tts_service.generate(synthesis_request).await?;

        controller.session.write().record(&request.text, &audio);

        // Build headers
        let file_name = download_file_name(&request.text, Local::now());
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
        headers.insert(
            header::CONTENT_DISPOSITION,
            header_value(&format!("attachment; filename=\"{}\"", file_name))?,
        );
        headers.insert("X-From-Cache", HeaderValue::from_static(if audio.from_cache { "true" } else { "false" }));
        headers.insert("X-Audio-Size", HeaderValue::from(audio.size_bytes()));
        headers.insert("X-Language", header_value(&audio.language_code)?);
        if let Some(generation_time) = audio.generation_time {
            headers.insert(
                "X-Generation-Time-Seconds",
                header_value(&format!("{:.3}", generation_time.as_secs_f64()))?,
            );
        }

        Ok((StatusCode::OK, headers, Body::from(audio.audio_data)))
    }

    /// POST /api/tts/batch - Convert several texts, audio returned base64 encoded
    pub async fn batch(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<BatchRequest>,
    ) -> AppResult<Json<BatchResponse>> {
        let settings = controller.tts_service.settings();
        let speed = request.speed.unwrap_or(settings.default_speed);
        let language = request
            .language
            .unwrap_or_else(|| settings.default_language.clone());

        let results = controller
            .tts_service
            .generate_batch(
                request.texts.clone(),
                &language,
                speed,
                request.domain_variant.as_deref(),
            )
            .await?;

        {
            let mut session = controller.session.write();
            for item in &results {
                if let (Ok(audio), Some(text)) = (&item.result, request.texts.get(item.index)) {
                    session.record(text, audio);
                }
            }
        }

        Ok(Json(BatchResponse::from_results(results)))
    }

    /// GET /api/languages - Supported languages and their default variants
    pub async fn languages() -> Json<Vec<LanguageResponse>> {
        Json(SUPPORTED_LANGUAGES.iter().map(LanguageResponse::from).collect())
    }

    /// GET /api/cache/stats - Size and entry count of the audio cache
    pub async fn cache_stats(
        State(controller): State<Arc<TtsController>>,
    ) -> AppResult<Json<CacheStats>> {
        controller
            .tts_service
            .cache_stats()
            .await
            .map(Json)
            .ok_or_else(|| AppError::BadRequest("Audio cache is disabled".to_string()))
    }
}

fn header_value(value: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Internal(format!("invalid header value '{}': {}", value, e)))
}
