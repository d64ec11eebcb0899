use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::domain::tts::TtsService;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(tts_service): State<Arc<TtsService>>) -> impl IntoResponse {
    let provider = tts_service.provider_name();

    match tts_service.cache_available().await {
        Some(false) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "cache": "unavailable",
                "tts": provider
            })),
        ),
        available => {
            let cache = match available {
                Some(_) => "available",
                None => "disabled",
            };
            (
                StatusCode::OK,
                Json(json!({
                    "status": "ready",
                    "cache": cache,
                    "tts": provider
                })),
            )
        }
    }
}
