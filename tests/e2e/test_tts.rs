use crate::e2e::helpers;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;
use voicify::infrastructure::audio::codec::decode_mp3;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_synthesize_text_to_speech(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": "Hello world" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    response.assert_header("content-type", "audio/mpeg");
    response.assert_header("x-from-cache", "false");
    response.assert_header("x-language", "en-us");
    response.assert_header("x-audio-size", &response.body_bytes.len().to_string());
    response.assert_header_exists("x-generation-time-seconds");

    let disposition = response.header("content-disposition").unwrap();
    assert!(disposition.starts_with("attachment; filename=\"Hello_world_"));
    assert!(disposition.ends_with(".mp3\""));

    assert!(decode_mp3(&response.body_bytes).is_ok());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_repeated_requests_from_cache(ctx: &TestContext) {
    let request = json!({ "text": "Cache me", "language": "pt-br" });

    let first = ctx.client.post("/api/tts/synthesize", &request).await.unwrap();
    first.assert_status(StatusCode::OK);

    let second = ctx.client.post("/api/tts/synthesize", &request).await.unwrap();
    second.assert_status(StatusCode::OK);
    second.assert_header("x-from-cache", "true");
    assert!(second.header("x-generation-time-seconds").is_none());
    assert_eq!(second.body_bytes, first.body_bytes);

    assert_eq!(ctx.tts_repo.calls(), 1);
    assert_eq!(ctx.cached_files(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": "   " }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("no text provided");
    assert_eq!(ctx.tts_repo.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_text_over_the_limit(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": "a".repeat(10_001) }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE)
        .assert_error_message("text too long");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_speed_out_of_range(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": "Hello", "speed": 3.0 }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("speed");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_map_provider_failures_to_bad_gateway(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": "please fail" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_GATEWAY)
        .assert_error_message("provider error");
    assert_eq!(ctx.cached_files(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_shorten_audio_when_speeding_up(ctx: &TestContext) {
    // 25 characters -> 2.5s of mock audio
    let text = "Twenty five chars of text";

    let normal = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": text }))
        .await
        .unwrap();
    let faster = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": text, "speed": 1.5 }))
        .await
        .unwrap();

    normal.assert_status(StatusCode::OK);
    faster.assert_status(StatusCode::OK);

    let normal_secs = decode_mp3(&normal.body_bytes).unwrap().duration_secs();
    let faster_secs = decode_mp3(&faster.body_bytes).unwrap().duration_secs();
    assert!(
        faster_secs < normal_secs * 0.8,
        "expected {}s to be well below {}s",
        faster_secs,
        normal_secs
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_run_a_batch_with_partial_failure(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/tts/batch",
            &json!({ "texts": ["hello", "", "world"], "language": "en-gb" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["succeeded"], 2);
    assert_eq!(body["failed"], 1);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    for (i, item) in results.iter().enumerate() {
        assert_eq!(item["index"], i);
    }

    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["text"], "hello");
    let audio = STANDARD
        .decode(results[0]["audio_base64"].as_str().unwrap())
        .unwrap();
    assert_eq!(results[0]["size_bytes"], audio.len());

    assert_eq!(results[1]["success"], false);
    assert_eq!(results[1]["error"], "no text provided");

    assert_eq!(results[2]["success"], true);
    assert_eq!(ctx.tts_repo.calls(), 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_oversized_batches(ctx: &TestContext) {
    let texts: Vec<String> = (0..11).map(|i| format!("text {}", i)).collect();

    let response = ctx
        .client
        .post("/api/tts/batch", &json!({ "texts": texts }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("batch too large");
    assert_eq!(ctx.tts_repo.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_supported_languages(ctx: &TestContext) {
    let response = ctx.client.get("/api/languages").await.unwrap();

    response.assert_status(StatusCode::OK);
    let languages = response.body.as_ref().unwrap().as_array().unwrap();
    assert_eq!(languages.len(), 16);

    let portuguese = languages
        .iter()
        .find(|language| language["code"] == "pt-br")
        .expect("pt-br missing");
    assert_eq!(portuguese["domain_variant"], "com.br");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_cache_stats(ctx: &TestContext) {
    let synthesized = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "text": "Stats please" }))
        .await
        .unwrap();

    let response = ctx.client.get("/api/cache/stats").await.unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["entries"], 1);
    assert_eq!(body["size_bytes"], synthesized.body_bytes.len());
    assert_eq!(body["max_size_bytes"], 100 * 1024 * 1024);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_requests_without_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts/synthesize", &json!({ "language": "en-us" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_domain_variants_that_are_not_a_tld(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/tts/synthesize",
            &json!({ "text": "Hello", "domain_variant": "com@127.0.0.1:9999/x?" }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("invalid domain variant");
    assert_eq!(ctx.tts_repo.calls(), 0);
    assert_eq!(ctx.cached_files(), 0);
}
