use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_start_with_an_empty_session(ctx: &TestContext) {
    let response = ctx.client.get("/api/session").await.unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["generations"], 0);
    assert_eq!(body["history"].as_array().unwrap().len(), 0);
    assert!(body["session_id"].is_string());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_record_generations_in_history(ctx: &TestContext) {
    for _ in 0..2 {
        ctx.client
            .post("/api/tts/synthesize", &json!({ "text": "Recorded text" }))
            .await
            .unwrap()
            .assert_status(StatusCode::OK);
    }

    let response = ctx.client.get("/api/session").await.unwrap();
    let body = response.body.as_ref().unwrap();

    assert_eq!(body["generations"], 2);
    assert_eq!(body["cache_hits"], 1);
    assert_eq!(body["characters"], 26);

    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["text_preview"], "Recorded text");
    assert_eq!(history[0]["from_cache"], true);
    assert_eq!(history[1]["from_cache"], false);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_record_failed_generations(ctx: &TestContext) {
    ctx.client
        .post("/api/tts/synthesize", &json!({ "text": "this will fail" }))
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_GATEWAY);

    let response = ctx.client.get("/api/session").await.unwrap();
    assert_eq!(response.body.as_ref().unwrap()["generations"], 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reset_the_session(ctx: &TestContext) {
    ctx.client
        .post("/api/tts/synthesize", &json!({ "text": "Before reset" }))
        .await
        .unwrap();
    let before = ctx.client.get("/api/session").await.unwrap();
    let old_id = before.body.as_ref().unwrap()["session_id"].clone();

    let response = ctx.client.delete("/api/session").await.unwrap();
    response.assert_status(StatusCode::NO_CONTENT);

    let after = ctx.client.get("/api/session").await.unwrap();
    let body = after.body.as_ref().unwrap();
    assert_eq!(body["generations"], 0);
    assert!(body["history"].as_array().unwrap().is_empty());
    assert_ne!(body["session_id"], old_id);
}
