use crate::e2e::helpers;

use helpers::{article, eventually, TestContext};
use hyper::StatusCode;
use rttm_backend::controllers::submission::{SubmitRequest, SubmitResponse};
use rttm_backend::domain::pipeline::error::ExtractionError;
use serde_json::Value;
use std::time::Duration;
use test_context::test_context;

const PHONE: &str = "+15551234567";

fn submit(url: &str, phone: &str) -> SubmitRequest {
    SubmitRequest {
        url: url.to_string(),
        phone: phone.to_string(),
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_accept_a_valid_submission(ctx: &TestContext) {
    ctx.extractor
        .serve("https://example.com/post", "A Post", &article(250));

    let response = ctx
        .client
        .post("/submit", &submit("https://example.com/post", PHONE))
        .await
        .unwrap();

    response.assert_status(StatusCode::ACCEPTED);
    let accepted: SubmitResponse = response.json().unwrap();
    assert_eq!(accepted.status, "accepted");
    assert!(!accepted.run_id.is_nil());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_invalid_fields(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/submit", &submit("ftp://example.com/file", "12"))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_field_error("url", "Invalid URL")
        .assert_field_error("phone", "Invalid phone number");
    assert_eq!(ctx.extractor.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_a_phone_without_country_code(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/submit", &submit("https://example.com/post", "555-123-4567"))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_field_error("phone", "Invalid phone number");
    assert_eq!(ctx.extractor.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_missing_fields(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/submit", &serde_json::json!({}))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_field_error("url", "Required")
        .assert_field_error("phone", "Required");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_deliver_the_article_to_the_feed(ctx: &TestContext) {
    ctx.extractor
        .serve("https://example.com/post", "A Post", &article(250));

    ctx.client
        .post("/submit", &submit("https://Example.com/post#comments", "+1 555 123 4567"))
        .await
        .unwrap()
        .assert_status(StatusCode::ACCEPTED);
    ctx.wait_for_requests(1).await;

    let response = ctx.client.get(&format!("/feeds/{}", PHONE)).await.unwrap();
    response.assert_status(StatusCode::OK);

    let body: Value = response.json().unwrap();
    assert_eq!(body["phone"], PHONE);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "A Post");
    assert_eq!(items[0]["link"], "https://example.com/post");
    assert_eq!(items[0]["description"], "About A Post");
    assert_eq!(items[0]["audio_type"], "audio/mpeg");

    // Segments fit the synthesizer limit
    assert!(ctx.synthesizer.calls() >= 3);
    let uploads = ctx.storage.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(items[0]["audio_length"], uploads[0].1.len() as u64);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_text_the_recipient(ctx: &TestContext) {
    ctx.extractor
        .serve("https://example.com/post", "A Post", &article(250));

    ctx.client
        .post("/submit", &submit("https://example.com/post", PHONE))
        .await
        .unwrap();
    ctx.wait_for_requests(1).await;

    let sms = ctx.sms.clone();
    eventually(move || {
        let sms = sms.clone();
        async move { !sms.sent().is_empty() }
    })
    .await;

    let content: Value = ctx
        .client
        .get("/content?url=https%3A%2F%2Fexample.com%2Fpost")
        .await
        .unwrap()
        .json()
        .unwrap();
    let audio_url = content["audio_url"].as_str().unwrap();
    assert_eq!(
        audio_url,
        format!("https://audio.test/audio/{}.mp3", content["id"].as_str().unwrap())
    );

    let sent = ctx.sms.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, PHONE);
    assert_eq!(sent[0].1, format!("A Post\n{}", audio_url));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reuse_content_for_a_known_url(ctx: &TestContext) {
    ctx.extractor
        .serve("https://example.com/post", "A Post", &article(250));

    ctx.client
        .post("/submit", &submit("https://example.com/post", PHONE))
        .await
        .unwrap();
    ctx.wait_for_requests(1).await;

    ctx.client
        .post("/submit", &submit("https://example.com/post#again", "+15559876543"))
        .await
        .unwrap();
    ctx.wait_for_requests(2).await;

    assert_eq!(ctx.extractor.calls(), 1);
    assert_eq!(ctx.storage.uploads().len(), 1);
    assert_eq!(ctx.store.content_count().await, 1);

    let feed: Value = ctx
        .client
        .get("/feeds/+15559876543")
        .await
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(feed["items"][0]["title"], "A Post");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_leave_no_state_when_extraction_fails(ctx: &TestContext) {
    ctx.extractor
        .fail("https://example.com/gone", ExtractionError::Status(410));

    ctx.client
        .post("/submit", &submit("https://example.com/gone", PHONE))
        .await
        .unwrap()
        .assert_status(StatusCode::ACCEPTED);

    let extractor = ctx.extractor.clone();
    eventually(move || {
        let extractor = extractor.clone();
        async move { extractor.calls() == 1 }
    })
    .await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(ctx.store.content_count().await, 0);
    assert_eq!(ctx.store.request_count().await, 0);
    assert!(ctx.storage.uploads().is_empty());
    assert!(ctx.sms.sent().is_empty());

    let feed: Value = ctx
        .client
        .get(&format!("/feeds/{}", PHONE))
        .await
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(feed["items"].as_array().unwrap().len(), 0);
}
