//! Remote failures, retries and client construction errors.

mod common;

use ai_lib_reasoning::{AiClientBuilder, Error, GenerateRequest, Provider};
use common::MockServerFixture;

const PATH: &str = "/chat/completions";
const OK_BODY: &str = r#"{"choices":[{"message":{"content":"recovered"}}]}"#;

#[tokio::test]
async fn unauthorized_is_not_retried() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_times(
            PATH,
            401,
            r#"{"error":{"message":"Invalid API key","type":"invalid_request_error"}}"#,
            1,
        )
        .await;

    let client = fixture.retrying_client(Provider::OpenAI, 3);
    let err = client
        .generate_content(&GenerateRequest::new("gpt-4o", "hi"))
        .await
        .unwrap_err();

    match &err {
        Error::Remote {
            status,
            message,
            retryable,
        } => {
            assert_eq!(*status, 401);
            assert_eq!(message, "Invalid API key");
            assert!(!retryable);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn transient_failure_is_retried_until_success() {
    let fixture = MockServerFixture::new().await;
    let failing = fixture
        .mock_json_times(PATH, 503, r#"{"error":{"message":"overloaded"}}"#, 1)
        .await;
    let ok = fixture.mock_json_times(PATH, 200, OK_BODY, 1).await;

    let client = fixture.retrying_client(Provider::OpenAI, 2);
    let out = client
        .generate_content(&GenerateRequest::new("gpt-4o", "hi"))
        .await
        .unwrap();

    assert_eq!(out.text, "recovered");
    failing.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn exhausted_retries_return_last_error() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_times(PATH, 429, r#"{"error":{"message":"slow down"}}"#, 3)
        .await;

    let client = fixture.retrying_client(Provider::DeepSeek, 2);
    let err = client
        .generate_content(&GenerateRequest::new("deepseek-chat", "hi"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(429));
    assert!(err.is_retryable());
    assert!(err.to_string().contains("slow down"));
    mock.assert_async().await;
}

#[tokio::test]
async fn stream_open_failure_surfaces_before_any_fragment() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(PATH, 500, "upstream exploded")
        .await;

    let client = fixture.client(Provider::OpenAI);
    let err = client
        .generate_content_stream(&GenerateRequest::new("gpt-4o", "hi"))
        .await
        .err()
        .expect("opening the stream should fail");

    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    // Port 9 (discard) is reserved and normally closed.
    let client = AiClientBuilder::new()
        .provider(Provider::OpenAI)
        .api_key("k")
        .base_url("http://127.0.0.1:9")
        .no_retry()
        .build()
        .unwrap();

    let err = client
        .generate_content(&GenerateRequest::new("gpt-4o", "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "{err:?}");
    assert!(err.is_retryable());
}

#[test]
fn invalid_base_url_fails_construction() {
    let err = AiClientBuilder::new()
        .provider(Provider::Custom)
        .base_url("not a url")
        .build()
        .err()
        .expect("construction should fail");

    assert!(matches!(err, Error::Configuration { .. }));
    assert_eq!(
        err.context().and_then(|c| c.field_path.as_deref()),
        Some("config.base_url")
    );
}

#[test]
fn construction_needs_no_key_or_network() {
    let client = AiClientBuilder::new()
        .model("claude-3-5-sonnet")
        .build()
        .unwrap();
    assert_eq!(client.provider(), Provider::Anthropic);
    assert_eq!(client.options().api_key(), None);
    assert_eq!(client.base_url(), "https://api.anthropic.com/v1");
}
