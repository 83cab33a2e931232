//! Mock HTTP server setup for integration tests

#![allow(dead_code)]

use ai_lib_reasoning::{AiClient, AiClientBuilder, ExponentialBackoff, Provider, RetryConfig};
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const TEST_KEY: &str = "test-key";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Client for `provider` pointed at the mock server, without retries.
    pub fn client(&self, provider: Provider) -> AiClient {
        self.builder(provider)
            .no_retry()
            .build()
            .expect("client should build")
    }

    /// Client that retries immediately, up to `max_retries` times.
    pub fn retrying_client(&self, provider: Provider, max_retries: u32) -> AiClient {
        self.builder(provider)
            .retry_policy(Arc::new(ExponentialBackoff::new(RetryConfig {
                max_retries,
                min_delay: Duration::ZERO,
                max_delay: Duration::ZERO,
            })))
            .build()
            .expect("client should build")
    }

    fn builder(&self, provider: Provider) -> AiClientBuilder {
        AiClientBuilder::new()
            .provider(provider)
            .api_key(TEST_KEY)
            .base_url(&self.base_url)
    }

    /// Create a mock for a successful streaming response (SSE)
    pub async fn mock_sse_stream(&self, path: &str, chunks: &[&str]) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(sse_body(chunks))
            .create_async()
            .await
    }

    /// Create a mock for a JSON response
    pub async fn mock_json_response(&self, path: &str, status: u16, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .with_status(status.into())
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Like [`mock_json_response`](Self::mock_json_response), matched at most `hits` times in order.
    pub async fn mock_json_times(&self, path: &str, status: u16, body: &str, hits: usize) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .with_status(status.into())
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }
}

/// SSE body with one `data:` frame per chunk.
pub fn sse_body(chunks: &[&str]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            if chunk.starts_with("data: ") {
                format!("{}\n\n", chunk)
            } else {
                format!("data: {}\n\n", chunk)
            }
        })
        .collect()
}

pub fn bearer() -> Matcher {
    Matcher::Exact(format!("Bearer {}", TEST_KEY))
}
