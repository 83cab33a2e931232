//! Provider dialect drivers.
//!
//! Each wire dialect has one driver that builds request bodies and pulls
//! `content` / reasoning out of responses and stream frames. The client and the
//! normalizers only see [`RawCompletion`] and [`ChunkDelta`], never provider JSON.

pub mod gemini;

use serde_json::Value;

use crate::provider::{Dialect, Provider};
use crate::types::{ChunkDelta, GenerateRequest, RawCompletion};
use crate::Result;

pub use gemini::GeminiDriver;

/// How the API key is attached to outgoing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-goog-api-key: <key>`
    GoogApiKey,
}

/// Dialect-specific HTTP request, relative to the client's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Value,
    pub stream: bool,
}

/// Core trait for provider-specific API adaptation.
pub trait ProviderDriver: Send + Sync + std::fmt::Debug {
    fn provider(&self) -> Provider;

    fn dialect(&self) -> Dialect;

    fn auth_scheme(&self) -> AuthScheme;

    /// Build the request body for a single-turn generation.
    fn build_request(&self, request: &GenerateRequest, stream: bool) -> Result<DriverRequest>;

    /// Extract content and native reasoning from a completed response.
    ///
    /// Missing fields yield empty content rather than an error.
    fn parse_response(&self, body: &Value) -> RawCompletion;

    /// Extract deltas from one decoded stream frame; `None` when the frame has neither.
    fn parse_stream_chunk(&self, frame: &Value) -> Option<ChunkDelta>;
}

/// OpenAI chat-completions driver, shared by every OpenAI-compatible provider.
#[derive(Debug)]
pub struct OpenAiDriver {
    provider: Provider,
}

impl OpenAiDriver {
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }
}

fn non_empty_str(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

impl ProviderDriver for OpenAiDriver {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn dialect(&self) -> Dialect {
        Dialect::OpenAiCompatible
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::Bearer
    }

    fn build_request(&self, request: &GenerateRequest, stream: bool) -> Result<DriverRequest> {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": serde_json::to_value(request.messages())?,
        });

        if let Some(t) = request.effective_temperature() {
            body["temperature"] = serde_json::json!(t);
        }
        if request.wants_json() {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }
        if stream {
            body["stream"] = Value::Bool(true);
        }

        Ok(DriverRequest {
            path: "/chat/completions".into(),
            query: Vec::new(),
            body,
            stream,
        })
    }

    fn parse_response(&self, body: &Value) -> RawCompletion {
        let message = body.pointer("/choices/0/message");
        RawCompletion {
            content: message
                .and_then(|m| m.get("content"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            reasoning: non_empty_str(message.and_then(|m| m.get("reasoning_content"))),
        }
    }

    fn parse_stream_chunk(&self, frame: &Value) -> Option<ChunkDelta> {
        let delta = frame.pointer("/choices/0/delta")?;
        let content = non_empty_str(delta.get("content"));
        let reasoning = non_empty_str(delta.get("reasoning_content"));
        if content.is_none() && reasoning.is_none() {
            return None;
        }
        Some(ChunkDelta { content, reasoning })
    }
}

/// Factory function to create the driver for a provider's dialect.
pub fn create_driver(provider: Provider) -> Box<dyn ProviderDriver> {
    match provider.dialect() {
        Dialect::OpenAiCompatible => Box::new(OpenAiDriver::new(provider)),
        Dialect::GoogleNative => Box::new(GeminiDriver::new()),
    }
}
