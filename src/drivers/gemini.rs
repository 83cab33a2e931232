//! Google Gemini generateContent API driver. Key differences from the OpenAI dialect:
//! - Uses `contents` with `parts` instead of `messages`; the system prompt goes to `systemInstruction`.
//! - `generationConfig` wraps temperature, JSON mode (`responseMimeType`) and `thinkingConfig`.
//! - Response: `candidates[0].content.parts[]`; parts flagged `thought: true` carry reasoning.
//! - Streaming uses `:streamGenerateContent?alt=sse`, each frame a full response object.

use serde_json::{json, Value};

use super::{AuthScheme, DriverRequest, ProviderDriver};
use crate::provider::{Dialect, Provider};
use crate::types::message::parse_data_url;
use crate::types::{ChunkDelta, ContentBlock, GenerateRequest, MessageContent, RawCompletion};
use crate::Result;

#[derive(Debug, Default)]
pub struct GeminiDriver;

impl GeminiDriver {
    pub fn new() -> Self {
        Self
    }

    /// Convert MessageContent to Gemini `parts` array.
    fn content_to_parts(content: &MessageContent) -> Vec<Value> {
        match content {
            MessageContent::Text(s) => vec![json!({ "text": s })],
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .map(|b| match b {
                    ContentBlock::Text { text } => json!({ "text": text }),
                    ContentBlock::ImageUrl { image_url } => match parse_data_url(&image_url.url) {
                        Some((mime, data)) => json!({
                            "inlineData": { "mimeType": mime, "data": data }
                        }),
                        None => json!({ "fileData": { "fileUri": image_url.url } }),
                    },
                })
                .collect(),
        }
    }

    /// Split `candidates[0].content.parts` into (answer text, thought text).
    fn split_parts(body: &Value) -> (String, String) {
        let mut text = String::new();
        let mut thought = String::new();
        let parts = body
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array);
        for part in parts.into_iter().flatten() {
            let Some(s) = part.get("text").and_then(Value::as_str) else {
                continue;
            };
            if part.get("thought").and_then(Value::as_bool).unwrap_or(false) {
                thought.push_str(s);
            } else {
                text.push_str(s);
            }
        }
        (text, thought)
    }
}

impl ProviderDriver for GeminiDriver {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn dialect(&self) -> Dialect {
        Dialect::GoogleNative
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::GoogApiKey
    }

    fn build_request(&self, request: &GenerateRequest, stream: bool) -> Result<DriverRequest> {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": Self::content_to_parts(&request.content),
            }],
        });

        if let Some(sys) = request.system_instruction.as_deref().filter(|s| !s.is_empty()) {
            body["systemInstruction"] = json!({ "parts": [{ "text": sys }] });
        }

        let mut gen_config = serde_json::Map::new();
        if let Some(t) = request.effective_temperature() {
            gen_config.insert("temperature".into(), json!(t));
        }
        if request.wants_json() {
            gen_config.insert("responseMimeType".into(), json!("application/json"));
        }
        if let Some(thinking) = request.thinking_config {
            gen_config.insert("thinkingConfig".into(), serde_json::to_value(thinking)?);
        }
        if !gen_config.is_empty() {
            body["generationConfig"] = Value::Object(gen_config);
        }

        let (action, query) = if stream {
            ("streamGenerateContent", vec![("alt".to_string(), "sse".to_string())])
        } else {
            ("generateContent", Vec::new())
        };

        Ok(DriverRequest {
            path: format!("/models/{}:{}", request.model, action),
            query,
            body,
            stream,
        })
    }

    fn parse_response(&self, body: &Value) -> RawCompletion {
        let (content, thought) = Self::split_parts(body);
        RawCompletion {
            content,
            reasoning: (!thought.is_empty()).then_some(thought),
        }
    }

    fn parse_stream_chunk(&self, frame: &Value) -> Option<ChunkDelta> {
        let (content, thought) = Self::split_parts(frame);
        if content.is_empty() && thought.is_empty() {
            return None;
        }
        Some(ChunkDelta {
            content: (!content.is_empty()).then_some(content),
            reasoning: (!thought.is_empty()).then_some(thought),
        })
    }
}
