//! Provider-agnostic generation request.

use crate::types::message::{Message, MessageContent};
use serde::{Deserialize, Serialize};

/// Upper bound applied to every temperature before it reaches a provider.
pub const MAX_TEMPERATURE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    #[default]
    Text,
    JsonObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub include_thoughts: bool,
    pub thinking_budget: i64,
}

impl ThinkingConfig {
    pub fn new(include_thoughts: bool, thinking_budget: i64) -> Self {
        Self {
            include_thoughts,
            thinking_budget,
        }
    }
}

/// A single-turn generation request: optional system instruction plus one user turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, content: impl Into<MessageContent>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            content: content.into(),
            temperature: None,
            response_format: None,
            thinking_config: None,
        }
    }

    pub fn system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(text.into());
        self
    }

    pub fn temperature(mut self, t: f64) -> Self {
        self.temperature = Some(t);
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn thinking(mut self, config: ThinkingConfig) -> Self {
        self.thinking_config = Some(config);
        self
    }

    pub fn include_thoughts(&self) -> bool {
        self.thinking_config
            .map(|c| c.include_thoughts)
            .unwrap_or(false)
    }

    pub fn wants_json(&self) -> bool {
        self.response_format == Some(ResponseFormat::JsonObject)
    }

    /// Temperature to put on the wire: clamped, or `None` when the caller set none.
    pub fn effective_temperature(&self) -> Option<f64> {
        self.temperature.map(|t| t.min(MAX_TEMPERATURE))
    }

    /// System message (when present) followed by exactly one user message.
    pub fn messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = self.system_instruction.as_deref().filter(|s| !s.is_empty()) {
            messages.push(Message::system(sys));
        }
        messages.push(Message::user(self.content.clone()));
        messages
    }
}
