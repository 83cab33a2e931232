//! Normalized outputs and the raw provider shapes they are derived from.

use serde::{Deserialize, Serialize};

/// Result of a non-streaming call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
}

/// One incremental unit of a streamed answer.
///
/// Streamed fragments carry either a text delta or a thought delta; the other
/// field is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub thought: String,
}

impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            thought: String::new(),
        }
    }

    pub fn thought(thought: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            thought: thought.into(),
        }
    }

    pub fn is_thought(&self) -> bool {
        !self.thought.is_empty()
    }
}

/// Content and native reasoning pulled out of a completed provider response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawCompletion {
    pub content: String,
    /// `reasoning_content` (OpenAI dialect) or thought parts (Google dialect).
    pub reasoning: Option<String>,
}

/// Content and reasoning deltas carried by one stream chunk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkDelta {
    pub content: Option<String>,
    pub reasoning: Option<String>,
}

impl ChunkDelta {
    pub fn content(s: impl Into<String>) -> Self {
        Self {
            content: Some(s.into()),
            reasoning: None,
        }
    }

    pub fn reasoning(s: impl Into<String>) -> Self {
        Self {
            content: None,
            reasoning: Some(s.into()),
        }
    }
}
