//! Normalization of provider output into [`Completion`] and [`Fragment`]s.

use crate::pipeline::thinking::{extract_thinking, ThinkingParser};
use crate::types::{ChunkDelta, Completion, Fragment, RawCompletion, ThinkingConfig};
use crate::BoxStream;
use futures::{stream, StreamExt};
use std::collections::VecDeque;

/// Normalize a completed response.
///
/// Native reasoning wins over inline tags; tags are only parsed when thoughts were
/// requested and the provider returned no reasoning field.
pub fn normalize_response(raw: &RawCompletion, thinking: Option<&ThinkingConfig>) -> Completion {
    let include_thoughts = thinking.map(|c| c.include_thoughts).unwrap_or(false);
    if !include_thoughts {
        return Completion {
            text: raw.content.clone(),
            thought: None,
        };
    }

    if let Some(reasoning) = raw.reasoning.as_deref().filter(|r| !r.is_empty()) {
        return Completion {
            text: raw.content.clone(),
            thought: Some(reasoning.to_string()),
        };
    }

    let extracted = extract_thinking(&raw.content);
    Completion {
        text: extracted.text,
        thought: Some(extracted.thought),
    }
}

/// Per-stream state turning chunk deltas into ordered fragments.
#[derive(Debug)]
pub struct StreamNormalizer {
    include_thoughts: bool,
    native_reasoning_seen: bool,
    parser: ThinkingParser,
}

impl StreamNormalizer {
    pub fn new(include_thoughts: bool) -> Self {
        Self {
            include_thoughts,
            native_reasoning_seen: false,
            parser: ThinkingParser::new(),
        }
    }

    /// Fragments produced by one chunk; a reasoning delta always precedes the
    /// content of the same chunk.
    pub fn push(&mut self, delta: &ChunkDelta) -> Vec<Fragment> {
        let mut out = Vec::new();

        if self.include_thoughts {
            if let Some(reasoning) = delta.reasoning.as_deref().filter(|r| !r.is_empty()) {
                if !self.native_reasoning_seen {
                    // Tag parsing stops once the provider reports reasoning natively.
                    self.native_reasoning_seen = true;
                    out.extend(self.parser.finish());
                }
                out.push(Fragment::thought(reasoning));
            }
        }

        if let Some(content) = delta.content.as_deref().filter(|c| !c.is_empty()) {
            if self.include_thoughts && !self.native_reasoning_seen {
                out.extend(self.parser.push(content));
            } else {
                out.push(Fragment::text(content));
            }
        }

        out
    }

    /// Fragments still held once the upstream is exhausted.
    pub fn finish(&mut self) -> Vec<Fragment> {
        self.parser.finish()
    }
}

/// Lazily normalize a stream of chunk deltas.
///
/// Errors from upstream are forwarded once and end the sequence; buffered thought
/// is only flushed on a clean end of stream.
pub fn normalize_stream(
    input: BoxStream<'static, ChunkDelta>,
    include_thoughts: bool,
) -> BoxStream<'static, Fragment> {
    let state = (
        input,
        StreamNormalizer::new(include_thoughts),
        VecDeque::<Fragment>::new(),
        false,
    );
    let stream = stream::unfold(
        state,
        |(mut input, mut normalizer, mut pending, mut finished)| async move {
            loop {
                if let Some(fragment) = pending.pop_front() {
                    return Some((Ok(fragment), (input, normalizer, pending, finished)));
                }
                if finished {
                    return None;
                }
                match input.next().await {
                    Some(Ok(delta)) => pending.extend(normalizer.push(&delta)),
                    Some(Err(e)) => {
                        return Some((Err(e), (input, normalizer, pending, true)));
                    }
                    None => {
                        finished = true;
                        pending.extend(normalizer.finish());
                    }
                }
            }
        },
    );
    Box::pin(stream)
}
