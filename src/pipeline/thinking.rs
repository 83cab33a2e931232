//! `<thinking>` tag handling.
//!
//! Two flavors share the same markers:
//! - [`extract_thinking`] works on a finished response body.
//! - [`ThinkingParser`] works incrementally on streamed deltas, where a marker may be
//!   split at any byte offset across chunks.

use crate::types::Fragment;
use once_cell::sync::Lazy;
use regex::Regex;

pub const OPEN_TAG: &str = "<thinking>";
pub const CLOSE_TAG: &str = "</thinking>";

/// Buffered thought is flushed once it grows past this many characters.
pub const THOUGHT_FLUSH_THRESHOLD: usize = 50;

static THINKING_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<thinking>(.*?)</thinking>").expect("static regex"));

/// Thought and visible text separated from a complete response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extracted {
    pub thought: String,
    pub text: String,
}

/// Pull every `<thinking>...</thinking>` region out of `full`.
///
/// Region bodies are concatenated in order. Removal is repeated until no region
/// remains, so the returned text never contains a complete region.
pub fn extract_thinking(full: &str) -> Extracted {
    let mut thought = String::new();
    let mut text = full.to_string();

    while THINKING_BLOCK.is_match(&text) {
        for caps in THINKING_BLOCK.captures_iter(&text) {
            if let Some(body) = caps.get(1) {
                thought.push_str(body.as_str());
            }
        }
        text = THINKING_BLOCK.replace_all(&text, "").into_owned();
    }

    Extracted {
        thought: thought.trim().to_string(),
        text: text.trim().to_string(),
    }
}

/// Length of the longest proper prefix of `marker` that `s` ends with.
fn partial_marker_len(s: &str, marker: &str) -> usize {
    (1..marker.len())
        .rev()
        .find(|&k| s.ends_with(&marker[..k]))
        .unwrap_or(0)
}

/// Incremental splitter for streamed content with inline thinking regions.
///
/// Text that might be the start of a marker is held back until the next delta
/// (or [`finish`](Self::finish)) resolves it; everything else is emitted as soon
/// as it arrives. Only one region can be open at a time.
#[derive(Debug, Default)]
pub struct ThinkingParser {
    carry: String,
    in_thinking: bool,
    thought: String,
}

impl ThinkingParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_thinking(&self) -> bool {
        self.in_thinking
    }

    /// Feed one content delta and collect the fragments it completes.
    pub fn push(&mut self, delta: &str) -> Vec<Fragment> {
        let mut out = Vec::new();
        let mut input = std::mem::take(&mut self.carry);
        input.push_str(delta);
        let mut rest = input.as_str();

        loop {
            if self.in_thinking {
                if let Some(idx) = rest.find(CLOSE_TAG) {
                    self.thought.push_str(&rest[..idx]);
                    self.flush_thought(&mut out);
                    self.in_thinking = false;
                    rest = &rest[idx + CLOSE_TAG.len()..];
                    continue;
                }
                let keep = partial_marker_len(rest, CLOSE_TAG);
                let (body, tail) = rest.split_at(rest.len() - keep);
                self.thought.push_str(body);
                self.carry = tail.to_string();
                if self.thought.chars().count() > THOUGHT_FLUSH_THRESHOLD {
                    out.push(Fragment::thought(std::mem::take(&mut self.thought)));
                }
                break;
            }

            if let Some(idx) = rest.find(OPEN_TAG) {
                Self::emit_text(&rest[..idx], &mut out);
                self.in_thinking = true;
                rest = &rest[idx + OPEN_TAG.len()..];
                continue;
            }
            let keep = partial_marker_len(rest, OPEN_TAG);
            let (body, tail) = rest.split_at(rest.len() - keep);
            Self::emit_text(body, &mut out);
            self.carry = tail.to_string();
            break;
        }

        out
    }

    /// Resolve held-back text and flush any remaining thought. Resets the parser.
    pub fn finish(&mut self) -> Vec<Fragment> {
        let mut out = Vec::new();
        let carry = std::mem::take(&mut self.carry);
        if self.in_thinking {
            self.thought.push_str(&carry);
        } else {
            Self::emit_text(&carry, &mut out);
        }
        self.flush_thought(&mut out);
        self.in_thinking = false;
        out
    }

    fn emit_text(text: &str, out: &mut Vec<Fragment>) {
        if text.is_empty() {
            return;
        }
        out.push(Fragment::text(text));
    }

    // Whitespace-only thought is dropped rather than emitted.
    fn flush_thought(&mut self, out: &mut Vec<Fragment>) {
        let thought = std::mem::take(&mut self.thought);
        if !thought.trim().is_empty() {
            out.push(Fragment::thought(thought));
        }
    }
}
