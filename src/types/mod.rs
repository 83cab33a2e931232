//! Core data types: messages, requests, and normalized outputs.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`GenerateRequest`] | Single-turn request with optional thinking configuration |
//! | [`Message`] | Chat message in OpenAI-compatible form |
//! | [`Completion`] | Normalized non-streaming result |
//! | [`Fragment`] | Normalized streaming delta |
//! | [`RawCompletion`] / [`ChunkDelta`] | Dialect-neutral provider payloads |

pub mod completion;
pub mod message;
pub mod request;

pub use completion::{ChunkDelta, Completion, Fragment, RawCompletion};
pub use message::{ContentBlock, ImageUrl, Message, MessageContent, MessageRole};
pub use request::{GenerateRequest, ResponseFormat, ThinkingConfig, MAX_TEMPERATURE};
