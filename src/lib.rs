//! # ai-lib-reasoning
//!
//! Provider selection and reasoning-aware response normalization for chat
//! completion APIs.
//!
//! ## Overview
//!
//! A model name picks the provider ([`Provider::resolve`]); the provider picks the
//! wire dialect (OpenAI-compatible or Google native). Every response, streamed or
//! not, comes back in one shape: visible `text` plus optional `thought`, whether
//! the provider reports reasoning in a dedicated field or inline as
//! `<thinking>...</thinking>` tags.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_lib_reasoning::{AiClient, Credentials, GenerateRequest, ThinkingConfig};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> ai_lib_reasoning::Result<()> {
//!     let client = AiClient::for_model("deepseek-reasoner", Credentials::from_env())?;
//!     let request = GenerateRequest::new("deepseek-reasoner", "Why is the sky blue?")
//!         .thinking(ThinkingConfig::new(true, 1024));
//!
//!     let mut stream = client.generate_content_stream(&request).await?;
//!     while let Some(fragment) = stream.next().await {
//!         let fragment = fragment?;
//!         if fragment.is_thought() {
//!             eprint!("{}", fragment.thought);
//!         } else {
//!             print!("{}", fragment.text);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`provider`] | Model-name routing, dialects, custom models |
//! | [`config`] | Client configuration and credential fallbacks |
//! | [`client`] | Client factory, execution, retry |
//! | [`drivers`] | Dialect request/response adapters |
//! | [`pipeline`] | SSE decoding, thinking-tag parsing, normalization |
//! | [`transport`] | HTTP transport |
//! | [`types`] | Requests, messages, normalized outputs |

pub mod client;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pipeline;
pub mod provider;
pub mod transport;
pub mod types;

pub use client::{AiClient, AiClientBuilder, ExponentialBackoff, NoRetry, RetryConfig, RetryPolicy};
pub use config::{AppConfig, ClientConfig, ClientOptions, Credentials, TransportSettings};
pub use error::{Error, ErrorContext};
pub use pipeline::{extract_thinking, normalize_response, normalize_stream, ThinkingParser};
pub use provider::{find_custom_model, CustomModel, Dialect, Provider};
pub use types::{
    Completion, ContentBlock, Fragment, GenerateRequest, MessageContent, ResponseFormat,
    ThinkingConfig,
};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;
