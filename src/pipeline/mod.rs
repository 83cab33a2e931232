//! Response processing pipeline.
//!
//! ```text
//! Raw Bytes → Decoder → Driver chunk parser → Stream normalizer → Fragments
//!     │          │               │                    │
//!   HTTP        SSE        content/reasoning     <thinking> state
//!                            deltas              machine
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`decode`] | SSE framing |
//! | [`thinking`] | `<thinking>` tag extraction and incremental parsing |
//! | [`normalize`] | Completion and fragment normalization |

pub mod decode;
pub mod normalize;
pub mod thinking;

use crate::drivers::ProviderDriver;
use crate::types::{ChunkDelta, Fragment};
use crate::BoxStream;
use futures::StreamExt;
use std::sync::Arc;

pub use normalize::{normalize_response, normalize_stream, StreamNormalizer};
pub use thinking::{extract_thinking, Extracted, ThinkingParser};

/// Decoder trait for stream decoding
#[async_trait::async_trait]
pub trait Decoder: Send + Sync {
    /// Decode a byte stream into JSON values
    async fn decode_stream(
        &self,
        input: BoxStream<'static, bytes::Bytes>,
    ) -> BoxStream<'static, serde_json::Value>;
}

/// Pipeline that turns a provider byte stream into normalized fragments.
pub struct Pipeline {
    decoder: Box<dyn Decoder>,
    driver: Arc<dyn ProviderDriver>,
}

impl Pipeline {
    pub fn new(decoder: Box<dyn Decoder>, driver: Arc<dyn ProviderDriver>) -> Self {
        Self { decoder, driver }
    }

    /// SSE framing with the driver's chunk parser.
    pub fn for_driver(driver: Arc<dyn ProviderDriver>) -> Self {
        Self::new(Box::new(decode::SseDecoder::default()), driver)
    }

    /// Chunk deltas in arrival order; frames without content or reasoning are dropped.
    pub async fn deltas(
        &self,
        input: BoxStream<'static, bytes::Bytes>,
    ) -> BoxStream<'static, ChunkDelta> {
        let driver = self.driver.clone();
        let frames = self.decoder.decode_stream(input).await;
        Box::pin(frames.filter_map(move |frame| {
            let delta = frame.map(|v| driver.parse_stream_chunk(&v)).transpose();
            futures::future::ready(delta)
        }))
    }

    /// Process a byte stream through the pipeline
    pub async fn process_stream(
        &self,
        input: BoxStream<'static, bytes::Bytes>,
        include_thoughts: bool,
    ) -> BoxStream<'static, Fragment> {
        let deltas = self.deltas(input).await;
        normalize_stream(deltas, include_thoughts)
    }
}
