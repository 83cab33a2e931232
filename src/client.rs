//! Client factory and request execution.
//!
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
pub mod retry;

pub use builder::AiClientBuilder;
pub use self::core::AiClient;
pub use retry::{with_retry, ExponentialBackoff, NoRetry, RetryConfig, RetryPolicy};
