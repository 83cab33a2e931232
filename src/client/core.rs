use crate::client::retry::{with_retry, RetryPolicy};
use crate::config::{ClientConfig, ClientOptions, Credentials};
use crate::drivers::ProviderDriver;
use crate::pipeline::{normalize_response, Pipeline};
use crate::provider::Provider;
use crate::transport::HttpTransport;
use crate::types::{Completion, Fragment, GenerateRequest, RawCompletion};
use crate::{BoxStream, Result};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

/// Client bound to one provider.
///
/// Requests are independent: each stream owns its own parser state, so one
/// client can serve any number of concurrent calls.
pub struct AiClient {
    pub(crate) options: ClientOptions,
    pub(crate) driver: Arc<dyn ProviderDriver>,
    pub(crate) transport: Arc<HttpTransport>,
    pub(crate) pipeline: Arc<Pipeline>,
    pub(crate) retry: Arc<dyn RetryPolicy>,
}

impl AiClient {
    /// Create a client from explicit settings and fallback credentials.
    pub fn new(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        crate::client::builder::AiClientBuilder::new()
            .config(config)
            .credentials(credentials)
            .build()
    }

    /// Create a client for whichever provider serves `model`.
    pub fn for_model(model: &str, credentials: Credentials) -> Result<Self> {
        Self::new(ClientConfig::for_model(model), credentials)
    }

    pub fn provider(&self) -> Provider {
        self.options.provider()
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Single completed call, with retries, before normalization.
    pub async fn generate_raw(&self, request: &GenerateRequest) -> Result<RawCompletion> {
        let request_id = Uuid::new_v4().to_string();
        let driver_request = self.driver.build_request(request, false)?;
        debug!(
            provider = %self.provider(),
            model = request.model.as_str(),
            request_id = request_id.as_str(),
            "generate_content"
        );

        let body = with_retry(self.retry.as_ref(), || {
            self.transport.post_json(&driver_request, &request_id)
        })
        .await
        .map_err(|e| {
            error!(
                provider = %self.provider(),
                model = request.model.as_str(),
                request_id = request_id.as_str(),
                error = %e,
                "generate_content failed"
            );
            e
        })?;

        Ok(self.driver.parse_response(&body))
    }

    /// Non-streaming generation normalized to `{text, thought}`.
    pub async fn generate_content(&self, request: &GenerateRequest) -> Result<Completion> {
        let raw = self.generate_raw(request).await?;
        Ok(normalize_response(&raw, request.thinking_config.as_ref()))
    }

    /// Streaming generation as an ordered sequence of fragments.
    ///
    /// Only opening the stream is retried. Errors after that are yielded once
    /// and end the sequence; dropping the stream releases the connection.
    pub async fn generate_content_stream(
        &self,
        request: &GenerateRequest,
    ) -> Result<BoxStream<'static, Fragment>> {
        let request_id = Uuid::new_v4().to_string();
        let driver_request = self.driver.build_request(request, true)?;
        debug!(
            provider = %self.provider(),
            model = request.model.as_str(),
            request_id = request_id.as_str(),
            "generate_content_stream"
        );

        let bytes = with_retry(self.retry.as_ref(), || {
            self.transport.post_stream(&driver_request, &request_id)
        })
        .await
        .map_err(|e| {
            error!(
                provider = %self.provider(),
                model = request.model.as_str(),
                request_id = request_id.as_str(),
                error = %e,
                "generate_content_stream failed"
            );
            e
        })?;

        Ok(self
            .pipeline
            .process_stream(bytes, request.include_thoughts())
            .await)
    }
}
