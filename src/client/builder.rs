use crate::client::core::AiClient;
use crate::client::retry::{ExponentialBackoff, NoRetry, RetryPolicy};
use crate::config::{validate_base_url, ClientConfig, ClientOptions, Credentials, TransportSettings};
use crate::drivers::{create_driver, ProviderDriver};
use crate::pipeline::Pipeline;
use crate::provider::{Dialect, Provider};
use crate::transport::{HttpTransport, GOOGLE_DEFAULT_BASE_URL, OPENAI_DEFAULT_BASE_URL};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builder for creating clients with custom configuration.
///
/// Construction performs no network I/O; a bad key only shows up on the first request.
pub struct AiClientBuilder {
    config: ClientConfig,
    credentials: Credentials,
    transport: TransportSettings,
    retry: Arc<dyn RetryPolicy>,
}

impl AiClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            credentials: Credentials::default(),
            transport: TransportSettings::default(),
            retry: Arc::new(ExponentialBackoff::default()),
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn provider(mut self, provider: Provider) -> Self {
        self.config.provider = Some(provider);
        self
    }

    /// Route by model name.
    pub fn model(self, model: &str) -> Self {
        self.provider(Provider::resolve(model))
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Fallback key sources used when no explicit key is set.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn transport_settings(mut self, settings: TransportSettings) -> Self {
        self.transport = settings;
        self
    }

    pub fn retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.retry = policy;
        self
    }

    pub fn no_retry(self) -> Self {
        self.retry_policy(Arc::new(NoRetry))
    }

    /// Build the client.
    pub fn build(self) -> Result<AiClient> {
        let options = ClientOptions::resolve(&self.config, &self.credentials);
        let provider = options.provider();

        if let ClientOptions::OpenAiCompatible {
            dangerously_allow_browser: true,
            ..
        } = &options
        {
            warn!(
                provider = %provider,
                "API key is usable from the calling context; \
                 proxy requests through a backend in production"
            );
        }

        let base_url = options
            .base_url()
            .unwrap_or(match provider.dialect() {
                Dialect::OpenAiCompatible => OPENAI_DEFAULT_BASE_URL,
                Dialect::GoogleNative => GOOGLE_DEFAULT_BASE_URL,
            })
            .to_string();
        validate_base_url(&base_url)?;

        let driver: Arc<dyn ProviderDriver> = Arc::from(create_driver(provider));
        let transport = Arc::new(HttpTransport::new(
            &base_url,
            options.api_key().map(String::from),
            driver.auth_scheme(),
            &self.transport,
        )?);
        let pipeline = Arc::new(Pipeline::for_driver(driver.clone()));

        debug!(
            provider = %provider,
            base_url = base_url.as_str(),
            has_api_key = options.api_key().is_some(),
            "client constructed"
        );

        Ok(AiClient {
            options,
            driver,
            transport,
            pipeline,
            retry: self.retry,
        })
    }
}

impl Default for AiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
