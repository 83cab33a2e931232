use crate::config::TransportSettings;
use crate::drivers::{AuthScheme, DriverRequest};
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::Proxy;
use tracing::debug;

use super::TransportError;

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    auth: AuthScheme,
    timeout: std::time::Duration,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        auth: AuthScheme,
        settings: &TransportSettings,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .pool_max_idle_per_host(32)
            .http2_adaptive_window(true);

        if let Some(proxy_url) = settings.proxy.as_deref() {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            auth,
            timeout: settings.timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build(&self, request: &DriverRequest, request_id: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, request.path);
        let mut req = self.client.post(&url).json(&request.body);

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        if let Some(key) = &self.api_key {
            req = match self.auth {
                AuthScheme::Bearer => req.bearer_auth(key),
                AuthScheme::GoogApiKey => req.header("x-goog-api-key", key),
            };
        }

        if request.stream {
            req = req.header("accept", "text/event-stream");
        } else {
            req = req.timeout(self.timeout);
        }

        // Our own correlation id. Providers may ignore it.
        req.header("x-request-id", request_id)
    }

    async fn send(&self, request: &DriverRequest, request_id: &str) -> Result<reqwest::Response> {
        debug!(
            path = request.path.as_str(),
            stream = request.stream,
            request_id,
            "sending provider request"
        );
        let resp = self
            .build(request, request_id)
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let status = status.as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(Error::Remote {
            status,
            message: remote_message(&body),
            retryable: is_retryable_status(status),
        })
    }

    /// POST and decode a JSON response body.
    pub async fn post_json(
        &self,
        request: &DriverRequest,
        request_id: &str,
    ) -> Result<serde_json::Value> {
        let resp = self.send(request, request_id).await?;
        resp.json()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))
    }

    /// POST and return the raw response body as a byte stream.
    pub async fn post_stream(
        &self,
        request: &DriverRequest,
        request_id: &str,
    ) -> Result<BoxStream<'static, Bytes>> {
        let resp = self.send(request, request_id).await?;
        let byte_stream = resp
            .bytes_stream()
            .map_err(|e| Error::Transport(TransportError::Http(e)));
        Ok(Box::pin(byte_stream))
    }
}

pub(crate) fn is_retryable_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

/// Provider error message from an `{"error": {"message": ...}}` body, else the raw body.
fn remote_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
