//! Client configuration.
//!
//! Everything the factory needs is passed in explicitly. The `from_env` helpers
//! exist for binaries and tests that want the conventional environment variables;
//! nothing in the request path reads the environment on its own.

use crate::provider::{find_custom_model, CustomModel, Provider};
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::warn;

/// Environment variable consulted first by [`Credentials::from_env`].
pub const PRIMARY_API_KEY_VAR: &str = "AI_LIB_API_KEY";
/// Environment variable consulted second by [`Credentials::from_env`].
pub const SECONDARY_API_KEY_VAR: &str = "API_KEY";

/// Per-client settings supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ClientConfig {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider: Some(provider),
            ..Self::default()
        }
    }

    /// Provider implied by a model name.
    pub fn for_model(model: &str) -> Self {
        Self::new(Provider::resolve(model))
    }

    pub fn from_custom_model(model: &CustomModel) -> Self {
        Self {
            provider: Some(model.provider),
            api_key: model.api_key.clone(),
            base_url: model.base_url.clone(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

/// Fallback credential sources, consulted in order after an explicit key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

impl Credentials {
    pub fn new(primary: Option<String>, secondary: Option<String>) -> Self {
        Self { primary, secondary }
    }

    pub fn from_env() -> Self {
        Self {
            primary: env::var(PRIMARY_API_KEY_VAR).ok(),
            secondary: env::var(SECONDARY_API_KEY_VAR).ok(),
        }
    }

    /// First non-empty key among `explicit`, `primary`, `secondary`.
    pub fn resolve(&self, explicit: Option<&str>) -> Option<String> {
        [explicit, self.primary.as_deref(), self.secondary.as_deref()]
            .into_iter()
            .flatten()
            .find(|k| !k.is_empty())
            .map(String::from)
    }
}

/// Fully resolved options for one client, per dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientOptions {
    OpenAiCompatible {
        provider: Provider,
        api_key: Option<String>,
        /// `None` means the dialect default endpoint.
        base_url: Option<String>,
        /// The key is usable from an untrusted calling context. Not for production.
        dangerously_allow_browser: bool,
    },
    Google {
        api_key: Option<String>,
        base_url: Option<String>,
    },
}

impl ClientOptions {
    /// Resolve provider, key and endpoint for a client. Performs no I/O.
    pub fn resolve(config: &ClientConfig, credentials: &Credentials) -> Self {
        let provider = config.provider.unwrap_or_default();
        let api_key = credentials.resolve(config.api_key.as_deref());
        let explicit_url = config.base_url.clone().filter(|u| !u.is_empty());

        match provider {
            Provider::Google => ClientOptions::Google {
                api_key,
                base_url: explicit_url,
            },
            _ => ClientOptions::OpenAiCompatible {
                provider,
                api_key,
                base_url: explicit_url
                    .or_else(|| provider.default_base_url().map(String::from)),
                dangerously_allow_browser: true,
            },
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            ClientOptions::OpenAiCompatible { provider, .. } => *provider,
            ClientOptions::Google { .. } => Provider::Google,
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        match self {
            ClientOptions::OpenAiCompatible { api_key, .. }
            | ClientOptions::Google { api_key, .. } => api_key.as_deref(),
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        match self {
            ClientOptions::OpenAiCompatible { base_url, .. }
            | ClientOptions::Google { base_url, .. } => base_url.as_deref(),
        }
    }
}

/// HTTP settings shared by every request of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    /// Whole-request timeout for non-streaming calls.
    pub timeout: Duration,
    /// Connection timeout, also the only bound applied to streams.
    pub connect_timeout: Duration,
    pub proxy: Option<String>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            proxy: None,
        }
    }
}

impl TransportSettings {
    /// Defaults overridden by `AI_HTTP_TIMEOUT_SECS`, `AI_HTTP_CONNECT_TIMEOUT_SECS`, `AI_PROXY_URL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secs = |name: &str| {
            env::var(name)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
        };
        Self {
            timeout: secs("AI_HTTP_TIMEOUT_SECS").unwrap_or(defaults.timeout),
            connect_timeout: secs("AI_HTTP_CONNECT_TIMEOUT_SECS")
                .unwrap_or(defaults.connect_timeout),
            proxy: env::var("AI_PROXY_URL").ok().filter(|s| !s.is_empty()),
        }
    }
}

/// Application-level configuration: default client settings plus custom models.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub custom_models: Vec<CustomModel>,
}

impl AppConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Client settings for `model`: a matching custom model wins over prefix routing.
    ///
    /// A custom model without a key borrows the app-level key. Otherwise the model
    /// name decides the provider; an app-level `baseUrl` is kept only when the
    /// app-level provider is unset or equals the routed one.
    pub fn client_config_for(&self, model: &str) -> ClientConfig {
        match find_custom_model(model, &self.custom_models) {
            Some(custom) => {
                let mut cfg = ClientConfig::from_custom_model(custom);
                if cfg.api_key.is_none() {
                    cfg.api_key = self.client.api_key.clone();
                }
                cfg
            }
            None => {
                let mut cfg = self.client.clone();
                let routed = Provider::resolve(model);
                if cfg.provider.is_some() && cfg.provider != Some(routed) {
                    warn!(
                        model,
                        configured = ?cfg.provider,
                        routed = %routed,
                        "model routes to a different provider than configured; \
                         using routed provider and its default endpoint"
                    );
                    cfg.base_url = None;
                }
                cfg.provider = Some(routed);
                cfg
            }
        }
    }
}

/// Check that a base URL is an absolute http(s) URL.
pub(crate) fn validate_base_url(raw: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(raw).map_err(|e| {
        Error::configuration_with_context(
            format!("invalid base URL: {}", e),
            ErrorContext::new()
                .with_field_path("config.base_url")
                .with_details(raw.to_string())
                .with_source("client_builder"),
        )
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::configuration_with_context(
            format!("unsupported base URL scheme '{}'", parsed.scheme()),
            ErrorContext::new()
                .with_field_path("config.base_url")
                .with_details(raw.to_string())
                .with_source("client_builder"),
        ));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_resolution_order() {
        let creds = Credentials::new(Some("primary".into()), Some("secondary".into()));
        assert_eq!(creds.resolve(Some("explicit")).as_deref(), Some("explicit"));
        assert_eq!(creds.resolve(None).as_deref(), Some("primary"));
        assert_eq!(creds.resolve(Some("")).as_deref(), Some("primary"));

        let creds = Credentials::new(Some(String::new()), Some("secondary".into()));
        assert_eq!(creds.resolve(None).as_deref(), Some("secondary"));
        assert_eq!(Credentials::default().resolve(None), None);
    }

    #[test]
    fn provider_defaults_to_google() {
        let opts = ClientOptions::resolve(&ClientConfig::default(), &Credentials::default());
        assert_eq!(
            opts,
            ClientOptions::Google {
                api_key: None,
                base_url: None
            }
        );
    }

    #[test]
    fn openai_dialect_base_url_resolution() {
        let creds = Credentials::default();
        let opts = ClientOptions::resolve(&ClientConfig::new(Provider::DeepSeek), &creds);
        assert_eq!(opts.base_url(), Some("https://api.deepseek.com/v1"));
        assert!(matches!(
            opts,
            ClientOptions::OpenAiCompatible {
                dangerously_allow_browser: true,
                ..
            }
        ));

        let opts = ClientOptions::resolve(
            &ClientConfig::new(Provider::Anthropic).with_base_url("http://proxy.local/v1"),
            &creds,
        );
        assert_eq!(opts.base_url(), Some("http://proxy.local/v1"));

        for p in [Provider::OpenAI, Provider::Custom] {
            let opts = ClientOptions::resolve(&ClientConfig::new(p), &creds);
            assert_eq!(opts.base_url(), None);
            assert_eq!(opts.provider(), p);
        }
    }

    #[test]
    fn google_keeps_explicit_base_url() {
        let cfg = ClientConfig::new(Provider::Google)
            .with_api_key("g-key")
            .with_base_url("http://localhost:9000");
        let opts = ClientOptions::resolve(&cfg, &Credentials::default());
        assert_eq!(
            opts,
            ClientOptions::Google {
                api_key: Some("g-key".into()),
                base_url: Some("http://localhost:9000".into())
            }
        );
    }

    #[test]
    fn app_config_from_yaml() {
        let yaml = r#"
client:
  apiKey: shared-key
customModels:
  - name: local-llama
    provider: custom
    baseUrl: http://localhost:11434/v1
  - name: team-claude
    provider: anthropic
    apiKey: team-key
"#;
        let cfg = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.custom_models.len(), 2);

        let local = cfg.client_config_for("local-llama");
        assert_eq!(local.provider, Some(Provider::Custom));
        assert_eq!(local.api_key.as_deref(), Some("shared-key"));
        assert_eq!(local.base_url.as_deref(), Some("http://localhost:11434/v1"));

        let team = cfg.client_config_for("team-claude");
        assert_eq!(team.api_key.as_deref(), Some("team-key"));

        let routed = cfg.client_config_for("grok-2");
        assert_eq!(routed.provider, Some(Provider::XAi));
        assert_eq!(routed.api_key.as_deref(), Some("shared-key"));
    }

    #[test]
    fn configured_endpoint_only_follows_its_own_provider() {
        let cfg = AppConfig {
            client: ClientConfig::new(Provider::DeepSeek)
                .with_api_key("k")
                .with_base_url("http://deepseek-proxy.local/v1"),
            custom_models: Vec::new(),
        };

        let same = cfg.client_config_for("deepseek-reasoner");
        assert_eq!(same.provider, Some(Provider::DeepSeek));
        assert_eq!(same.base_url.as_deref(), Some("http://deepseek-proxy.local/v1"));

        let other = cfg.client_config_for("gpt-4o");
        assert_eq!(other.provider, Some(Provider::OpenAI));
        assert_eq!(other.base_url, None);
        assert_eq!(other.api_key.as_deref(), Some("k"));

        let unpinned = AppConfig {
            client: ClientConfig::default().with_base_url("http://gateway.local/v1"),
            custom_models: Vec::new(),
        };
        let routed = unpinned.client_config_for("grok-2");
        assert_eq!(routed.provider, Some(Provider::XAi));
        assert_eq!(routed.base_url.as_deref(), Some("http://gateway.local/v1"));
    }

    #[test]
    fn app_config_rejects_unknown_provider() {
        let json = r#"{"customModels": [{"name": "x", "provider": "azure"}]}"#;
        assert!(AppConfig::from_json_str(json).is_err());
    }

    #[test]
    fn base_url_validation() {
        assert!(validate_base_url("https://api.x.ai/v1").is_ok());
        assert!(validate_base_url("not a url").is_err());
        let err = validate_base_url("ftp://example.com").unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("config.base_url")
        );
    }
}
