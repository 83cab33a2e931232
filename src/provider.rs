//! Provider identity and model-name routing.
//!
//! A model name alone decides which vendor endpoint serves it. The rule table is
//! evaluated top to bottom and the first matching prefix wins; anything unmatched
//! is served by Google.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Google,
    OpenAI,
    DeepSeek,
    Anthropic,
    XAi,
    Mistral,
    /// User-supplied OpenAI-compatible endpoint.
    Custom,
}

/// Wire format spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `/chat/completions` with `choices[0].message` / `choices[0].delta`.
    OpenAiCompatible,
    /// Gemini `generateContent` / `streamGenerateContent`.
    GoogleNative,
}

const PREFIX_RULES: &[(&str, Provider)] = &[
    ("gpt-", Provider::OpenAI),
    ("o1-", Provider::OpenAI),
    ("deepseek-", Provider::DeepSeek),
    ("claude-", Provider::Anthropic),
    ("grok-", Provider::XAi),
    ("mistral-", Provider::Mistral),
    ("mixtral-", Provider::Mistral),
];

impl Provider {
    pub const ALL: [Provider; 7] = [
        Provider::Google,
        Provider::OpenAI,
        Provider::DeepSeek,
        Provider::Anthropic,
        Provider::XAi,
        Provider::Mistral,
        Provider::Custom,
    ];

    /// Map a model identifier to the provider that serves it.
    pub fn resolve(model: &str) -> Provider {
        if let Some((_, provider)) = PREFIX_RULES
            .iter()
            .find(|(prefix, _)| model.starts_with(prefix))
        {
            return *provider;
        }
        if model == "custom" {
            return Provider::Custom;
        }
        Provider::Google
    }

    pub fn id(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::OpenAI => "openai",
            Provider::DeepSeek => "deepseek",
            Provider::Anthropic => "anthropic",
            Provider::XAi => "xai",
            Provider::Mistral => "mistral",
            Provider::Custom => "custom",
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Provider::Google => Dialect::GoogleNative,
            _ => Dialect::OpenAiCompatible,
        }
    }

    /// Built-in endpoint for providers that are not served from the dialect default.
    ///
    /// `OpenAI`, `Custom` and `Google` return `None` and fall back to the transport's
    /// dialect default.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Provider::DeepSeek => Some("https://api.deepseek.com/v1"),
            Provider::Anthropic => Some("https://api.anthropic.com/v1"),
            Provider::XAi => Some("https://api.x.ai/v1"),
            Provider::Mistral => Some("https://api.mistral.ai/v1"),
            Provider::OpenAI | Provider::Custom | Provider::Google => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .iter()
            .copied()
            .find(|p| p.id() == s)
            .ok_or_else(|| {
                crate::Error::configuration_with_context(
                    format!("unknown provider '{}'", s),
                    crate::ErrorContext::new()
                        .with_field_path("provider")
                        .with_details(
                            "expected one of google, openai, deepseek, anthropic, xai, mistral, custom",
                        ),
                )
            })
    }
}

/// A user-defined model entry that pins a provider and optional credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomModel {
    pub name: String,
    pub provider: Provider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Find a custom model by exact name.
pub fn find_custom_model<'a>(name: &str, models: &'a [CustomModel]) -> Option<&'a CustomModel> {
    models.iter().find(|m| m.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_prefixes() {
        assert_eq!(Provider::resolve("gpt-4"), Provider::OpenAI);
        assert_eq!(Provider::resolve("o1-preview"), Provider::OpenAI);
        assert_eq!(Provider::resolve("deepseek-reasoner"), Provider::DeepSeek);
        assert_eq!(Provider::resolve("claude-3-5-sonnet"), Provider::Anthropic);
        assert_eq!(Provider::resolve("grok-2"), Provider::XAi);
        assert_eq!(Provider::resolve("mistral-large"), Provider::Mistral);
        assert_eq!(Provider::resolve("mixtral-8x7b"), Provider::Mistral);
        assert_eq!(Provider::resolve("custom"), Provider::Custom);
    }

    #[test]
    fn unmatched_models_fall_back_to_google() {
        assert_eq!(Provider::resolve("llama-3"), Provider::Google);
        assert_eq!(Provider::resolve("gemini-2.5-pro"), Provider::Google);
        assert_eq!(Provider::resolve(""), Provider::Google);
        // Prefix rules are case-sensitive and need the trailing dash.
        assert_eq!(Provider::resolve("GPT-4"), Provider::Google);
        assert_eq!(Provider::resolve("gpt4"), Provider::Google);
        // `custom` only matches exactly.
        assert_eq!(Provider::resolve("custom-model"), Provider::Google);
    }

    #[test]
    fn dialect_and_default_endpoints() {
        assert_eq!(Provider::Google.dialect(), Dialect::GoogleNative);
        for p in Provider::ALL.iter().filter(|p| **p != Provider::Google) {
            assert_eq!(p.dialect(), Dialect::OpenAiCompatible);
        }
        assert_eq!(
            Provider::DeepSeek.default_base_url(),
            Some("https://api.deepseek.com/v1")
        );
        assert_eq!(Provider::XAi.default_base_url(), Some("https://api.x.ai/v1"));
        assert_eq!(Provider::OpenAI.default_base_url(), None);
        assert_eq!(Provider::Custom.default_base_url(), None);
    }

    #[test]
    fn provider_ids_round_trip_through_from_str() {
        for p in Provider::ALL {
            assert_eq!(p.id().parse::<Provider>().unwrap(), p);
        }
        assert!("azure".parse::<Provider>().is_err());
    }

    #[test]
    fn finds_custom_model_by_exact_name() {
        let models = vec![
            CustomModel {
                name: "local-qwen".into(),
                provider: Provider::Custom,
                api_key: None,
                base_url: Some("http://localhost:8000/v1".into()),
            },
            CustomModel {
                name: "team-gpt".into(),
                provider: Provider::OpenAI,
                api_key: Some("sk-team".into()),
                base_url: None,
            },
        ];
        assert_eq!(
            find_custom_model("team-gpt", &models).map(|m| m.provider),
            Some(Provider::OpenAI)
        );
        assert!(find_custom_model("team", &models).is_none());
        assert!(find_custom_model("local-qwen", &[]).is_none());
    }
}
