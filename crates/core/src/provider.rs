use serde_json::json;
use tracing::debug;

use crate::error::{KartochkiError, Result};

#[derive(Clone, Debug, Default)]
pub enum Provider {
    Grok,
    Openai,
    #[default]
    Gemini,
}

pub struct ProviderConfig {
    pub api_url: &'static str,
    pub model: &'static str,
    pub env_var: &'static str,
}

impl Provider {
    pub fn config(&self) -> ProviderConfig {
        match self {
            Provider::Grok => ProviderConfig {
                api_url: "https://api.x.ai/v1/chat/completions",
                model: "grok-4-fast",
                env_var: "XAI_API_KEY",
            },
            Provider::Openai => ProviderConfig {
                api_url: "https://api.openai.com/v1/chat/completions",
                model: "gpt-5.1",
                env_var: "OPENAI_API_KEY",
            },
            Provider::Gemini => ProviderConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions",
                model: "gemini-3-pro",
                env_var: "GEMINI_API_KEY",
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Grok => "Grok",
            Provider::Openai => "OpenAI",
            Provider::Gemini => "Gemini",
        }
    }

    /// Parse a provider name as it appears in configuration.
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "grok" => Ok(Provider::Grok),
            "openai" => Ok(Provider::Openai),
            "gemini" => Ok(Provider::Gemini),
            other => Err(KartochkiError::invalid_argument(format!(
                "unknown provider '{other}', expected one of grok, openai, gemini"
            ))),
        }
    }

    /// Validate that the API key is set for this provider
    pub fn validate_api_key(&self) -> Result<String> {
        let config = self.config();
        std::env::var(config.env_var).map_err(|_| KartochkiError::MissingApiKey {
            env_var: config.env_var.to_string(),
        })
    }
}

/// Chat-completions client for the configured provider.
///
/// Constructed once and passed explicitly into the components that need it,
/// so tests can swap the whole component for a fake instead.
#[derive(Clone)]
pub struct ModelClient {
    client: reqwest::Client,
    provider: Provider,
}

impl ModelClient {
    pub fn new(provider: Provider) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider,
        }
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Send one system + user prompt pair and return the assistant's text.
    pub async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let config = self.provider.config();
        let api_key = self.provider.validate_api_key()?;

        debug!(
            provider = self.provider.name(),
            model = config.model,
            "sending chat completion request"
        );

        let response = self
            .client
            .post(config.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&json!({
                "model": config.model,
                "messages": [
                    {
                        "role": "system",
                        "content": system_prompt,
                    },
                    {
                        "role": "user",
                        "content": user_prompt,
                    },
                ],
                "temperature": 0.3,
            }))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| KartochkiError::ModelResponse {
                reason: format!("no message content in response: {:?}", response),
            })?;

        Ok(content.to_string())
    }
}
