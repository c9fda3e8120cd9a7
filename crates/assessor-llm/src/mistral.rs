use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigOption, GenerationConfig};
use crate::credential::{Secret, api_key_from_env};
use crate::error::LlmError;
use crate::http::{default_client, normalize_base_url};
use crate::provider::{GenerateOptions, GenerationProvider, ensure_prompt};
use crate::tool::{MistralTool, ProviderKind, ToolDescriptor, narrow};

/// Mistral endpoint base URL.
pub const API_URL: &str = "https://api.mistral.ai";

#[derive(Clone)]
pub struct MistralProvider {
    client: reqwest::Client,
    api_key: Secret,
    base_url: String,
    config: GenerationConfig,
}

impl fmt::Debug for MistralProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MistralProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("config", &self.config)
            .finish()
    }
}

impl MistralProvider {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_key: Secret, config: GenerationConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: default_client()?,
            api_key,
            base_url: API_URL.to_owned(),
            config,
        })
    }

    /// Build from `MISTRAL_API_KEY` and the given overrides.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingCredential` if the key is absent and
    /// `LlmError::InvalidConfig` if the options do not validate.
    pub fn from_env(options: impl IntoIterator<Item = ConfigOption>) -> Result<Self, LlmError> {
        let api_key = api_key_from_env(ProviderKind::Mistral)?;
        let config = GenerationConfig::build(ProviderKind::Mistral, options)?;
        Self::new(api_key, config)
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Target a Mistral-compatible endpoint instead of the public API.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url.into());
        self
    }

    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }
}

impl GenerationProvider for MistralProvider {
    async fn generate_text(
        &self,
        prompt: &str,
        options: Option<&GenerateOptions>,
    ) -> Result<String, LlmError> {
        ensure_prompt(prompt)?;

        let tools = match options {
            Some(opts) => narrow(&opts.tools, ProviderKind::Mistral, ToolDescriptor::as_mistral)?,
            None => Vec::new(),
        };
        let response_format = options
            .filter(|o| o.wants_json())
            .map(|_| ResponseFormat {
                r#type: "json_object",
            });

        let messages = [ApiMessage {
            role: "user",
            content: prompt,
        }];
        let body = ChatRequest {
            model: self.config.model_name(),
            messages: &messages,
            temperature: self.config.temperature(),
            max_tokens: self.config.max_tokens(),
            top_p: self.config.top_p(),
            tools,
            response_format,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose())
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.map_err(LlmError::Http)?;

        if !status.is_success() {
            tracing::error!("Mistral API error {status}: {text}");
            return Err(api_error(status, &text));
        }

        let resp: ChatResponse = serde_json::from_str(&text)?;
        if let Some(ref usage) = resp.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Mistral API usage"
            );
        }

        resp.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse {
                provider: ProviderKind::Mistral,
            })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Mistral
    }
}

fn api_error(status: reqwest::StatusCode, text: &str) -> LlmError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(ErrorBody {
            message: Some(message),
            error_type,
        }) => LlmError::Api {
            provider: ProviderKind::Mistral,
            kind: error_type.unwrap_or_else(|| status.as_str().to_owned()),
            message,
        },
        _ => LlmError::Status {
            provider: ProviderKind::Mistral,
            status: status.as_u16(),
        },
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ApiMessage<'a>],
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<&'a MistralTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    r#type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
}
