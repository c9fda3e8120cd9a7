use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigOption, GenerationConfig};
use crate::credential::{Secret, api_key_from_env};
use crate::error::LlmError;
use crate::http::{default_client, normalize_base_url};
use crate::provider::{GenerateOptions, GenerationProvider, ensure_prompt};
use crate::tool::{ClaudeTool, ProviderKind, ToolDescriptor, narrow};

const API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: Secret,
    base_url: String,
    config: GenerationConfig,
}

impl fmt::Debug for ClaudeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudeProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("config", &self.config)
            .finish()
    }
}

impl ClaudeProvider {
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

    /// Build from `CLAUDE_API_KEY` and the given overrides.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingCredential` if the key is absent and
    /// `LlmError::InvalidConfig` if the options do not validate.
    pub fn from_env(options: impl IntoIterator<Item = ConfigOption>) -> Result<Self, LlmError> {
        let api_key = api_key_from_env(ProviderKind::Claude)?;
        let config = GenerationConfig::build(ProviderKind::Claude, options)?;
        Self::new(api_key, config)
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url.into());
        self
    }

    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    async fn send_request(&self, body: &RequestBody<'_>) -> Result<String, LlmError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.map_err(LlmError::Http)?;

        if !status.is_success() {
            tracing::error!("Claude API error {status}: {text}");
            return Err(api_error(status, &text));
        }

        let resp: ApiResponse = serde_json::from_str(&text)?;
        if let Some(ref usage) = resp.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Claude API usage"
            );
        }

        resp.content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .ok_or(LlmError::EmptyResponse {
                provider: ProviderKind::Claude,
            })
    }
}

impl GenerationProvider for ClaudeProvider {
    async fn generate_text(
        &self,
        prompt: &str,
        options: Option<&GenerateOptions>,
    ) -> Result<String, LlmError> {
        ensure_prompt(prompt)?;

        let tools = match options {
            Some(opts) => narrow(&opts.tools, ProviderKind::Claude, ToolDescriptor::as_claude)?,
            None => Vec::new(),
        };
        if let Some(mime) = options.and_then(|o| o.response_mime_type.as_deref()) {
            tracing::debug!(mime, "Claude has no response MIME mode, sending as text");
        }

        let messages = [ApiMessage {
            role: "user",
            content: prompt,
        }];
        let body = RequestBody {
            model: self.config.model_name(),
            max_tokens: self.config.max_tokens(),
            messages: &messages,
            temperature: self.config.temperature_f32(),
            top_p: self.config.top_p_f32(),
            tools,
        };

        self.send_request(&body).await
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }
}

fn api_error(status: reqwest::StatusCode, text: &str) -> LlmError {
    match serde_json::from_str::<ErrorEnvelope>(text) {
        Ok(envelope) => LlmError::Api {
            provider: ProviderKind::Claude,
            kind: envelope.error.error_type,
            message: envelope.error.message,
        },
        Err(_) => LlmError::Status {
            provider: ProviderKind::Claude,
            status: status.as_u16(),
        },
    }
}

#[derive(Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ApiMessage<'a>],
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<&'a ClaudeTool>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}
