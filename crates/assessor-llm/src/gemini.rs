use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigOption, GenerationConfig};
use crate::credential::{Secret, api_key_from_env};
use crate::error::LlmError;
use crate::http::{default_client, normalize_base_url};
use crate::provider::{GenerateOptions, GenerationProvider, MIME_TEXT, ensure_prompt};
use crate::tool::{GeminiTool, ProviderKind, ToolDescriptor, narrow};

const API_URL: &str = "https://generativelanguage.googleapis.com";
const TOP_K: u32 = 64;

#[derive(Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Secret,
    base_url: String,
    config: GenerationConfig,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("config", &self.config)
            .finish()
    }
}

impl GeminiProvider {
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

    /// Build from `GEMINI_API_KEY` and the given overrides.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingCredential` if the key is absent and
    /// `LlmError::InvalidConfig` if the options do not validate.
    pub fn from_env(options: impl IntoIterator<Item = ConfigOption>) -> Result<Self, LlmError> {
        let api_key = api_key_from_env(ProviderKind::Gemini)?;
        let config = GenerationConfig::build(ProviderKind::Gemini, options)?;
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

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            self.config.model_name()
        )
    }
}

impl GenerationProvider for GeminiProvider {
    async fn generate_text(
        &self,
        prompt: &str,
        options: Option<&GenerateOptions>,
    ) -> Result<String, LlmError> {
        ensure_prompt(prompt)?;

        let tools = match options {
            Some(opts) => narrow(&opts.tools, ProviderKind::Gemini, ToolDescriptor::as_gemini)?,
            None => Vec::new(),
        };
        let response_mime_type = options
            .and_then(|o| o.response_mime_type.as_deref())
            .unwrap_or(MIME_TEXT);

        let parts = [TextPart { text: prompt }];
        let contents = [Content {
            role: "user",
            parts: &parts,
        }];
        let body = GenerateRequest {
            contents: &contents,
            generation_config: GenerationSettings {
                temperature: self.config.temperature_f32(),
                top_p: self.config.top_p_f32(),
                top_k: TOP_K,
                max_output_tokens: self.config.max_tokens(),
                response_mime_type,
            },
            tools,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.map_err(LlmError::Http)?;

        if !status.is_success() {
            tracing::error!("Gemini API error {status}: {text}");
            return Err(api_error(status, &text));
        }

        let resp: GenerateResponse = serde_json::from_str(&text)?;
        if let Some(ref usage) = resp.usage_metadata {
            tracing::debug!(
                prompt_tokens = usage.prompt_token_count,
                candidate_tokens = usage.candidates_token_count,
                "Gemini API usage"
            );
        }

        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or(LlmError::EmptyResponse {
                provider: ProviderKind::Gemini,
            })?;

        let output: String = candidate
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if output.is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: ProviderKind::Gemini,
            });
        }
        Ok(output)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }
}

fn api_error(status: reqwest::StatusCode, text: &str) -> LlmError {
    match serde_json::from_str::<ErrorEnvelope>(text) {
        Ok(envelope) => LlmError::Api {
            provider: ProviderKind::Gemini,
            kind: envelope
                .error
                .status
                .unwrap_or_else(|| status.as_str().to_owned()),
            message: envelope.error.message,
        },
        Err(_) => LlmError::Status {
            provider: ProviderKind::Gemini,
            status: status.as_u16(),
        },
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: &'a [Content<'a>],
    generation_config: GenerationSettings<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<&'a GeminiTool>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: &'a [TextPart<'a>],
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings<'a> {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}
