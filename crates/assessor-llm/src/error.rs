use crate::tool::ProviderKind;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{provider} API error, type: {kind}, message: {message}")]
    Api {
        provider: ProviderKind,
        kind: String,
        message: String,
    },

    #[error("{provider} API request failed (status {status})")]
    Status { provider: ProviderKind, status: u16 },

    #[error("empty response from {provider}")]
    EmptyResponse { provider: ProviderKind },

    #[error("tool type mismatch for {expected} LLM: got a {found} tool")]
    ToolMismatch {
        expected: ProviderKind,
        found: ProviderKind,
    },

    #[error("environment variable {var} not set for {provider}")]
    MissingCredential {
        provider: ProviderKind,
        var: &'static str,
    },

    #[error("invalid generation config: {0}")]
    InvalidConfig(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Other(String),
}

impl LlmError {
    /// Whether a later identical call could succeed.
    ///
    /// Construction and caller defects (missing credential, bad config, tool
    /// mismatch, empty prompt) are permanent; everything that came back from
    /// the wire is treated as transient.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            Self::ToolMismatch { .. }
                | Self::MissingCredential { .. }
                | Self::InvalidConfig(_)
                | Self::InvalidRequest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
