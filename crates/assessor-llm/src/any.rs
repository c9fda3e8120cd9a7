use crate::claude::ClaudeProvider;
use crate::config::ConfigOption;
use crate::error::LlmError;
use crate::gemini::GeminiProvider;
#[cfg(feature = "mock")]
use crate::mock::MockProvider;
use crate::mistral::MistralProvider;
use crate::provider::{GenerateOptions, GenerationProvider};
use crate::tool::ProviderKind;

/// Generates a match over all `AnyProvider` variants, binding the inner provider
/// and evaluating the given expression for each arm.
macro_rules! delegate_provider {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyProvider::Claude($p) => $expr,
            AnyProvider::Mistral($p) => $expr,
            AnyProvider::Gemini($p) => $expr,
            #[cfg(feature = "mock")]
            AnyProvider::Mock($p) => $expr,
        }
    };
}

#[derive(Debug, Clone)]
pub enum AnyProvider {
    Claude(ClaudeProvider),
    Mistral(MistralProvider),
    Gemini(GeminiProvider),
    #[cfg(feature = "mock")]
    Mock(MockProvider),
}

impl AnyProvider {
    /// Construct the adapter for `kind`, reading its credential from the environment.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingCredential` if that provider's key is unset, or
    /// `LlmError::InvalidConfig` if `options` do not validate. No request is sent.
    pub fn from_env(
        kind: ProviderKind,
        options: impl IntoIterator<Item = ConfigOption>,
    ) -> Result<Self, LlmError> {
        let provider = match kind {
            ProviderKind::Claude => Self::Claude(ClaudeProvider::from_env(options)?),
            ProviderKind::Mistral => Self::Mistral(MistralProvider::from_env(options)?),
            ProviderKind::Gemini => Self::Gemini(GeminiProvider::from_env(options)?),
        };
        tracing::info!(provider = %kind, "LLM provider configured");
        Ok(provider)
    }

    /// Point the inner adapter at a different endpoint base URL.
    #[must_use]
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        match self {
            Self::Claude(p) => Self::Claude(p.with_base_url(base_url)),
            Self::Mistral(p) => Self::Mistral(p.with_base_url(base_url)),
            Self::Gemini(p) => Self::Gemini(p.with_base_url(base_url)),
            #[cfg(feature = "mock")]
            Self::Mock(p) => Self::Mock(p),
        }
    }
}

impl GenerationProvider for AnyProvider {
    async fn generate_text(
        &self,
        prompt: &str,
        options: Option<&GenerateOptions>,
    ) -> Result<String, LlmError> {
        delegate_provider!(self, |p| p.generate_text(prompt, options).await)
    }

    fn kind(&self) -> ProviderKind {
        delegate_provider!(self, |p| p.kind())
    }

    fn name(&self) -> &str {
        delegate_provider!(self, |p| p.name())
    }
}
