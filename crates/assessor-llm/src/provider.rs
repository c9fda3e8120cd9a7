use std::future::Future;

use crate::error::LlmError;
use crate::tool::{ProviderKind, ToolDescriptor};

pub const MIME_JSON: &str = "application/json";
pub const MIME_TEXT: &str = "text/plain";

/// Per-call generation options. Never mutates the adapter's configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    pub tools: Vec<ToolDescriptor>,
    pub response_mime_type: Option<String>,
}

impl GenerateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tool(mut self, tool: ToolDescriptor) -> Self {
        self.tools.push(tool);
        self
    }

    #[must_use]
    pub fn with_response_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.response_mime_type = Some(mime.into());
        self
    }

    /// Whether the caller asked for a JSON response body.
    #[must_use]
    pub fn wants_json(&self) -> bool {
        self.response_mime_type.as_deref() == Some(MIME_JSON)
    }
}

pub trait GenerationProvider: Send + Sync {
    /// Generate text for a single-turn `prompt`.
    ///
    /// The returned text is the provider's output verbatim. Dropping the
    /// future aborts the in-flight request.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::ToolMismatch` if `options` carries a tool tagged for
    /// another provider, or a transport/provider error if the call fails.
    fn generate_text(
        &self,
        prompt: &str,
        options: Option<&GenerateOptions>,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    fn kind(&self) -> ProviderKind;

    fn name(&self) -> &str {
        self.kind().as_str()
    }
}

/// Reject blank prompts before any request is built.
pub(crate) fn ensure_prompt(prompt: &str) -> Result<(), LlmError> {
    if prompt.trim().is_empty() {
        return Err(LlmError::InvalidRequest("prompt must not be empty".into()));
    }
    Ok(())
}
