//! Scripted in-process provider for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::error::LlmError;
use crate::provider::{GenerateOptions, GenerationProvider, ensure_prompt};
use crate::tool::ProviderKind;

/// One scripted outcome, consumed per call in order.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    /// Transient failure surfaced as `LlmError::Other`.
    Fail(String),
    Status(u16),
    /// Never resolves; exercises caller deadlines.
    Hang,
}

#[derive(Debug, Clone)]
pub struct MockProvider {
    kind: ProviderKind,
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
    options: Arc<Mutex<Vec<Option<GenerateOptions>>>>,
    pub default_response: String,
    pub delay: Duration,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Gemini,
            replies: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            options: Arc::new(Mutex::new(Vec::new())),
            default_response: "mock response".into(),
            delay: Duration::ZERO,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_replies(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_responses(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::with_replies(responses.into_iter().map(|r| MockReply::Text(r.into())))
    }

    /// A provider whose every call fails transiently.
    #[must_use]
    pub fn failing() -> Self {
        Self::default().repeating(MockReply::Fail("mock LLM error".into()))
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn repeating(self, reply: MockReply) -> Self {
        // Enough scripted failures for any bounded retry loop.
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(std::iter::repeat_n(reply, 64));
        self
    }

    /// Number of times `generate_text` has been entered.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn received_options(&self) -> Vec<Option<GenerateOptions>> {
        self.options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_reply(&self) -> Option<MockReply> {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

impl GenerationProvider for MockProvider {
    async fn generate_text(
        &self,
        prompt: &str,
        options: Option<&GenerateOptions>,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_owned());
        self.options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(options.cloned());

        ensure_prompt(prompt)?;
        if let Some(opts) = options {
            for tool in &opts.tools {
                if tool.provider() != self.kind {
                    return Err(LlmError::ToolMismatch {
                        expected: self.kind,
                        found: tool.provider(),
                    });
                }
            }
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.next_reply() {
            None => Ok(self.default_response.clone()),
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail(msg)) => Err(LlmError::Other(msg)),
            Some(MockReply::Status(status)) => Err(LlmError::Status {
                provider: self.kind,
                status,
            }),
            Some(MockReply::Hang) => std::future::pending().await,
        }
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}
