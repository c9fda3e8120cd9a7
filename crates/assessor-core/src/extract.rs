//! The retrying extraction element.
//!
//! One invocation handles one [`AssessmentRecord`]: build the prompt, call the
//! provider under a per-attempt deadline, decode the reply, and retry on
//! failure until the [`RetryPolicy`] is exhausted. Attempts for a record are
//! strictly sequential; fan-out across records belongs to the caller.

use std::sync::Arc;
use std::time::Duration;

use assessor_llm::provider::MIME_JSON;
use assessor_llm::{GenerateOptions, GenerationProvider};
use tokio_util::sync::CancellationToken;

use crate::error::ExtractError;
use crate::insights::{AssessmentRecord, InsightsResult};
use crate::retry::RetryPolicy;

pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ExtractInsights<P> {
    provider: Arc<P>,
    schema: String,
    policy: RetryPolicy,
    attempt_timeout: Duration,
    options: GenerateOptions,
}

impl<P: GenerationProvider> ExtractInsights<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            schema: InsightsResult::schema_json().to_owned(),
            policy: RetryPolicy::default(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            options: GenerateOptions::new().with_response_mime_type(MIME_JSON),
        }
    }

    /// Replace the schema text embedded in the prompt.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Options forwarded to every call. Defaults to a JSON response MIME type.
    #[must_use]
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_response_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.options.response_mime_type = Some(mime.into());
        self
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// # Errors
    ///
    /// Returns `ExtractError::EmptyNarrative` if the record has no text.
    pub fn build_prompt(&self, record: &AssessmentRecord) -> Result<String, ExtractError> {
        if record.result.trim().is_empty() {
            return Err(ExtractError::EmptyNarrative);
        }
        Ok(format!(
            "Given the following assessment from a user's performance on the Professional Data \
             Engineer Certification Prep:\n{}\n\nExtract the key insights and respond with a \
             single JSON object that satisfies the following JSON schema:\n{}\n\nRespond with the \
             JSON object only. Do not wrap it in markdown code fences such as ```json or ```. \
             Do not add comments or explanations.",
            record.result, self.schema
        ))
    }

    /// Run one attempt: a single provider call followed by a strict decode.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if `cancel` fires first (or already has), `Timeout`
    /// if the deadline elapses, `Llm` for provider failures and `Parse` if the
    /// reply is not a schema-valid object.
    pub async fn attempt(
        &self,
        cancel: &CancellationToken,
        prompt: &str,
    ) -> Result<InsightsResult, ExtractError> {
        if cancel.is_cancelled() {
            return Err(ExtractError::Cancelled);
        }

        let call = tokio::time::timeout(
            self.attempt_timeout,
            self.provider.generate_text(prompt, Some(&self.options)),
        );
        let text = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ExtractError::Cancelled),
            res = call => res.map_err(|_| ExtractError::Timeout(self.attempt_timeout))??,
        };

        tracing::debug!(
            provider = self.provider.name(),
            len = text.len(),
            "received model response"
        );
        InsightsResult::from_response(&text).map_err(ExtractError::Parse)
    }

    /// Extract insights for `record`, retrying per the policy.
    ///
    /// The sleep between attempts is not interrupted by `cancel`; the next
    /// attempt observes the cancellation and fails immediately.
    ///
    /// # Errors
    ///
    /// Returns the error itself when it is not retryable, or
    /// `ExtractError::Exhausted` carrying the last error once every attempt failed.
    pub async fn extract(
        &self,
        cancel: &CancellationToken,
        record: &AssessmentRecord,
    ) -> Result<InsightsResult, ExtractError> {
        let prompt = self.build_prompt(record)?;
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            let err = match self.attempt(cancel, &prompt).await {
                Ok(insights) => {
                    tracing::debug!(attempt, "insights extracted");
                    return Ok(insights);
                }
                Err(e) => e,
            };

            if !self.policy.should_retry(&err) {
                tracing::debug!(attempt, "extraction failed, not retrying: {err}");
                return Err(err);
            }
            if attempt >= max_attempts {
                return Err(ExtractError::Exhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.policy.delay_after(attempt);
            tracing::warn!(
                attempt,
                max_attempts,
                "attempt {attempt} failed: {err}. Retrying in {delay:?}"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Emit the insights for `record`, or log and emit nothing.
    ///
    /// Returns whether `emit` was called. Failed records produce no output.
    pub async fn process_element(
        &self,
        cancel: &CancellationToken,
        record: &AssessmentRecord,
        emit: impl FnOnce(InsightsResult),
    ) -> bool {
        match self.extract(cancel, record).await {
            Ok(insights) => {
                emit(insights);
                true
            }
            Err(ExtractError::Exhausted { attempts, last }) => {
                tracing::error!(
                    attempts,
                    "failed to extract insights after {attempts} attempts: {last}"
                );
                false
            }
            Err(e) => {
                tracing::error!("failed to extract insights: {e}");
                false
            }
        }
    }
}
