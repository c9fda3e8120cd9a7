use std::time::Duration;

use crate::error::ExtractError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same delay before every retry.
    Fixed(Duration),
    /// `base * 2^(attempt - 1)`, capped at `max`.
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay to wait after the given 1-based failed attempt.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::Exponential { base, max } => {
                let shift = attempt.saturating_sub(1).min(31);
                base.checked_mul(1u32 << shift).map_or(max, |d| d.min(max))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
    retry_parse_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::Fixed(DEFAULT_RETRY_DELAY),
            retry_parse_errors: true,
        }
    }
}

impl RetryPolicy {
    /// # Errors
    ///
    /// Returns `ExtractError::InvalidPolicy` if `max_attempts` is zero.
    pub fn new(max_attempts: u32, backoff: Backoff) -> Result<Self, ExtractError> {
        if max_attempts == 0 {
            return Err(ExtractError::InvalidPolicy(
                "max attempts must be at least 1".into(),
            ));
        }
        Ok(Self {
            max_attempts,
            backoff,
            retry_parse_errors: true,
        })
    }

    /// # Errors
    ///
    /// Returns `ExtractError::InvalidPolicy` if `max_attempts` is zero.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Result<Self, ExtractError> {
        Self::new(max_attempts, Backoff::Fixed(delay))
    }

    /// Whether malformed model output earns another attempt. Defaults to `true`.
    #[must_use]
    pub fn with_retry_parse_errors(mut self, retry: bool) -> Self {
        self.retry_parse_errors = retry;
        self
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    #[must_use]
    pub fn retry_parse_errors(&self) -> bool {
        self.retry_parse_errors
    }

    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.delay_after(attempt)
    }

    /// Classify a failed attempt.
    #[must_use]
    pub fn should_retry(&self, err: &ExtractError) -> bool {
        match err {
            ExtractError::Llm(e) => e.is_transient(),
            ExtractError::Timeout(_) => true,
            ExtractError::Parse(_) => self.retry_parse_errors,
            ExtractError::Cancelled
            | ExtractError::EmptyNarrative
            | ExtractError::InvalidPolicy(_)
            | ExtractError::Exhausted { .. } => false,
        }
    }
}
