use std::time::Duration;

use assessor_llm::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("error generating text: {0}")]
    Llm(#[from] LlmError),

    #[error("error unmarshaling insights: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("extraction cancelled")]
    Cancelled,

    #[error("assessment narrative is empty")]
    EmptyNarrative,

    #[error("invalid retry policy: {0}")]
    InvalidPolicy(String),

    #[error("failed to extract insights after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<ExtractError>,
    },
}

impl ExtractError {
    /// Whether this failure originated in decoding the model's response.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid record on line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize insights: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("concurrency must be at least 1")]
    InvalidConcurrency,
}
