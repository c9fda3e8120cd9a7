//! Retrying insight extraction over assessment narratives.

pub mod config;
pub mod error;
pub mod extract;
pub mod insights;
pub mod pipeline;
pub mod retry;
pub mod sink;
pub mod source;

pub use config::Config;
pub use error::{ExtractError, PipelineError};
pub use extract::ExtractInsights;
pub use insights::{AssessmentRecord, InsightsResult};
pub use pipeline::{BatchReport, run_batch};
pub use retry::{Backoff, RetryPolicy};
pub use sink::{InsightsSink, JsonlSink};
