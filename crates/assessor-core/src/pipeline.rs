//! Batch runner: fan records out to the extraction element and collect results.

use futures::StreamExt;
use futures::stream;
use tokio_util::sync::CancellationToken;

use assessor_llm::GenerationProvider;

use crate::error::PipelineError;
use crate::extract::ExtractInsights;
use crate::insights::AssessmentRecord;
use crate::sink::InsightsSink;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub emitted: usize,
    pub dropped: usize,
}

/// Extract insights for every record, at most `concurrency` at a time.
///
/// Results reach `sink` in completion order. Records whose extraction fails
/// are logged by the element and counted as dropped.
///
/// # Errors
///
/// Returns `PipelineError::InvalidConcurrency` for a zero limit, or a sink error.
pub async fn run_batch<P, S>(
    element: &ExtractInsights<P>,
    records: &[AssessmentRecord],
    concurrency: usize,
    cancel: &CancellationToken,
    sink: &mut S,
) -> Result<BatchReport, PipelineError>
where
    P: GenerationProvider,
    S: InsightsSink + ?Sized,
{
    if concurrency == 0 {
        return Err(PipelineError::InvalidConcurrency);
    }

    let mut report = BatchReport {
        total: records.len(),
        ..BatchReport::default()
    };
    tracing::info!(total = report.total, concurrency, "starting batch");

    let mut results = stream::iter(records)
        .map(|record| async move {
            let mut out = None;
            element
                .process_element(cancel, record, |insights| out = Some(insights))
                .await;
            out
        })
        .buffer_unordered(concurrency);

    while let Some(result) = results.next().await {
        match result {
            Some(insights) => {
                sink.write(&insights)?;
                report.emitted += 1;
            }
            None => report.dropped += 1,
        }
    }
    sink.flush()?;

    tracing::info!(
        total = report.total,
        emitted = report.emitted,
        dropped = report.dropped,
        "batch finished"
    );
    Ok(report)
}
