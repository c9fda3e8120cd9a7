use std::io::Write;

use crate::error::PipelineError;
use crate::insights::InsightsResult;

/// Destination for extracted insights.
pub trait InsightsSink {
    /// # Errors
    ///
    /// Returns an error if the result cannot be serialized or written.
    fn write(&mut self, insights: &InsightsResult) -> Result<(), PipelineError>;

    /// # Errors
    ///
    /// Returns an error if buffered output cannot be flushed.
    fn flush(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// Writes one compact JSON object per line.
pub struct JsonlSink<W> {
    writer: W,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonlSink<std::io::BufWriter<std::fs::File>> {
    /// Create (or truncate) `path` for writing.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Io` if the file cannot be created.
    pub fn create(path: &std::path::Path) -> Result<Self, PipelineError> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(std::io::BufWriter::new(file)))
    }
}

impl<W: Write> InsightsSink for JsonlSink<W> {
    fn write(&mut self, insights: &InsightsResult) -> Result<(), PipelineError> {
        serde_json::to_writer(&mut self.writer, insights).map_err(PipelineError::Serialize)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PipelineError> {
        self.writer.flush()?;
        Ok(())
    }
}

impl InsightsSink for Vec<InsightsResult> {
    fn write(&mut self, insights: &InsightsResult) -> Result<(), PipelineError> {
        self.push(insights.clone());
        Ok(())
    }
}
