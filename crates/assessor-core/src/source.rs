use std::io::BufRead;
use std::path::Path;

use crate::error::PipelineError;
use crate::insights::AssessmentRecord;

/// Read one `AssessmentRecord` per non-blank line of a JSONL file.
///
/// # Errors
///
/// Returns `PipelineError::Io` if the file cannot be read, or
/// `PipelineError::Record` with the 1-based line number of the first invalid record.
pub fn read_jsonl(path: &Path) -> Result<Vec<AssessmentRecord>, PipelineError> {
    let file = std::fs::File::open(path)?;
    parse_jsonl(std::io::BufReader::new(file))
}

/// # Errors
///
/// See [`read_jsonl`].
pub fn parse_jsonl(reader: impl BufRead) -> Result<Vec<AssessmentRecord>, PipelineError> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| PipelineError::Record {
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    tracing::debug!(count = records.len(), "loaded assessment records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn skips_blank_lines() {
        let input = "{\"result\":\"a\"}\n\n  \n{\"assessment_result\":\"b\"}\n";
        let records = parse_jsonl(input.as_bytes()).unwrap();
        assert_eq!(
            records,
            vec![AssessmentRecord::new("a"), AssessmentRecord::new("b")]
        );
    }

    #[test]
    fn reports_line_of_invalid_record() {
        let input = "{\"result\":\"a\"}\nnot json\n";
        let err = parse_jsonl(input.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::Record { line: 2, .. }));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"result\":\"User scored 9/10.\"}}").unwrap();

        let records = read_jsonl(file.path()).unwrap();
        assert_eq!(records, vec![AssessmentRecord::new("User scored 9/10.")]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_jsonl(&dir.path().join("absent.jsonl")).unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
