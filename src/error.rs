//! Error types shared by every pipeline stage.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. Any of these aborts the current run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("could not open {}: {source}", path.display())]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Alignment decode error: {0}")]
    Alignment(String),

    #[error("{tool} failed: {message}")]
    ExternalTool { tool: String, message: String },
}

impl PipelineError {
    /// Wrap an open failure so the offending path is reported.
    pub fn unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PipelineError::InputUnavailable {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// A single malformed input record. Readers drop the record and keep going;
/// this never surfaces as a [`PipelineError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected {expected} fields, got {found}")]
    FieldCount { expected: &'static str, found: usize },

    #[error("invalid {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid strand: '{0}'")]
    InvalidStrand(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_message_names_path() {
        let err = PipelineError::unavailable(
            "/missing/reads.txt",
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/missing/reads.txt"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn test_record_error_display() {
        let err = RecordError::InvalidNumber {
            field: "offset",
            value: "12x".to_string(),
        };
        assert_eq!(err.to_string(), "invalid offset: '12x'");
    }
}
