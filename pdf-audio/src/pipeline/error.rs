use std::path::PathBuf;
use thiserror::Error;

use super::summary::RunSummary;
use crate::pdf::ExtractError;

/// Conditions that end a run without (or before) producing output.
///
/// Per-chunk failures never surface here; they are counted in the
/// [`RunSummary`] instead.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Source PDF not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Text extraction failed ({backend}): {source}")]
    ExtractionFailed {
        backend: String,
        #[source]
        source: ExtractError,
    },

    #[error("No text could be extracted from {}", .0.display())]
    EmptyText(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to write audio output: {0}")]
    Output(#[from] std::io::Error),

    #[error("{}", no_output_message(.summary))]
    NoOutputProduced { summary: Box<RunSummary> },
}

fn no_output_message(summary: &RunSummary) -> String {
    if summary.attempted == 0 {
        format!(
            "No audio produced: the selected range contains no chunks (document has {})",
            summary.total_chunks
        )
    } else {
        format!(
            "No audio produced: all {} attempted chunk(s) failed",
            summary.attempted
        )
    }
}

impl RunError {
    /// Summary of the synthesis that ran before the failure, if any did.
    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            RunError::NoOutputProduced { summary } => Some(summary.as_ref()),
            _ => None,
        }
    }

    /// Operator-facing suggestion for recovering from this error, if any.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            RunError::SourceNotFound(_) => Some("check the input path"),
            RunError::ExtractionFailed { .. } => {
                Some("confirm the file is a valid, unencrypted PDF")
            }
            RunError::EmptyText(_) => {
                Some("the PDF may be scanned images; run OCR on it first")
            }
            RunError::NoOutputProduced { summary } if summary.attempted == 0 => {
                Some("lower --start-chunk to fall inside the document")
            }
            _ => None,
        }
    }
}
