//! Per-run accounting of chunk outcomes.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a chunk produced no audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Longer than the provider accepts; never sent
    Rejected,
    /// Provider error scoped to this chunk
    Transient,
    /// Provider error that stopped the run
    Fatal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Rejected => "rejected",
            FailureKind::Transient => "transient",
            FailureKind::Fatal => "fatal",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChunkFailure {
    /// 1-based chunk index
    pub index: usize,
    pub kind: FailureKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every attempted chunk succeeded
    Complete,
    /// Output was written but some chunks failed or the run was aborted
    Partial,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub output_bytes: u64,
    /// Chunks in the whole document, not just the selected range
    pub total_chunks: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Chunks in range that were blank after trimming
    pub skipped: usize,
    /// Reason the run stopped early, if it did
    pub aborted: Option<String>,
    pub failures: Vec<ChunkFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn new(source: PathBuf, total_chunks: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            source,
            output: None,
            output_bytes: 0,
            total_chunks,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            aborted: None,
            failures: Vec::new(),
            started_at,
            finished_at: None,
        }
    }

    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, failure: ChunkFailure) {
        self.attempted += 1;
        self.failed += 1;
        if failure.kind == FailureKind::Fatal {
            self.aborted = Some(failure.message.clone());
        }
        self.failures.push(failure);
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn status(&self) -> RunStatus {
        if self.failed == 0 && self.aborted.is_none() {
            RunStatus::Complete
        } else {
            RunStatus::Partial
        }
    }

    /// Write the summary as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize summary")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Source: {}", self.source.display())?;
        writeln!(
            f,
            "Chunks: {} total, {} attempted, {} succeeded, {} failed, {} skipped",
            self.total_chunks, self.attempted, self.succeeded, self.failed, self.skipped
        )?;
        for failure in &self.failures {
            write!(
                f,
                "  chunk {} [{}]: {}",
                failure.index, failure.kind, failure.message
            )?;
            if let Some(hint) = &failure.remediation {
                write!(f, " (hint: {})", hint)?;
            }
            writeln!(f)?;
        }
        if let Some(reason) = &self.aborted {
            writeln!(f, "Aborted early: {}", reason)?;
        }
        match &self.output {
            Some(path) => write!(
                f,
                "Output: {} ({:.1} MB)",
                path.display(),
                self.output_bytes as f64 / (1024.0 * 1024.0)
            ),
            None => write!(f, "Output: (none written)"),
        }
    }
}
