//! Serial synthesis of the selected chunk range.

use log::{debug, error, warn};
use tts_client::{SpeechProvider, SpeechRequest, TtsError};

use super::error::RunError;
use super::summary::{ChunkFailure, FailureKind, RunSummary};
use crate::audio::AudioSink;
use crate::config::RunConfig;
use crate::text::TextChunk;

const REJECTED_HINT: &str = "lower --chunk-size below the provider limit";

/// What happened to one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Synthesized { bytes: usize },
    Skipped,
    Failed(FailureKind),
}

/// Progress report sent after each chunk in the selected range.
#[derive(Debug, Clone)]
pub struct ChunkProgress {
    /// 1-based chunk index in the document
    pub index: usize,
    /// 1-based position within the selected range
    pub position: usize,
    /// Number of chunks in the selected range
    pub range_len: usize,
    pub outcome: ChunkOutcome,
}

/// Synthesize the configured range of `chunks`, appending audio to `sink`.
///
/// Chunks run strictly one after another. After every provider call, and
/// only while more chunks remain, the loop sleeps for `config.delay`. A
/// fatal provider error stops the loop; other per-chunk errors are recorded
/// in `summary` and the loop moves on. Only output I/O errors are returned.
pub async fn synthesize_chunks<F>(
    chunks: &[TextChunk],
    config: &RunConfig,
    provider: &dyn SpeechProvider,
    sink: &mut AudioSink,
    summary: &mut RunSummary,
    mut on_progress: F,
) -> Result<(), RunError>
where
    F: FnMut(&ChunkProgress),
{
    let range = config.chunk_range(chunks.len());
    let selected = &chunks[range];
    let limit = provider.max_input_chars();

    for (pos, chunk) in selected.iter().enumerate() {
        let more_remaining = pos + 1 < selected.len();
        let mut report = |outcome: ChunkOutcome| {
            on_progress(&ChunkProgress {
                index: chunk.index,
                position: pos + 1,
                range_len: selected.len(),
                outcome,
            })
        };

        let text = chunk.text.trim();
        if text.is_empty() {
            debug!("Chunk {}: blank, skipping", chunk.index);
            summary.record_skip();
            report(ChunkOutcome::Skipped);
            continue;
        }

        let len = text.chars().count();
        if len > limit {
            let failure = ChunkFailure {
                index: chunk.index,
                kind: FailureKind::Rejected,
                message: format!(
                    "{} characters exceeds the {} limit of {}",
                    len,
                    provider.name(),
                    limit
                ),
                remediation: Some(REJECTED_HINT.to_string()),
            };
            warn!(
                "Chunk {} [rejected]: {} (hint: {})",
                chunk.index, failure.message, REJECTED_HINT
            );
            summary.record_failure(failure);
            report(ChunkOutcome::Failed(FailureKind::Rejected));
            continue;
        }

        let request = SpeechRequest {
            text: text.to_string(),
            voice: config.voice.clone(),
            model: config.model.clone(),
            format: config.format,
        };

        match provider.synthesize(&request).await {
            Ok(audio) => {
                sink.append(&audio)?;
                debug!(
                    "Chunk {}: {} bytes of audio ({} total)",
                    chunk.index,
                    audio.len(),
                    sink.bytes_written()
                );
                summary.record_success();
                report(ChunkOutcome::Synthesized { bytes: audio.len() });
            }
            Err(e) if e.is_fatal() => {
                error!(
                    "Chunk {} [fatal]: {}; stopping with {} chunk(s) unprocessed{}",
                    chunk.index,
                    e,
                    selected.len() - pos - 1,
                    hint_suffix(&e)
                );
                summary.record_failure(failure_from(chunk.index, FailureKind::Fatal, &e));
                report(ChunkOutcome::Failed(FailureKind::Fatal));
                break;
            }
            Err(e) => {
                warn!("Chunk {} [transient]: {}{}", chunk.index, e, hint_suffix(&e));
                summary.record_failure(failure_from(chunk.index, FailureKind::Transient, &e));
                report(ChunkOutcome::Failed(FailureKind::Transient));
            }
        }

        if more_remaining && !config.delay.is_zero() {
            tokio::time::sleep(config.delay).await;
        }
    }

    Ok(())
}

fn failure_from(index: usize, kind: FailureKind, err: &TtsError) -> ChunkFailure {
    ChunkFailure {
        index,
        kind,
        message: err.to_string(),
        remediation: err.remediation().map(str::to_string),
    }
}

fn hint_suffix(err: &TtsError) -> String {
    err.remediation()
        .map(|hint| format!(" (hint: {})", hint))
        .unwrap_or_default()
}
