//! PDF-to-audio orchestration: extract, normalize, chunk, synthesize, write.

pub mod driver;
pub mod error;
pub mod summary;

pub use driver::{ChunkOutcome, ChunkProgress};
pub use error::RunError;
pub use summary::{RunStatus, RunSummary};

use chrono::Utc;
use log::{debug, info, warn};
use tts_client::SpeechProvider;

use crate::audio::AudioSink;
use crate::config::RunConfig;
use crate::pdf::PdfExtractor;
use crate::text::{self, TextChunk};

/// Read the source PDF and turn it into the full chunk sequence.
pub fn load_chunks(
    config: &RunConfig,
    extractor: &dyn PdfExtractor,
) -> Result<Vec<TextChunk>, RunError> {
    if !config.input.exists() {
        return Err(RunError::SourceNotFound(config.input.clone()));
    }

    let bytes = std::fs::read(&config.input).map_err(|source| RunError::SourceUnreadable {
        path: config.input.clone(),
        source,
    })?;
    debug!(
        "Read {} bytes from {}",
        bytes.len(),
        config.input.display()
    );

    let raw = extractor
        .extract_text(&bytes)
        .map_err(|source| RunError::ExtractionFailed {
            backend: extractor.name().to_string(),
            source,
        })?;

    let normalized = text::normalize(&raw);
    if normalized.is_empty() {
        return Err(RunError::EmptyText(config.input.clone()));
    }
    info!(
        "Extracted {} characters ({} after normalization)",
        raw.chars().count(),
        normalized.len()
    );

    let chunks: Vec<TextChunk> = text::chunk_text(&normalized, config.max_chunk_size).collect();
    info!(
        "Split into {} chunks of at most {} characters",
        chunks.len(),
        config.max_chunk_size
    );

    Ok(chunks)
}

/// Run one conversion end to end.
///
/// Returns the summary when at least one chunk was synthesized, even if
/// others failed or a fatal provider error cut the run short. When nothing
/// succeeded no output file is written and the summary travels inside
/// [`RunError::NoOutputProduced`].
pub async fn run<F>(
    config: &RunConfig,
    extractor: &dyn PdfExtractor,
    provider: &dyn SpeechProvider,
    on_progress: F,
) -> Result<RunSummary, RunError>
where
    F: FnMut(&ChunkProgress),
{
    config.validate().map_err(RunError::InvalidConfig)?;
    let started_at = Utc::now();

    let chunks = load_chunks(config, extractor)?;
    let range = config.chunk_range(chunks.len());
    info!(
        "Synthesizing chunks {}..={} of {} with {} (voice {})",
        range.start + 1,
        range.end,
        chunks.len(),
        provider.name(),
        config.voice
    );
    if range.is_empty() {
        warn!(
            "Start chunk {} is past the end of the document",
            config.start_chunk
        );
    }

    let mut summary = RunSummary::new(config.input.clone(), chunks.len(), started_at);
    let mut sink = AudioSink::create(&config.output)?;
    debug!("Staging audio for {}", sink.output_path().display());

    driver::synthesize_chunks(&chunks, config, provider, &mut sink, &mut summary, on_progress)
        .await?;

    if sink.segments() == 0 {
        // Dropping the sink discards the staging file
        drop(sink);
        summary.finished_at = Some(Utc::now());
        return Err(RunError::NoOutputProduced {
            summary: Box::new(summary),
        });
    }

    let output_bytes = sink.finish()?;
    summary.output = Some(config.output.clone());
    summary.output_bytes = output_bytes;
    summary.finished_at = Some(Utc::now());

    info!(
        "Wrote {} bytes to {}",
        output_bytes,
        config.output.display()
    );

    Ok(summary)
}
