//! Single-writer output file for synthesized audio segments.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Appends audio segments, in order, to a staging file next to the output.
///
/// Nothing appears at the output path until [`AudioSink::finish`] succeeds;
/// dropping the sink leaves any existing output untouched.
pub struct AudioSink {
    writer: BufWriter<NamedTempFile>,
    output_path: PathBuf,
    segments: usize,
    bytes_written: u64,
}

impl AudioSink {
    /// Create a sink that will publish to `output_path`.
    pub fn create(output_path: &Path) -> std::io::Result<Self> {
        let dir = match output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        // Staging in the same directory keeps the final rename atomic
        let staging = tempfile::Builder::new()
            .prefix(".pdf-audio-")
            .suffix(".part")
            .tempfile_in(&dir)?;

        Ok(Self {
            writer: BufWriter::new(staging),
            output_path: output_path.to_path_buf(),
            segments: 0,
            bytes_written: 0,
        })
    }

    /// Append one segment's bytes after all previous segments.
    pub fn append(&mut self, segment: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(segment)?;
        self.segments += 1;
        self.bytes_written += segment.len() as u64;
        Ok(())
    }

    /// Number of segments appended so far.
    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Flush and move the staged audio to the output path, replacing any
    /// previous file. Returns the output size in bytes.
    pub fn finish(self) -> std::io::Result<u64> {
        let staging = self.writer.into_inner().map_err(|e| e.into_error())?;
        staging.as_file().sync_all()?;
        staging
            .persist(&self.output_path)
            .map_err(|e| e.error)?;
        Ok(self.bytes_written)
    }
}
