//! Text processing for TTS: normalization and chunking.

pub mod chunker;
mod normalizer;

pub use chunker::{DEFAULT_MAX_CHUNK_SIZE, chunk_text};
pub use normalizer::normalize;

/// A chunk of normalized text ready for synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// 1-based position in the document's chunk sequence
    pub index: usize,
    /// The trimmed text content
    pub text: String,
}

impl TextChunk {
    /// Create a new text chunk.
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }

    /// Length in characters, the unit provider limits are expressed in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
