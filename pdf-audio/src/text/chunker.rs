//! Splitting normalized text into provider-sized chunks.

use super::TextChunk;

/// Default maximum chunk size in characters.
///
/// Sits just under the common 3000-character provider limit.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 2900;

/// Split text into chunks of at most `max_size` characters.
///
/// Chunks end after a ". " sentence boundary when one lies inside the
/// window, otherwise after the last space, otherwise at a hard cut of
/// exactly `max_size` characters. Chunks are trimmed and empty ones are
/// dropped; indices are 1-based and count only emitted chunks.
pub fn chunk_text(text: &str, max_size: usize) -> Chunks {
    Chunks {
        chars: text.chars().collect(),
        cursor: 0,
        max_size: max_size.max(1),
        next_index: 1,
    }
}

/// Iterator over the chunks of a text, produced lazily and consumed once.
#[derive(Debug)]
pub struct Chunks {
    chars: Vec<char>,
    cursor: usize,
    max_size: usize,
    next_index: usize,
}

impl Chunks {
    /// Advance past the next raw segment, returning its `[start, end)` char range.
    ///
    /// The cursor moves to the segment end even when trimming later removes
    /// trailing whitespace, so the next boundary search starts after it.
    fn next_span(&mut self) -> Option<(usize, usize)> {
        let len = self.chars.len();
        if self.cursor >= len {
            return None;
        }

        let start = self.cursor;
        let mut end = (start + self.max_size).min(len);

        if end < len {
            if let Some(boundary) = self.find_boundary(start, end) {
                end = boundary;
            }
        }

        self.cursor = end;
        Some((start, end))
    }

    /// Position just after the preferred split point in the window ending at `end`.
    ///
    /// Candidates must lie strictly after `start`. A sentence's period has to
    /// fit inside the window; a bare space may sit exactly at `end` since
    /// trimming drops it from the emitted chunk.
    fn find_boundary(&self, start: usize, end: usize) -> Option<usize> {
        (start + 1..end)
            .rev()
            .find(|&p| self.chars[p] == '.' && self.chars[p + 1] == ' ')
            .or_else(|| (start + 1..=end).rev().find(|&p| self.chars[p] == ' '))
            .map(|p| p + 1)
    }
}

impl Iterator for Chunks {
    type Item = TextChunk;

    fn next(&mut self) -> Option<TextChunk> {
        while let Some((start, end)) = self.next_span() {
            let raw: String = self.chars[start..end].iter().collect();
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }

            let chunk = TextChunk::new(self.next_index, trimmed.to_string());
            self.next_index += 1;
            return Some(chunk);
        }
        None
    }
}
