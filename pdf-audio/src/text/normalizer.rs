//! Normalization of raw extracted PDF text into a single speakable line.

use regex::Regex;
use std::sync::OnceLock;

/// Page footers such as "-- 3 of 10 --" or "Page 3 of 10".
static PAGE_MARKER: OnceLock<Regex> = OnceLock::new();

/// Whitespace runs that contain at least one blank line.
static PARAGRAPH_BREAK: OnceLock<Regex> = OnceLock::new();

fn page_marker() -> &'static Regex {
    PAGE_MARKER.get_or_init(|| {
        Regex::new(r"(?:\b[Pp]age\s*)?-*\s*\d+\s+of\s+\d+\s*-*")
            .expect("page marker pattern should compile")
    })
}

fn paragraph_break() -> &'static Regex {
    PARAGRAPH_BREAK.get_or_init(|| {
        Regex::new(r"[^\S\n]*\n[^\S\n]*\n\s*").expect("paragraph pattern should compile")
    })
}

/// Normalize raw extracted text for chunking.
///
/// In order:
/// - Removes page markers
/// - Folds paragraph breaks and remaining newlines into spaces
/// - Collapses whitespace runs to a single space
/// - Blanks everything outside printable ASCII
/// - Removes markers exposed by blanking or by earlier removals
/// - Trims the ends
///
/// The result never contains a newline or a page marker, and normalizing it
/// again is a no-op.
pub fn normalize(raw: &str) -> String {
    let text = page_marker().replace_all(raw, " ");
    let text = paragraph_break().replace_all(&text, " ");
    let text = text.replace('\n', " ");
    let text = collapse_whitespace(&text);
    let text = blank_unprintable(&text);

    // Blanked characters can sit next to existing spaces.
    let mut text = collapse_whitespace(&text);

    // Each pass shortens the text, so this terminates.
    while page_marker().is_match(&text) {
        text = collapse_whitespace(&page_marker().replace_all(&text, " "));
    }

    text.trim().to_string()
}

/// Collapse every run of whitespace into a single space.
fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            prev_was_space = false;
            result.push(c);
        }
    }

    result
}

/// Replace every character outside 0x20..=0x7E with a space.
fn blank_unprintable(text: &str) -> String {
    text.chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { ' ' })
        .collect()
}
