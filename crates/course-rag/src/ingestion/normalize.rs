//! Whitespace normalization and word counting

use once_cell::sync::Lazy;
use regex::Regex;

/// A line break, optional blank space, and another line break
static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid blank line pattern"));

/// Collapse whitespace in extracted text.
///
/// Paragraphs (text separated by at least one blank line) are kept apart by
/// exactly one blank line; every other whitespace run becomes a single
/// space. Leading and trailing whitespace is removed.
pub fn normalize(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");

    BLANK_LINES
        .split(&normalized)
        .map(|paragraph| paragraph.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Count whitespace-delimited, non-empty tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
