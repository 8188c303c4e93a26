//! Overlapping text chunking with boundary-aware cut points

use unicode_segmentation::UnicodeSegmentation;

/// Separator placed between documents before chunking
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Text chunker with configurable size and overlap
///
/// Windows are measured in characters. Every window but the last is at most
/// `chunk_size` long, and consecutive windows share exactly `overlap`
/// characters, so dropping the first `overlap` characters of each window
/// after the first and concatenating gives back the input.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Characters shared between consecutive chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. `overlap` is clamped below `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Join `texts` with a blank line and split the result into windows
    pub fn chunk<S: AsRef<str>>(&self, texts: &[S]) -> Vec<String> {
        let joined = texts
            .iter()
            .map(|t| t.as_ref())
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR);
        self.chunk_text(&joined)
    }

    /// Split a single text into overlapping windows
    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        // Byte offset of every char, plus the end of the text
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = offsets.len() - 1;

        if total <= self.chunk_size {
            return vec![text.to_string()];
        }

        let boundaries = Boundaries::scan(text, &offsets);
        let mut chunks = Vec::new();
        let mut start = 0usize;

        loop {
            let hard_end = start + self.chunk_size;
            if hard_end >= total {
                chunks.push(text[offsets[start]..].to_string());
                break;
            }

            // Never cut so early that the next window fails to advance
            let floor = start + (self.chunk_size / 2).max(self.overlap + 1);
            let end = boundaries.best_cut(floor, hard_end).unwrap_or(hard_end);

            chunks.push(text[offsets[start]..offsets[end]].to_string());
            start = end - self.overlap;
        }

        tracing::debug!(
            "Chunked {} chars into {} chunks (size {}, overlap {})",
            total,
            chunks.len(),
            self.chunk_size,
            self.overlap
        );

        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

/// Candidate cut positions (char indices), by preference
struct Boundaries {
    /// Positions right after a blank line
    paragraphs: Vec<usize>,
    /// Positions where a sentence starts
    sentences: Vec<usize>,
    /// Positions right after a whitespace char
    words: Vec<usize>,
}

impl Boundaries {
    fn scan(text: &str, offsets: &[usize]) -> Self {
        let char_index = |byte: usize| offsets.partition_point(|&o| o < byte);

        let paragraphs = text
            .match_indices(DOCUMENT_SEPARATOR)
            .map(|(i, sep)| char_index(i + sep.len()))
            .collect();

        let sentences = text
            .split_sentence_bound_indices()
            .map(|(i, _)| char_index(i))
            .filter(|&i| i > 0)
            .collect();

        let words = text
            .char_indices()
            .filter(|(_, c)| c.is_whitespace())
            .map(|(i, c)| char_index(i + c.len_utf8()))
            .collect();

        Self {
            paragraphs,
            sentences,
            words,
        }
    }

    /// Latest cut in `floor..=ceiling`, preferring paragraphs, then
    /// sentences, then word breaks
    fn best_cut(&self, floor: usize, ceiling: usize) -> Option<usize> {
        [&self.paragraphs, &self.sentences, &self.words]
            .into_iter()
            .find_map(|positions| latest_in_range(positions, floor, ceiling))
    }
}

fn latest_in_range(sorted: &[usize], floor: usize, ceiling: usize) -> Option<usize> {
    let idx = sorted.partition_point(|&p| p <= ceiling);
    idx.checked_sub(1)
        .map(|i| sorted[i])
        .filter(|&p| p >= floor)
}
