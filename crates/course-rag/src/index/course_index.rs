//! In-memory course index snapshot and brute-force cosine search

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Chunk;

/// Snapshot format written by this version
pub const SNAPSHOT_VERSION: u32 = 1;

/// A chunk together with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// Retrieval hit
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity to the query
    pub similarity: f32,
}

/// Similarity index over one course's chunks.
///
/// A handle is an owned snapshot: mutating it does not affect other
/// handles until it is saved through the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseIndex {
    version: u32,
    course_id: String,
    entries: Vec<IndexedChunk>,
    updated_at: Option<DateTime<Utc>>,
}

impl CourseIndex {
    /// An index with no chunks
    pub fn empty(course_id: impl Into<String>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            course_id: course_id.into(),
            entries: Vec::new(),
            updated_at: None,
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Chunks in insertion order
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }

    /// Embedding width, if any chunk is stored
    pub fn dimensions(&self) -> Option<usize> {
        self.entries.first().map(|e| e.embedding.len())
    }

    /// Append embedded chunks after the existing ones
    pub fn extend(&mut self, entries: Vec<IndexedChunk>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let expected = self
            .dimensions()
            .unwrap_or_else(|| entries[0].embedding.len());

        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != expected) {
            return Err(Error::store(format!(
                "embedding dimension mismatch for course {}: expected {}, got {}",
                self.course_id,
                expected,
                bad.embedding.len()
            )));
        }

        self.entries.extend(entries);
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    /// The `k` chunks most similar to `query`, best first.
    ///
    /// Equal scores keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        if k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.embedding)))
            .collect();

        // Stable sort keeps insertion order among ties
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(i, similarity)| ScoredChunk {
                chunk: self.entries[i].chunk.clone(),
                similarity,
            })
            .collect()
    }
}

/// Compute cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a * norm_b);
    if similarity.is_nan() {
        0.0
    } else {
        similarity
    }
}
