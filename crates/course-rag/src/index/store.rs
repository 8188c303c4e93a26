//! Durable per-course index store
//!
//! Each course's index lives in one JSON snapshot file named after the
//! course id. Saves write a temporary file in the same directory and rename
//! it over the snapshot, so a reader sees either the old or the new index.
//! Updates for the same course are serialized through a per-course lock;
//! embeddings are computed before the lock is taken.

use dashmap::DashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

use super::course_index::{CourseIndex, IndexedChunk, ScoredChunk, SNAPSHOT_VERSION};

const SNAPSHOT_EXTENSION: &str = "json";
const MAX_COURSE_ID_LEN: usize = 128;

/// Loads, saves and queries course indexes
pub struct CourseIndexStore {
    storage_dir: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
    writers: DashMap<String, Arc<Mutex<()>>>,
}

impl CourseIndexStore {
    pub fn new(storage_dir: impl Into<PathBuf>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            embedder,
            writers: DashMap::new(),
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Load the course's index, or an empty one if none was saved yet
    pub async fn open(&self, course_id: &str) -> Result<CourseIndex> {
        let path = self.snapshot_path(course_id)?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No index for course {}, starting empty", course_id);
                return Ok(CourseIndex::empty(course_id));
            }
            Err(e) => {
                return Err(Error::store(format!(
                    "failed to read index {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let index: CourseIndex = serde_json::from_slice(&bytes).map_err(|e| {
            Error::store(format!("corrupt index {}: {}", path.display(), e))
        })?;

        if index.version() > SNAPSHOT_VERSION {
            return Err(Error::store(format!(
                "index {} has unsupported version {}",
                path.display(),
                index.version()
            )));
        }
        if index.course_id() != course_id {
            return Err(Error::store(format!(
                "index {} belongs to course {}",
                path.display(),
                index.course_id()
            )));
        }

        tracing::debug!("Loaded index for course {} ({} chunks)", course_id, index.len());
        Ok(index)
    }

    /// Embed `chunks` and append them to `index`
    pub async fn add(&self, index: &mut CourseIndex, chunks: Vec<Chunk>) -> Result<()> {
        let entries = self.embed_chunks(chunks).await?;
        index.extend(entries)
    }

    /// Persist `index` atomically
    pub async fn save(&self, index: &CourseIndex) -> Result<()> {
        let path = self.snapshot_path(index.course_id())?;
        let dir = self.storage_dir.clone();
        let bytes = serde_json::to_vec(index)?;

        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, &bytes))
            .await
            .map_err(|e| Error::store(format!("index save task failed: {}", e)))??;

        tracing::debug!(
            "Saved index for course {} ({} chunks)",
            index.course_id(),
            index.len()
        );
        Ok(())
    }

    /// The `k` chunks of `index` most similar to `query`
    pub async fn retrieve(
        &self,
        index: &CourseIndex,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if index.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| Error::store(format!("failed to embed query: {}", e)))?;

        Ok(index.search(&embedding, k))
    }

    /// Add `chunks` to the stored index of `course_id` and save it.
    ///
    /// Concurrent updates of one course are applied one after the other,
    /// so none is lost. Returns the number of chunks in the saved index.
    pub async fn update(&self, course_id: &str, chunks: Vec<Chunk>) -> Result<usize> {
        self.snapshot_path(course_id)?;

        // Model calls happen outside the critical section
        let entries = self.embed_chunks(chunks).await?;

        let lock = self.writer_lock(course_id);
        let result = {
            let _guard = lock.lock().await;
            self.append_and_save(course_id, entries).await
        };
        self.release_writer(course_id, lock);
        result
    }

    async fn append_and_save(&self, course_id: &str, entries: Vec<IndexedChunk>) -> Result<usize> {
        let mut index = self.open(course_id).await?;
        index.extend(entries)?;
        self.save(&index).await?;

        tracing::info!("Course {} index now holds {} chunks", course_id, index.len());
        Ok(index.len())
    }

    async fn embed_chunks(&self, chunks: Vec<Chunk>) -> Result<Vec<IndexedChunk>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
            Error::store(format!(
                "failed to embed chunks with {}: {}",
                self.embedder.name(),
                e
            ))
        })?;

        if embeddings.len() != chunks.len() {
            return Err(Error::store(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let expected = self.embedder.dimensions();
        if let Some(vector) = embeddings.iter().find(|v| v.len() != expected) {
            return Err(Error::store(format!(
                "{} returned a {}-dimensional vector, configured for {}",
                self.embedder.name(),
                vector.len(),
                expected
            )));
        }

        Ok(chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect())
    }

    fn writer_lock(&self, course_id: &str) -> Arc<Mutex<()>> {
        self.writers.entry(course_id.to_string()).or_default().clone()
    }

    /// Drop the course's lock entry once no other writer holds or awaits it
    fn release_writer(&self, course_id: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.writers
            .remove_if(course_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn snapshot_path(&self, course_id: &str) -> Result<PathBuf> {
        validate_course_id(course_id)?;
        Ok(self
            .storage_dir
            .join(format!("{}.{}", course_id, SNAPSHOT_EXTENSION)))
    }
}

/// Course ids become file names, so only a safe alphabet is accepted
fn validate_course_id(course_id: &str) -> Result<()> {
    if course_id.is_empty() || course_id.len() > MAX_COURSE_ID_LEN {
        return Err(Error::invalid(format!(
            "course id must be 1-{} characters",
            MAX_COURSE_ID_LEN
        )));
    }
    if !course_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::invalid(format!(
            "course id '{}' may only contain letters, digits, '-' and '_'",
            course_id
        )));
    }
    Ok(())
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let store_err =
        |what: &str, e: std::io::Error| Error::store(format!("{} {}: {}", what, path.display(), e));

    std::fs::create_dir_all(dir).map_err(|e| store_err("cannot create directory for", e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".index-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| store_err("cannot stage", e))?;
    tmp.write_all(bytes)
        .map_err(|e| store_err("cannot write", e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| store_err("cannot sync", e))?;
    tmp.persist(path)
        .map_err(|e| store_err("cannot replace", e.error))?;
    Ok(())
}
