//! Configuration for the course knowledge service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Ollama/LLM configuration
    pub llm: LlmConfig,
    /// Course index storage configuration
    pub index: IndexConfig,
    /// Quiz generation configuration
    pub quiz: QuizConfig,
    /// Question answering configuration
    pub answer: AnswerConfig,
    /// Legacy `.doc` conversion configuration
    pub legacy: LegacyConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum size of a single uploaded file in bytes (default: 10MB)
    pub max_upload_size: usize,
    /// Maximum number of files in one upload request
    pub max_files_per_request: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 10 * 1024 * 1024,
            max_files_per_request: 10,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding dimensions (768 for nomic-embed-text)
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { dimensions: 768 }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "llama3.1:8b".to_string(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    /// Bounded timeout applied to every hosted-model call
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Course index storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding one snapshot file per course
    pub storage_dir: PathBuf,
    /// Number of chunks retrieved per question
    pub top_k: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let storage_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("course-rag")
            .join("indexes");

        Self {
            storage_dir,
            top_k: 4,
        }
    }
}

/// Quiz generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Multiple-choice questions in a mixed set
    pub multiple_choice_count: usize,
    /// True/false questions in a mixed set
    pub true_false_count: usize,
    /// Short-answer questions in a mixed set
    pub short_answer_count: usize,
    /// Questions requested when a single type is asked for
    pub single_type_count: usize,
    /// Retry once with a stricter instruction on malformed output
    pub retry_malformed: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            multiple_choice_count: 3,
            true_false_count: 2,
            short_answer_count: 2,
            single_type_count: 5,
            retry_malformed: true,
        }
    }
}

/// What to do when a question targets a course with no indexed material
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyContextPolicy {
    /// Answer anyway, telling the student no material exists
    #[default]
    Answer,
    /// Fail with `EmptyContext`
    Reject,
}

/// Question answering configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    pub empty_context_policy: EmptyContextPolicy,
}

/// Legacy Word (.doc) conversion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyConfig {
    /// Allow LibreOffice conversion of binary .doc files
    pub enabled: bool,
    /// LibreOffice executable
    pub libreoffice_binary: String,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            libreoffice_binary: "soffice".to_string(),
        }
    }
}

impl RagConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist, then apply environment overrides and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `COURSE_RAG_*` overrides from the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("COURSE_RAG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("COURSE_RAG_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid COURSE_RAG_PORT: {}", port)))?;
        }
        if let Some(url) = lookup("COURSE_RAG_OLLAMA_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup("COURSE_RAG_GENERATE_MODEL") {
            self.llm.generate_model = model;
        }
        if let Some(model) = lookup("COURSE_RAG_EMBED_MODEL") {
            self.llm.embed_model = model;
        }
        if let Some(dir) = lookup("COURSE_RAG_INDEX_DIR") {
            self.index.storage_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than 0".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.index.top_k == 0 {
            return Err(Error::Config("top_k must be greater than 0".into()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::Config("llm.timeout_secs must be greater than 0".into()));
        }
        if self.server.max_files_per_request == 0 {
            return Err(Error::Config(
                "max_files_per_request must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
