//! Application state for the course server

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RagConfig;
use crate::courses::{CourseRecordStore, InMemoryCourseStore};
use crate::error::Result;
use crate::ingestion::{default_staging_dir, DocumentProcessor, LegacyConverter};
use crate::providers::{EmbeddingProvider, LlmProvider, OllamaClient, OllamaEmbedder, OllamaLlm};
use crate::service::KnowledgeService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Upload extraction pipeline
    processor: DocumentProcessor,
    /// Indexing, answers and quizzes
    knowledge: KnowledgeService,
    /// Course records collaborator
    courses: Arc<dyn CourseRecordStore>,
    /// Where uploads are parked while they are processed
    staging_dir: PathBuf,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create state backed by Ollama and an in-memory course store
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing course knowledge state...");

        let ollama = Arc::new(OllamaClient::new(&config.llm)?);
        tracing::info!(
            "Ollama client initialized (using {} for embeddings, {} for generation)",
            config.llm.embed_model,
            config.llm.generate_model
        );

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::from_client(
            ollama.clone(),
            config.embeddings.dimensions,
        ));
        let llm: Arc<dyn LlmProvider> = Arc::new(OllamaLlm::from_client(ollama));

        tokio::fs::create_dir_all(&config.index.storage_dir).await?;
        tracing::info!("Course indexes stored in {}", config.index.storage_dir.display());

        Ok(Self::with_providers(
            config,
            embedder,
            llm,
            Arc::new(InMemoryCourseStore::new()),
        ))
    }

    /// Create state from explicit providers
    pub fn with_providers(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        courses: Arc<dyn CourseRecordStore>,
    ) -> Self {
        let legacy = LegacyConverter::new(config.legacy.clone());
        tracing::info!("Legacy .doc conversion enabled: {}", legacy.is_enabled());

        let processor = DocumentProcessor::new(legacy);
        let knowledge = KnowledgeService::new(&config, embedder, llm);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                processor,
                knowledge,
                courses,
                staging_dir: default_staging_dir(),
                ready: RwLock::new(true),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn processor(&self) -> &DocumentProcessor {
        &self.inner.processor
    }

    pub fn knowledge(&self) -> &KnowledgeService {
        &self.inner.knowledge
    }

    pub fn courses(&self) -> &dyn CourseRecordStore {
        self.inner.courses.as_ref()
    }

    pub fn staging_dir(&self) -> &Path {
        &self.inner.staging_dir
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
