//! Knowledge service: course indexing, question answering and quizzes

use std::sync::Arc;
use std::time::Duration;

use crate::config::{EmptyContextPolicy, RagConfig};
use crate::error::{Error, Result};
use crate::generation::{PromptBuilder, QuizGenerator};
use crate::index::{CourseIndex, CourseIndexStore};
use crate::ingestion::TextChunker;
use crate::providers::{with_timeout, EmbeddingProvider, LlmProvider};
use crate::types::{Answer, GeneratedQuestion, QuizKind};

/// Entry point used by the HTTP layer for everything past text extraction
pub struct KnowledgeService {
    index_store: CourseIndexStore,
    chunker: TextChunker,
    llm: Arc<dyn LlmProvider>,
    quiz: QuizGenerator,
    top_k: usize,
    empty_context_policy: EmptyContextPolicy,
    timeout: Duration,
}

impl KnowledgeService {
    pub fn new(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let timeout = config.llm.timeout();

        Self {
            index_store: CourseIndexStore::new(config.index.storage_dir.clone(), embedder),
            chunker: TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap),
            quiz: QuizGenerator::new(llm.clone(), config.quiz.clone(), timeout),
            llm,
            top_k: config.index.top_k,
            empty_context_policy: config.answer.empty_context_policy,
            timeout,
        }
    }

    pub fn index_store(&self) -> &CourseIndexStore {
        &self.index_store
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Open the course's index, creating an empty one if none exists
    pub async fn initialize_vector_store(&self, course_id: &str) -> Result<CourseIndex> {
        self.index_store.open(course_id).await
    }

    /// Chunk `texts` and append the chunks to the course index.
    ///
    /// Returns the number of chunks added; nothing is written when the texts
    /// hold no content.
    pub async fn process_documents<S: AsRef<str>>(
        &self,
        course_id: &str,
        texts: &[S],
    ) -> Result<usize> {
        let chunks: Vec<_> = self
            .chunker
            .chunk(texts)
            .into_iter()
            .map(|content| crate::types::Chunk::new(content, course_id))
            .collect();

        if chunks.is_empty() {
            tracing::info!("No content to index for course {}", course_id);
            return Ok(0);
        }

        let added = chunks.len();
        self.index_store.update(course_id, chunks).await?;

        tracing::info!("Indexed {} chunks for course {}", added, course_id);
        Ok(added)
    }

    /// Answer `question` from the course's indexed material.
    ///
    /// A course without material is answered with a warning and no sources,
    /// or rejected with `EmptyContext`, depending on configuration.
    pub async fn answer_question(&self, question: &str, course_id: &str) -> Result<Answer> {
        if question.trim().is_empty() {
            return Err(Error::invalid("question must not be empty"));
        }

        let index = self.initialize_vector_store(course_id).await?;
        let results = self
            .index_store
            .retrieve(&index, question, self.top_k)
            .await?;

        let prompt = if results.is_empty() {
            if self.empty_context_policy == EmptyContextPolicy::Reject {
                return Err(Error::EmptyContext(course_id.to_string()));
            }
            tracing::warn!("Course {} has no indexed material", course_id);
            PromptBuilder::build_no_material_prompt(question)
        } else {
            let context = PromptBuilder::build_context(&results);
            PromptBuilder::build_qa_prompt(question, &context)
        };

        tracing::info!(
            "Answering for course {} with {} sources via {}",
            course_id,
            results.len(),
            self.llm.model()
        );

        let answer = with_timeout(self.timeout, "Answer generation", self.llm.generate(&prompt))
            .await?;

        Ok(Answer::new(
            answer.trim().to_string(),
            results.into_iter().map(|r| r.chunk).collect(),
        ))
    }

    /// Generate a quiz from `content`
    pub async fn generate_question_variations(
        &self,
        content: &str,
        kind: QuizKind,
    ) -> Result<Vec<GeneratedQuestion>> {
        self.quiz.generate_question_variations(content, kind).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{KeywordEmbedder, ScriptedLlm};

    fn config_in(dir: &std::path::Path) -> RagConfig {
        let mut config = RagConfig::default();
        config.index.storage_dir = dir.to_path_buf();
        config
    }

    fn service(config: &RagConfig, llm: Arc<ScriptedLlm>) -> KnowledgeService {
        KnowledgeService::new(config, Arc::new(KeywordEmbedder::default()), llm)
    }

    #[tokio::test]
    async fn test_empty_course_answers_without_sources() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedLlm::fixed(" No material yet. "));
        let service = service(&config_in(dir.path()), llm.clone());

        let answer = service.answer_question("What is mitosis?", "bio").await.unwrap();
        assert!(answer.sources.is_empty());
        assert_eq!(answer.answer, "No material yet.");
        assert!(llm.prompts()[0].contains("No course material has been uploaded"));
    }

    #[tokio::test]
    async fn test_reject_policy_yields_empty_context() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.answer.empty_context_policy = EmptyContextPolicy::Reject;
        let llm = Arc::new(ScriptedLlm::fixed("unused"));
        let service = service(&config, llm.clone());

        let err = service.answer_question("Anything?", "bio").await.unwrap_err();
        assert!(matches!(err, Error::EmptyContext(ref id) if id == "bio"));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_answer_cites_retrieved_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.chunking.chunk_size = 60;
        config.chunking.chunk_overlap = 10;
        config.index.top_k = 2;
        let llm = Arc::new(ScriptedLlm::fixed("Mitosis produces two cells [1]."));
        let service = service(&config, llm.clone());

        let added = service
            .process_documents(
                "bio",
                &[
                    "Mitosis produces two identical daughter cells.",
                    "Photosynthesis converts light into chemical energy.",
                    "Enzymes lower the activation energy of reactions.",
                ],
            )
            .await
            .unwrap();
        assert!(added >= 3);

        let answer = service
            .answer_question("What does mitosis produce?", "bio")
            .await
            .unwrap();
        assert_eq!(answer.sources.len(), 2);
        assert!(answer.sources[0].content.contains("Mitosis"));
        assert!(answer.sources.iter().all(|c| c.course_id == "bio"));
        assert!(llm.prompts()[0].contains("QUESTION: What does mitosis produce?"));
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&config_in(dir.path()), Arc::new(ScriptedLlm::offline()));
        let err = service.answer_question("Why?", "bio").await.unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
    }

    #[tokio::test]
    async fn test_process_documents_without_content() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&config_in(dir.path()), Arc::new(ScriptedLlm::fixed("")));
        assert_eq!(service.process_documents("bio", &["", "   "]).await.unwrap(), 0);
        assert!(service.initialize_vector_store("bio").await.unwrap().is_empty());
        assert!(!dir.path().join("bio.json").exists());
    }

    #[tokio::test]
    async fn test_uploads_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&config_in(dir.path()), Arc::new(ScriptedLlm::fixed("")));
        service.process_documents("bio", &["first upload"]).await.unwrap();
        service.process_documents("bio", &["second upload"]).await.unwrap();
        assert_eq!(service.initialize_vector_store("bio").await.unwrap().len(), 2);
    }
}
