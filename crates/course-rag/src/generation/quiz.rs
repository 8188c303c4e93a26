//! Quiz generation over a course knowledge source

use std::sync::Arc;
use std::time::Duration;

use crate::config::QuizConfig;
use crate::error::{Error, Result};
use crate::providers::{with_timeout, LlmProvider};
use crate::types::{GeneratedQuestion, QuestionType, QuizKind};

use super::decoder::QuestionDecoder;
use super::prompt::PromptBuilder;

/// Generates quiz question sets with the hosted model
pub struct QuizGenerator {
    llm: Arc<dyn LlmProvider>,
    config: QuizConfig,
    timeout: Duration,
}

impl QuizGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>, config: QuizConfig, timeout: Duration) -> Self {
        Self {
            llm,
            config,
            timeout,
        }
    }

    /// Generate questions of `kind` from `content`.
    ///
    /// A single type issues one request for `single_type_count` questions.
    /// `Mixed` issues one request per sub-type concurrently and returns
    /// multiple-choice, then true/false, then short-answer questions, each
    /// batch cut to its configured count.
    pub async fn generate_question_variations(
        &self,
        content: &str,
        kind: QuizKind,
    ) -> Result<Vec<GeneratedQuestion>> {
        if content.trim().is_empty() {
            return Err(Error::invalid("no content to generate questions from"));
        }

        let questions = match kind.question_type() {
            Some(question_type) => {
                self.generate_batch(content, question_type, self.config.single_type_count)
                    .await?
            }
            None => {
                let (multiple_choice, true_false, short_answer) = futures::try_join!(
                    self.generate_batch(
                        content,
                        QuestionType::MultipleChoice,
                        self.config.multiple_choice_count
                    ),
                    self.generate_batch(
                        content,
                        QuestionType::TrueFalse,
                        self.config.true_false_count
                    ),
                    self.generate_batch(
                        content,
                        QuestionType::ShortAnswer,
                        self.config.short_answer_count
                    ),
                )?;

                multiple_choice
                    .into_iter()
                    .chain(true_false)
                    .chain(short_answer)
                    .collect()
            }
        };

        tracing::info!("Generated {} {:?} questions", questions.len(), kind);
        Ok(questions)
    }

    async fn generate_batch(
        &self,
        content: &str,
        question_type: QuestionType,
        count: usize,
    ) -> Result<Vec<GeneratedQuestion>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut questions = match self.request(content, question_type, count, false).await {
            Err(Error::MalformedModelOutput(reason)) if self.config.retry_malformed => {
                tracing::warn!(
                    "Malformed {} output ({}), retrying with stricter instructions",
                    question_type,
                    reason
                );
                self.request(content, question_type, count, true).await?
            }
            result => result?,
        };

        questions.truncate(count);
        Ok(questions)
    }

    async fn request(
        &self,
        content: &str,
        question_type: QuestionType,
        count: usize,
        strict: bool,
    ) -> Result<Vec<GeneratedQuestion>> {
        let prompt = PromptBuilder::build_quiz_prompt(content, question_type, count, strict);
        let raw = with_timeout(
            self.timeout,
            "Quiz generation",
            self.llm.generate_json(&prompt),
        )
        .await?;

        QuestionDecoder::decode(&raw, question_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{quiz_reply, ScriptedLlm};
    use async_trait::async_trait;

    fn generator(llm: Arc<ScriptedLlm>, config: QuizConfig) -> QuizGenerator {
        QuizGenerator::new(llm, config, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_mixed_returns_seven_in_type_order() {
        let llm = Arc::new(ScriptedLlm::quiz());
        let questions = generator(llm.clone(), QuizConfig::default())
            .generate_question_variations("Cells divide by mitosis.", QuizKind::Mixed)
            .await
            .unwrap();

        let types: Vec<_> = questions.iter().map(|q| q.question_type).collect();
        assert_eq!(
            types,
            vec![
                QuestionType::MultipleChoice,
                QuestionType::MultipleChoice,
                QuestionType::MultipleChoice,
                QuestionType::TrueFalse,
                QuestionType::TrueFalse,
                QuestionType::ShortAnswer,
                QuestionType::ShortAnswer,
            ]
        );
        assert_eq!(llm.calls(), 3);
    }

    #[tokio::test]
    async fn test_mixed_rejects_batches_of_the_wrong_type() {
        // Every batch comes back as true/false, whatever was asked for
        let reply = quiz_reply("Question type: true-false\nNumber of questions: 3\n");
        let llm = Arc::new(ScriptedLlm::fixed(&reply));
        let err = generator(llm.clone(), QuizConfig::default())
            .generate_question_variations("Cells divide by mitosis.", QuizKind::Mixed)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedModelOutput(_)));
        assert!(llm
            .prompts()
            .iter()
            .any(|p| p.contains("previous reply could not be parsed")));
    }

    #[tokio::test]
    async fn test_wrong_type_recovered_by_strict_retry() {
        let llm = Arc::new(ScriptedLlm::new(|prompt, call| {
            if call == 0 {
                Ok(quiz_reply("Question type: essay\nNumber of questions: 5\n"))
            } else {
                Ok(quiz_reply(prompt))
            }
        }));
        let questions = generator(llm.clone(), QuizConfig::default())
            .generate_question_variations("text", QuizKind::MultipleChoice)
            .await
            .unwrap();
        assert_eq!(questions.len(), 5);
        assert!(questions
            .iter()
            .all(|q| q.question_type == QuestionType::MultipleChoice));
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_single_type_issues_one_request() {
        let llm = Arc::new(ScriptedLlm::quiz());
        let questions = generator(llm.clone(), QuizConfig::default())
            .generate_question_variations("Cells divide.", QuizKind::TrueFalse)
            .await
            .unwrap();

        assert_eq!(questions.len(), 5);
        assert!(questions
            .iter()
            .all(|q| q.question_type == QuestionType::TrueFalse));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_extra_questions_truncated_in_order() {
        // Always answers with four short-answer questions
        let reply = quiz_reply("Question type: short-answer\nNumber of questions: 4\n");
        let llm = Arc::new(ScriptedLlm::fixed(&reply));
        let config = QuizConfig {
            single_type_count: 2,
            ..QuizConfig::default()
        };

        let questions = generator(llm, config)
            .generate_question_variations("text", QuizKind::ShortAnswer)
            .await
            .unwrap();

        let texts: Vec<_> = questions.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(texts, vec!["SA question 1?", "SA question 2?"]);
    }

    #[tokio::test]
    async fn test_retries_once_with_strict_prompt() {
        let llm = Arc::new(ScriptedLlm::new(|prompt, call| {
            if call == 0 {
                Ok("Sure! Here are your questions.".to_string())
            } else {
                Ok(quiz_reply(prompt))
            }
        }));

        let questions = generator(llm.clone(), QuizConfig::default())
            .generate_question_variations("text", QuizKind::MultipleChoice)
            .await
            .unwrap();

        assert_eq!(questions.len(), 5);
        assert_eq!(llm.calls(), 2);
        assert!(llm.prompts()[1].contains("previous reply could not be parsed"));
    }

    #[tokio::test]
    async fn test_malformed_after_retry_or_without_retry() {
        let llm = Arc::new(ScriptedLlm::fixed("{\"questions\": \"nope\"}"));
        let err = generator(llm.clone(), QuizConfig::default())
            .generate_question_variations("text", QuizKind::ShortAnswer)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedModelOutput(_)));
        assert_eq!(llm.calls(), 2);

        let llm = Arc::new(ScriptedLlm::fixed("not json"));
        let config = QuizConfig {
            retry_malformed: false,
            ..QuizConfig::default()
        };
        let err = generator(llm.clone(), config)
            .generate_question_variations("text", QuizKind::ShortAnswer)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedModelOutput(_)));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_model_failure_is_not_retried() {
        let llm = Arc::new(ScriptedLlm::offline());
        let err = generator(llm.clone(), QuizConfig::default())
            .generate_question_variations("text", QuizKind::Mixed)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_content_rejected() {
        let llm = Arc::new(ScriptedLlm::quiz());
        let err = generator(llm.clone(), QuizConfig::default())
            .generate_question_variations("  \n", QuizKind::Mixed)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert_eq!(llm.calls(), 0);
    }

    struct StalledLlm;

    #[async_trait]
    impl LlmProvider for StalledLlm {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "stalled"
        }

        fn model(&self) -> &str {
            "stalled"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_model_times_out() {
        let generator =
            QuizGenerator::new(Arc::new(StalledLlm), QuizConfig::default(), Duration::from_secs(2));
        let err = generator
            .generate_question_variations("text", QuizKind::TrueFalse)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(ref msg) if msg.contains("timed out")));
    }
}
