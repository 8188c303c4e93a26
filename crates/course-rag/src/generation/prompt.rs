//! Prompt templates for course answers and quiz generation

use crate::index::ScoredChunk;
use crate::types::QuestionType;

/// Upper bound on course material pasted into a quiz prompt, in characters
const MAX_QUIZ_CONTENT_CHARS: usize = 12_000;

/// Prompt builder for course questions and quizzes
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build context from retrieved chunks
    pub fn build_context(results: &[ScoredChunk]) -> String {
        let mut context = String::new();

        for (i, result) in results.iter().enumerate() {
            context.push_str(&format!(
                "[{}]\n{}\n\n---\n\n",
                i + 1,
                result.chunk.content
            ));
        }

        context
    }

    /// Build the course question-answering prompt
    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        format!(
            r#"You are a teaching assistant for an online course. Answer the student's question using the course material below.

INSTRUCTIONS:
1. Base your answer on the course material
2. Refer to excerpts by their number, e.g. [1], when you use them
3. If the material does not cover the question, say so and suggest asking the instructor
4. Keep the answer clear and suitable for a student

COURSE MATERIAL:
{context}

QUESTION: {question}

Answer:"#,
            context = context,
            question = question
        )
    }

    /// Prompt used when the course has no indexed material
    pub fn build_no_material_prompt(question: &str) -> String {
        format!(
            r#"You are a teaching assistant for an online course. No course material has been uploaded for this course yet.

Start your answer by telling the student that no course material is available, so the answer is not based on course content. Then give a brief, general answer to the question.

QUESTION: {question}

Answer:"#,
            question = question
        )
    }

    /// Build a quiz prompt requesting `count` questions of one type.
    ///
    /// `strict` adds a harder formatting instruction, used when a previous
    /// reply could not be decoded.
    pub fn build_quiz_prompt(
        content: &str,
        question_type: QuestionType,
        count: usize,
        strict: bool,
    ) -> String {
        let strict_note = if strict {
            "\nYour previous reply could not be parsed. Reply with ONLY the JSON object. No prose, no Markdown, no code fences.\n"
        } else {
            ""
        };

        format!(
            r#"You are an instructor writing quiz questions from course material.

Question type: {question_type}
Number of questions: {count}

{rules}

Respond with a JSON object of exactly this shape:
{{"questions": [{example}]}}
{strict_note}
COURSE MATERIAL:
{content}

JSON:"#,
            question_type = question_type,
            count = count,
            rules = Self::type_rules(question_type),
            example = Self::type_example(question_type),
            strict_note = strict_note,
            content = truncate_chars(content, MAX_QUIZ_CONTENT_CHARS),
        )
    }

    fn type_rules(question_type: QuestionType) -> &'static str {
        match question_type {
            QuestionType::MultipleChoice => {
                "Each question has four options. \"correctAnswer\" is the exact text of the correct option."
            }
            QuestionType::TrueFalse => {
                "Each question is a statement. \"correctAnswer\" is the boolean true or false. Do not include options."
            }
            QuestionType::ShortAnswer => {
                "Each question is answerable in one or two sentences. \"correctAnswer\" is a model answer. Do not include options."
            }
            QuestionType::Essay => {
                "Each question asks for an extended written response. \"correctAnswer\" lists the key points a good answer covers. Do not include options."
            }
        }
    }

    fn type_example(question_type: QuestionType) -> &'static str {
        match question_type {
            QuestionType::MultipleChoice => {
                r#"{"question": "...", "type": "multiple-choice", "options": ["...", "...", "...", "..."], "correctAnswer": "...", "points": 1, "explanation": "..."}"#
            }
            QuestionType::TrueFalse => {
                r#"{"question": "...", "type": "true-false", "correctAnswer": true, "points": 1, "explanation": "..."}"#
            }
            QuestionType::ShortAnswer => {
                r#"{"question": "...", "type": "short-answer", "correctAnswer": "...", "points": 2, "explanation": "..."}"#
            }
            QuestionType::Essay => {
                r#"{"question": "...", "type": "essay", "correctAnswer": "...", "points": 5, "explanation": "..."}"#
            }
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte, _)) => {
            tracing::debug!(
                "Quiz content truncated to {} of {} characters",
                max,
                text.chars().count()
            );
            &text[..byte]
        }
        None => text,
    }
}
