//! Quiz question types produced by generation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a single generated question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Essay,
}

impl QuestionType {
    /// Parse the labels models tend to emit ("multiple-choice", "multiple_choice", "True/False", ...)
    pub fn parse_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "multiplechoice" | "mcq" => Some(Self::MultipleChoice),
            "truefalse" | "boolean" => Some(Self::TrueFalse),
            "shortanswer" => Some(Self::ShortAnswer),
            "essay" => Some(Self::Essay),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple-choice",
            Self::TrueFalse => "true-false",
            Self::ShortAnswer => "short-answer",
            Self::Essay => "essay",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Question set requested from the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizKind {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Mixed,
}

impl QuizKind {
    /// The single question type this kind maps to, `None` for mixed
    pub fn question_type(&self) -> Option<QuestionType> {
        match self {
            Self::MultipleChoice => Some(QuestionType::MultipleChoice),
            Self::TrueFalse => Some(QuestionType::TrueFalse),
            Self::ShortAnswer => Some(QuestionType::ShortAnswer),
            Self::Mixed => None,
        }
    }
}

/// Correct answer: free text, or a boolean for true/false questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Bool(bool),
    Text(String),
}

/// A quiz question produced by the language model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: CorrectAnswer,
    pub points: u32,
    pub explanation: String,
}
