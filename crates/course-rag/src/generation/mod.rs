//! Prompt composition, model output decoding and quiz generation

mod decoder;
mod prompt;
mod quiz;

pub use decoder::QuestionDecoder;
pub use prompt::PromptBuilder;
pub use quiz::QuizGenerator;
