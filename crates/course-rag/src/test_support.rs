//! Deterministic providers for unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, LlmProvider};

/// Bag-of-words embedder: texts sharing words get similar vectors
pub(crate) struct KeywordEmbedder {
    dimensions: usize,
}

impl Default for KeywordEmbedder {
    fn default() -> Self {
        Self { dimensions: 256 }
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            let bucket = word
                .bytes()
                .fold(2166136261u32, |h, b| (h ^ b as u32).wrapping_mul(16777619));
            vector[bucket as usize % self.dimensions] += 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Embedder whose backend is always down
pub(crate) struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::model("embedding backend offline"))
    }

    fn dimensions(&self) -> usize {
        8
    }

    fn name(&self) -> &str {
        "failing"
    }
}

type Responder = Box<dyn Fn(&str, usize) -> Result<String> + Send + Sync>;

/// LLM answering through a closure of (prompt, call number); records prompts
pub(crate) struct ScriptedLlm {
    responder: Responder,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, usize) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always reply with `text`
    pub(crate) fn fixed(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_, _| Ok(text.clone()))
    }

    /// Always fail as if the model host were down
    pub(crate) fn offline() -> Self {
        Self::new(|_, _| Err(Error::model("connection refused")))
    }

    /// Reply to quiz prompts with well-formed questions of the requested
    /// type and count
    pub(crate) fn quiz() -> Self {
        Self::new(|prompt, _| Ok(quiz_reply(prompt)))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());
        (self.responder)(prompt, call)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

/// Build a JSON quiz matching the "Question type:" and
/// "Number of questions:" lines of a quiz prompt
pub(crate) fn quiz_reply(prompt: &str) -> String {
    let field = |label: &str| {
        prompt
            .lines()
            .find_map(|line| line.strip_prefix(label))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };
    let question_type = field("Question type:");
    let count: usize = field("Number of questions:").parse().unwrap_or(1);

    let questions: Vec<serde_json::Value> = (0..count)
        .map(|i| match question_type.as_str() {
            "multiple-choice" => serde_json::json!({
                "question": format!("MC question {}?", i + 1),
                "type": "multiple-choice",
                "options": ["A", "B", "C", "D"],
                "correctAnswer": "A",
                "points": 1,
                "explanation": "A is right"
            }),
            "true-false" => serde_json::json!({
                "question": format!("TF statement {}.", i + 1),
                "type": "true-false",
                "correctAnswer": i % 2 == 0,
                "points": 1,
                "explanation": ""
            }),
            _ => serde_json::json!({
                "question": format!("SA question {}?", i + 1),
                "type": "short-answer",
                "correctAnswer": "an answer",
                "points": 2,
                "explanation": "see chapter"
            }),
        })
        .collect();

    serde_json::json!({ "questions": questions }).to_string()
}
