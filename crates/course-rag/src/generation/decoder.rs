//! Schema-validating decoder for quiz JSON returned by the model

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::types::{CorrectAnswer, GeneratedQuestion, QuestionType};

const DEFAULT_POINTS: u32 = 1;

/// Decodes `{"questions": [...]}` envelopes into [`GeneratedQuestion`]s.
///
/// Code fences and prose around the envelope are ignored. Everything inside
/// it is validated, including that every question has the `expected` type;
/// any mismatch is reported as `MalformedModelOutput`.
pub struct QuestionDecoder;

impl QuestionDecoder {
    pub fn decode(raw: &str, expected: QuestionType) -> Result<Vec<GeneratedQuestion>> {
        let json = extract_envelope(raw)?;
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::malformed(format!("invalid JSON: {}", e)))?;

        let questions = value
            .get("questions")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::malformed("missing \"questions\" array"))?;

        if questions.is_empty() {
            return Err(Error::malformed("\"questions\" array is empty"));
        }

        questions
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let object = item
                    .as_object()
                    .ok_or_else(|| Error::malformed(format!("question {} is not an object", i)))?;
                decode_question(object, expected)
                    .map_err(|message| Error::malformed(format!("question {}: {}", i, message)))
            })
            .collect()
    }
}

/// Slice from the first `{` to the last `}`
fn extract_envelope(raw: &str) -> Result<&str> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&raw[start..=end]),
        _ => Err(Error::malformed("no JSON object in model output")),
    }
}

fn decode_question(
    object: &Map<String, Value>,
    expected: QuestionType,
) -> std::result::Result<GeneratedQuestion, String> {
    let question = object
        .get("question")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or("missing \"question\"")?
        .to_string();

    let label = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or("missing \"type\"")?;
    let question_type =
        QuestionType::parse_label(label).ok_or_else(|| format!("unknown type \"{}\"", label))?;
    if question_type != expected {
        return Err(format!("expected {} question, got {}", expected, question_type));
    }

    let answer = object.get("correctAnswer").ok_or("missing \"correctAnswer\"")?;

    let (options, correct_answer) = match question_type {
        QuestionType::TrueFalse => (None, CorrectAnswer::Bool(boolean_answer(answer)?)),
        QuestionType::MultipleChoice => {
            let options = object
                .get("options")
                .and_then(Value::as_array)
                .ok_or("multiple-choice question without \"options\"")?
                .iter()
                .map(|o| scalar_text(o).ok_or("option is not text"))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            if options.len() < 2 {
                return Err("multiple-choice question needs at least two options".into());
            }
            let answer = scalar_text(answer).ok_or("\"correctAnswer\" is not text")?;
            (Some(options), CorrectAnswer::Text(answer))
        }
        QuestionType::ShortAnswer | QuestionType::Essay => {
            let answer = scalar_text(answer).ok_or("\"correctAnswer\" is not text")?;
            (None, CorrectAnswer::Text(answer))
        }
    };

    let points = match object.get("points") {
        Some(Value::Number(n)) => n.as_u64().and_then(|p| u32::try_from(p).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|&p| p > 0)
    .unwrap_or(DEFAULT_POINTS);

    let explanation = object
        .get("explanation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(GeneratedQuestion {
        question,
        question_type,
        options,
        correct_answer,
        points,
        explanation,
    })
}

fn boolean_answer(value: &Value) -> std::result::Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(format!("true/false answer \"{}\" is not a boolean", other)),
        },
        _ => Err("true/false answer is not a boolean".into()),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_fenced_output_with_prose() {
        let raw = r#"Here you go:
```json
{"questions": [
  {"question": "Which organelle makes ATP?", "type": "multiple-choice",
   "options": ["Nucleus", "Mitochondrion"], "correctAnswer": "Mitochondrion",
   "points": 2, "explanation": "Cellular respiration."}
]}
```
Good luck!"#;

        let questions = QuestionDecoder::decode(raw, QuestionType::MultipleChoice).unwrap();
        assert_eq!(questions.len(), 1);
        let q = &questions[0];
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
        assert_eq!(q.options.as_ref().unwrap().len(), 2);
        assert_eq!(q.correct_answer, CorrectAnswer::Text("Mitochondrion".into()));
        assert_eq!(q.points, 2);
    }

    #[test]
    fn test_defaults_and_boolean_normalization() {
        let raw = r#"{"questions": [
            {"question": "The sun is a star.", "type": "True/False", "correctAnswer": "TRUE"}
        ]}"#;
        let q = &QuestionDecoder::decode(raw, QuestionType::TrueFalse).unwrap()[0];
        assert_eq!(q.question_type, QuestionType::TrueFalse);
        assert_eq!(q.correct_answer, CorrectAnswer::Bool(true));
        assert_eq!(q.points, 1);
        assert_eq!(q.explanation, "");
        assert!(q.options.is_none());
    }

    #[test]
    fn test_rejects_missing_fields() {
        for (raw, expected) in [
            ("no json here", QuestionType::Essay),
            (r#"{"items": []}"#, QuestionType::Essay),
            (r#"{"questions": []}"#, QuestionType::Essay),
            (r#"{"questions": [{"type": "essay", "correctAnswer": "x"}]}"#, QuestionType::Essay),
            (r#"{"questions": [{"question": "Q?", "correctAnswer": "x"}]}"#, QuestionType::Essay),
            (r#"{"questions": [{"question": "Q?", "type": "essay"}]}"#, QuestionType::Essay),
            (
                r#"{"questions": [{"question": "Q?", "type": "matching", "correctAnswer": "x"}]}"#,
                QuestionType::Essay,
            ),
            (
                r#"{"questions": [{"question": "Q?", "type": "multiple-choice", "options": ["only"], "correctAnswer": "only"}]}"#,
                QuestionType::MultipleChoice,
            ),
            (
                r#"{"questions": [{"question": "Q?", "type": "true-false", "correctAnswer": "maybe"}]}"#,
                QuestionType::TrueFalse,
            ),
            (
                r#"{"questions": [{"question": "Q?", "type": "short-answer", "correctAnswer": "x"},"#,
                QuestionType::ShortAnswer,
            ),
        ] {
            let err = QuestionDecoder::decode(raw, expected).unwrap_err();
            assert!(
                matches!(err, Error::MalformedModelOutput(_)),
                "accepted {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_short_answer_drops_options() {
        let raw = r#"{"questions": [{"question": "Define osmosis.", "type": "short_answer",
            "options": ["a", "b"], "correctAnswer": "Diffusion of water", "points": "3"}]}"#;
        let q = &QuestionDecoder::decode(raw, QuestionType::ShortAnswer).unwrap()[0];
        assert_eq!(q.question_type, QuestionType::ShortAnswer);
        assert!(q.options.is_none());
        assert_eq!(q.points, 3);
    }

    #[test]
    fn test_rejects_question_of_other_type() {
        let raw = r#"{"questions": [
            {"question": "Which organelle makes ATP?", "type": "multiple-choice",
             "options": ["Nucleus", "Mitochondrion"], "correctAnswer": "Mitochondrion"},
            {"question": "The sun is a star.", "type": "true-false", "correctAnswer": true}
        ]}"#;
        let err = QuestionDecoder::decode(raw, QuestionType::MultipleChoice).unwrap_err();
        assert!(matches!(err, Error::MalformedModelOutput(ref msg) if msg.contains("question 1")));
    }
}
