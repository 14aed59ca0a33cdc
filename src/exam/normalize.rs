// src/exam/normalize.rs

use std::collections::HashMap;

use serde_json::Value;

use crate::models::submission::RawAnswer;

/// Canonical answer text: strings are trimmed, everything else
/// (missing, null, numbers, booleans) becomes the empty string.
pub fn canonical_answer(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// Builds the question id -> canonical answer map.
/// Later entries for the same question overwrite earlier ones.
pub fn normalize_answers(answers: &[RawAnswer]) -> HashMap<String, String> {
    answers
        .iter()
        .map(|a| (a.question_id.clone(), canonical_answer(&a.answer)))
        .collect()
}
