// src/models/question.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// The three supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Mcq,
    Boolean,
    Short,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::Boolean => "boolean",
            QuestionType::Short => "short",
        }
    }
}

#[derive(Debug)]
pub struct UnknownQuestionType(pub String);

impl fmt::Display for UnknownQuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown question type '{}'", self.0)
    }
}

impl std::error::Error for UnknownQuestionType {}

impl TryFrom<String> for QuestionType {
    type Error = UnknownQuestionType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "mcq" => Ok(QuestionType::Mcq),
            "boolean" => Ok(QuestionType::Boolean),
            "short" => Ok(QuestionType::Short),
            _ => Err(UnknownQuestionType(value)),
        }
    }
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,

    pub question_text: String,

    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type", try_from = "String")]
    #[serde(rename = "type")]
    pub question_type: QuestionType,

    /// Stored as a JSON array in the database. Empty for short questions.
    pub options: Json<Vec<String>>,

    pub correct_answer: String,

    /// Email of the student this question is scoped to. `None` means shared.
    pub assigned_to: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Question {
    /// Whether a student with `email` should see this question.
    pub fn is_visible_to(&self, email: &str) -> bool {
        match &self.assigned_to {
            None => true,
            Some(assigned) => assigned.eq_ignore_ascii_case(email),
        }
    }
}

/// DTO for sending a question to a student (excludes the correct answer).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: String,
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<String>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text,
            question_type: q.question_type,
            options: q.options.0,
        }
    }
}

/// Query parameters for listing questions.
#[derive(Debug, Deserialize)]
pub struct QuestionListParams {
    pub email: Option<String>,
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub correct_answer: String,
    #[validate(email)]
    pub assigned_to: Option<String>,
}

/// DTO for a partial question update.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question_text: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<QuestionType>,
    pub options: Option<Vec<String>>,
    #[validate(length(min = 1, max = 500))]
    pub correct_answer: Option<String>,
    /// `Some(None)` clears the assignment, absent leaves it untouched.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub assigned_to: Option<Option<String>>,
}

fn deserialize_some<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

pub fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    for opt in options {
        if opt.trim().is_empty() {
            return Err(validator::ValidationError::new("option_cannot_be_empty"));
        }
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

/// Checks that the options and correct answer make sense for the question type,
/// returning the options that should be stored.
pub fn normalize_options(
    question_type: QuestionType,
    options: Vec<String>,
    correct_answer: &str,
) -> Result<Vec<String>, String> {
    let matches = |opts: &[String]| {
        opts.iter()
            .any(|o| o.trim().to_lowercase() == correct_answer.trim().to_lowercase())
    };

    match question_type {
        QuestionType::Mcq => {
            if options.len() < 2 {
                return Err("Multiple choice questions need at least two options".to_string());
            }
            if !matches(&options) {
                return Err("Correct answer must be one of the options".to_string());
            }
            Ok(options)
        }
        QuestionType::Boolean => {
            let options = vec!["True".to_string(), "False".to_string()];
            if !matches(&options) {
                return Err("Correct answer must be 'True' or 'False'".to_string());
            }
            Ok(options)
        }
        QuestionType::Short => Ok(Vec::new()),
    }
}
