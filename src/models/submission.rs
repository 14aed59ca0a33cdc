// src/models/submission.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use crate::exam::scoring::ScoreSummary;

/// One answer as sent by the client. `answer` may be missing, null, or any
/// JSON primitive; normalization decides what counts as attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnswer {
    pub question_id: String,
    #[serde(default)]
    pub answer: serde_json::Value,
}

/// A monitoring snapshot captured by the client camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Snapshot {
    #[validate(custom(function = validate_image_url))]
    pub image: String,
    pub timestamp: DateTime<Utc>,
}

fn validate_image_url(image: &str) -> Result<(), validator::ValidationError> {
    url::Url::parse(image)
        .map(|_| ())
        .map_err(|_| validator::ValidationError::new("snapshot_image_must_be_url"))
}

/// DTO for submitting an exam attempt.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitExamRequest {
    #[validate(email(message = "studentEmail must be a valid email"))]
    pub student_email: String,

    #[validate(length(min = 1, message = "Answers array cannot be empty"))]
    pub answers: Vec<RawAnswer>,

    pub exam_start_time: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate(nested)]
    pub snapshots: Vec<Snapshot>,
}

/// A scored answer as persisted inside a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedAnswer {
    pub question_id: String,
    pub answer: String,
    pub score: i32,
}

/// Represents the 'submissions' table in the database.
/// Answers and snapshots are embedded documents stored as JSON.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub student_email: String,
    pub exam_start_time: Option<DateTime<Utc>>,
    pub answers: Json<Vec<EvaluatedAnswer>>,
    pub snapshots: Json<Vec<Snapshot>>,
    pub submitted_at: DateTime<Utc>,
}

/// Response body for a successful submit.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitExamResponse {
    pub message: String,
    pub submission_id: String,
    pub summary: ScoreSummary,
}
