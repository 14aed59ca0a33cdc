// src/handlers/submissions.rs

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use sqlx::types::Json as SqlJson;
use validator::Validate;

use crate::{
    config::{Config, PENALTY_CAP},
    error::AppError,
    exam::{
        aggregate::{enrich_submissions, group_by_student},
        normalize::normalize_answers,
        scoring::{PenaltyBudget, score_exam},
    },
    models::submission::{Submission, SubmitExamRequest, SubmitExamResponse},
    store::{DynQuestionStore, DynSubmissionStore},
    utils::jwt::Claims,
};

/// Parses the raw body so that every malformed shape is a 400 with a readable
/// message. Extractor rejections go through `From<JsonRejection>`.
fn parse_submission(body: serde_json::Value) -> Result<SubmitExamRequest, AppError> {
    let req: SubmitExamRequest = serde_json::from_value(body)?;
    req.validate()?;
    Ok(req)
}

/// Scores and stores one exam attempt.
///
/// * Answers are normalized (trimmed, non-strings unattempted).
/// * Scored against the questions visible to the student, in order.
/// * Persisted as a single insert; nothing is stored if validation fails.
pub async fn submit_exam(
    State(questions): State<DynQuestionStore>,
    State(submissions): State<DynSubmissionStore>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    let req = parse_submission(body)?;
    let student_email = req.student_email.trim().to_lowercase();

    let answers = normalize_answers(&req.answers);

    let assigned = questions.list_questions(Some(&student_email)).await?;
    if assigned.is_empty() {
        return Err(AppError::BadRequest("No questions are assigned to this student".to_string()));
    }

    let report = score_exam(&assigned, &answers, PenaltyBudget::default());

    let submission = Submission {
        id: uuid::Uuid::new_v4().to_string(),
        student_email,
        exam_start_time: req.exam_start_time,
        answers: SqlJson(report.answers),
        snapshots: SqlJson(req.snapshots),
        submitted_at: chrono::Utc::now(),
    };
    let submission_id = submission.id.clone();

    tracing::info!(
        "Scored submission {} for {}: total={} correct={} wrong={} unattempted={}",
        submission_id,
        submission.student_email,
        report.summary.total_score,
        report.summary.correct_count,
        report.summary.wrong_count,
        report.summary.unattempted_count
    );

    submissions.insert_submission(submission).await?;

    Ok(Json(SubmitExamResponse {
        message: "Exam submitted successfully".to_string(),
        submission_id,
        summary: report.summary,
    }))
}

/// Countdown length and penalty cap the exam page runs with.
pub async fn exam_settings(State(config): State<Config>) -> impl IntoResponse {
    Json(serde_json::json!({
        "durationSecs": config.exam_duration_secs,
        "penaltyCap": PENALTY_CAP,
    }))
}

/// All submissions enriched for the monitoring panel. Teacher only.
pub async fn list_submissions(
    State(questions): State<DynQuestionStore>,
    State(submissions): State<DynSubmissionStore>,
) -> Result<impl IntoResponse, AppError> {
    let all = submissions.list_submissions().await?;
    let bank = questions.list_questions(None).await?;

    Ok(Json(enrich_submissions(&all, &bank)))
}

/// Enriched submissions grouped per student. Teacher only.
pub async fn list_submissions_grouped(
    State(questions): State<DynQuestionStore>,
    State(submissions): State<DynSubmissionStore>,
) -> Result<impl IntoResponse, AppError> {
    let all = submissions.list_submissions().await?;
    let bank = questions.list_questions(None).await?;

    Ok(Json(group_by_student(enrich_submissions(&all, &bank))))
}

/// The newest raw submission of one student.
///
/// Teachers may read any student; students only themselves.
pub async fn get_submission_by_student(
    State(submissions): State<DynSubmissionStore>,
    Extension(claims): Extension<Claims>,
    Path(student_email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !claims.is_teacher() && !claims.sub.eq_ignore_ascii_case(&student_email) {
        return Err(AppError::Forbidden("Cannot view another student's submission".to_string()));
    }

    let submission = submissions
        .latest_submission_for(&student_email)
        .await?
        .ok_or(AppError::NotFound("Submission not found".to_string()))?;

    Ok(Json(submission))
}
