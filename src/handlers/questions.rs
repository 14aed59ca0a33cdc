// src/handlers/questions.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::types::Json as SqlJson;
use validator::{Validate, ValidateEmail};

use crate::{
    error::AppError,
    models::question::{
        CreateQuestionRequest, PublicQuestion, Question, QuestionListParams, UpdateQuestionRequest,
        normalize_options, validate_options,
    },
    store::DynQuestionStore,
    utils::html::clean_html,
};

/// Validates a create request and turns it into a storable question.
fn build_question(req: CreateQuestionRequest) -> Result<Question, AppError> {
    req.validate()?;

    let options = normalize_options(req.question_type, req.options, &req.correct_answer)
        .map_err(AppError::BadRequest)?;

    Ok(Question {
        id: uuid::Uuid::new_v4().to_string(),
        question_text: clean_html(&req.question_text),
        question_type: req.question_type,
        options: SqlJson(options),
        correct_answer: req.correct_answer.trim().to_string(),
        assigned_to: req.assigned_to.map(|e| e.trim().to_lowercase()),
        created_at: chrono::Utc::now(),
    })
}

/// Lists questions for the exam page, without correct answers.
///
/// With `?email=`, only shared questions and those assigned to that student.
pub async fn list_questions(
    State(questions): State<DynQuestionStore>,
    Query(params): Query<QuestionListParams>,
) -> Result<impl IntoResponse, AppError> {
    let list = questions.list_questions(params.email.as_deref()).await?;
    let public: Vec<PublicQuestion> = list.into_iter().map(PublicQuestion::from).collect();
    Ok(Json(public))
}

/// Full question record. Teacher only.
pub async fn get_question(
    State(questions): State<DynQuestionStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let question = questions
        .get_question(&id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question))
}

/// Creates a question. Teacher only.
pub async fn create_question(
    State(questions): State<DynQuestionStore>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = questions.create_question(build_question(payload)?).await?;
    tracing::info!("Created question {}", question.id);

    Ok((StatusCode::CREATED, Json(question)))
}

/// Creates many questions at once; one invalid entry rejects the whole batch.
pub async fn create_questions_bulk(
    State(questions): State<DynQuestionStore>,
    Json(payload): Json<Vec<CreateQuestionRequest>>,
) -> Result<impl IntoResponse, AppError> {
    if payload.is_empty() {
        return Err(AppError::BadRequest("No questions provided".to_string()));
    }

    let batch = payload
        .into_iter()
        .enumerate()
        .map(|(i, req)| {
            build_question(req).map_err(|e| match e {
                AppError::BadRequest(msg) => AppError::BadRequest(format!("Question {}: {}", i + 1, msg)),
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let created = questions.create_questions(batch).await?;
    tracing::info!("Created {} questions", created.len());

    Ok((StatusCode::CREATED, Json(created)))
}

/// Applies a partial update. Teacher only.
///
/// Existing submissions keep their stored scores; only future scoring sees the change.
pub async fn update_question(
    State(questions): State<DynQuestionStore>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    if let Some(Some(email)) = &payload.assigned_to {
        if !email.validate_email() {
            return Err(AppError::BadRequest("assignedTo: must be a valid email".to_string()));
        }
    }

    let mut question = questions
        .get_question(&id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    if let Some(text) = payload.question_text {
        question.question_text = clean_html(&text);
    }
    if let Some(question_type) = payload.question_type {
        question.question_type = question_type;
    }
    if let Some(answer) = payload.correct_answer {
        question.correct_answer = answer.trim().to_string();
    }
    if let Some(assigned_to) = payload.assigned_to {
        question.assigned_to = assigned_to.map(|e| e.trim().to_lowercase());
    }
    let options = match payload.options {
        Some(options) => {
            validate_options(&options).map_err(|e| AppError::BadRequest(e.code.to_string()))?;
            options
        }
        None => question.options.0.clone(),
    };
    question.options = SqlJson(
        normalize_options(question.question_type, options, &question.correct_answer)
            .map_err(AppError::BadRequest)?,
    );

    let updated = questions
        .update_question(question)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(updated))
}

/// Deletes a question. Teacher only.
pub async fn delete_question(
    State(questions): State<DynQuestionStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !questions.delete_question(&id).await? {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    tracing::info!("Deleted question {}", id);
    Ok(StatusCode::NO_CONTENT)
}
