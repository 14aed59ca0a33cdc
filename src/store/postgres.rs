// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{QuestionStore, SubmissionStore, UserStore};
use crate::{
    error::AppError,
    models::{question::Question, submission::Submission, user::User},
};

const QUESTION_COLUMNS: &str =
    "id, question_text, type, options, correct_answer, assigned_to, created_at";

const SUBMISSION_COLUMNS: &str =
    "id, student_email, exam_start_time, answers, snapshots, submitted_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[async_trait]
impl QuestionStore for PgStore {
    async fn list_questions(&self, assigned_to: Option<&str>) -> Result<Vec<Question>, AppError> {
        let sql = format!(
            r#"
            SELECT {QUESTION_COLUMNS}
            FROM questions
            WHERE $1::TEXT IS NULL
               OR assigned_to IS NULL
               OR lower(assigned_to) = lower($1)
            ORDER BY created_at, id
            "#
        );

        sqlx::query_as::<_, Question>(&sql)
            .bind(assigned_to)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list questions: {:?}", e);
                AppError::from(e)
            })
    }

    async fn get_question(&self, id: &str) -> Result<Option<Question>, AppError> {
        let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1");

        Ok(sqlx::query_as::<_, Question>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_question(&self, question: Question) -> Result<Question, AppError> {
        let mut created = self.create_questions(vec![question]).await?;
        created
            .pop()
            .ok_or_else(|| AppError::InternalServerError("Question insert returned nothing".into()))
    }

    async fn create_questions(&self, questions: Vec<Question>) -> Result<Vec<Question>, AppError> {
        let mut tx = self.pool.begin().await?;

        for q in &questions {
            sqlx::query(
                r#"
                INSERT INTO questions (id, question_text, type, options, correct_answer, assigned_to, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(&q.id)
            .bind(&q.question_text)
            .bind(q.question_type.as_str())
            .bind(&q.options)
            .bind(&q.correct_answer)
            .bind(&q.assigned_to)
            .bind(q.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict(format!("Question '{}' already exists", q.id))
                } else {
                    tracing::error!("Failed to insert question: {:?}", e);
                    AppError::from(e)
                }
            })?;
        }

        tx.commit().await?;
        Ok(questions)
    }

    async fn update_question(&self, question: Question) -> Result<Option<Question>, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE questions
            SET question_text = $2, type = $3, options = $4, correct_answer = $5, assigned_to = $6
            WHERE id = $1
            "#,
        )
        .bind(&question.id)
        .bind(&question.question_text)
        .bind(question.question_type.as_str())
        .bind(&question.options)
        .bind(&question.correct_answer)
        .bind(&question.assigned_to)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update question: {:?}", e);
            AppError::from(e)
        })?;

        Ok((result.rows_affected() > 0).then_some(question))
    }

    async fn delete_question(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn insert_submission(&self, submission: Submission) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO submissions (id, student_email, exam_start_time, answers, snapshots, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&submission.id)
        .bind(&submission.student_email)
        .bind(submission.exam_start_time)
        .bind(&submission.answers)
        .bind(&submission.snapshots)
        .bind(submission.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert submission: {:?}", e);
            AppError::from(e)
        })?;

        Ok(())
    }

    async fn list_submissions(&self) -> Result<Vec<Submission>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT ");
        query.push(SUBMISSION_COLUMNS);
        query.push(" FROM submissions ORDER BY submitted_at, id");

        query
            .build_query_as::<Submission>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list submissions: {:?}", e);
                AppError::from(e)
            })
    }

    async fn latest_submission_for(&self, student_email: &str) -> Result<Option<Submission>, AppError> {
        let sql = format!(
            r#"
            SELECT {SUBMISSION_COLUMNS}
            FROM submissions
            WHERE lower(student_email) = lower($1)
            ORDER BY submitted_at DESC
            LIMIT 1
            "#
        );

        Ok(sqlx::query_as::<_, Submission>(&sql)
            .bind(student_email)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT email, password, role, created_at FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_user(&self, user: User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password, role, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING email, password, role, created_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.role)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Email '{}' already exists", user.email))
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::from(e)
            }
        })
    }
}
