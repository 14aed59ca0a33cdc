// src/store/mod.rs

//! Storage seams. Handlers only see these traits; `main` picks Postgres or
//! the in-memory backend at startup.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        question::Question,
        submission::Submission,
        user::User,
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// All questions, or only the ones visible to `assigned_to`
    /// (shared questions plus those assigned to that email). Creation order.
    async fn list_questions(&self, assigned_to: Option<&str>) -> Result<Vec<Question>, AppError>;

    async fn get_question(&self, id: &str) -> Result<Option<Question>, AppError>;

    async fn create_question(&self, question: Question) -> Result<Question, AppError>;

    /// Inserts all questions or none.
    async fn create_questions(&self, questions: Vec<Question>) -> Result<Vec<Question>, AppError>;

    /// Replaces the stored record. Returns `None` if it does not exist.
    async fn update_question(&self, question: Question) -> Result<Option<Question>, AppError>;

    /// Returns whether a record was removed.
    async fn delete_question(&self, id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert_submission(&self, submission: Submission) -> Result<(), AppError>;

    /// Every submission in the order it was received.
    async fn list_submissions(&self) -> Result<Vec<Submission>, AppError>;

    async fn latest_submission_for(&self, student_email: &str) -> Result<Option<Submission>, AppError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Fails with `AppError::Conflict` if the email is taken.
    async fn create_user(&self, user: User) -> Result<User, AppError>;
}

pub type DynQuestionStore = Arc<dyn QuestionStore>;
pub type DynSubmissionStore = Arc<dyn SubmissionStore>;
pub type DynUserStore = Arc<dyn UserStore>;
