// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{QuestionStore, SubmissionStore, UserStore};
use crate::{
    error::AppError,
    models::{question::Question, submission::Submission, user::User},
};

/// Process-local store used for development without Postgres and in tests.
/// Each call sees a consistent snapshot behind its lock.
#[derive(Default)]
pub struct MemoryStore {
    questions: RwLock<Vec<Question>>,
    submissions: RwLock<Vec<Submission>>,
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn list_questions(&self, assigned_to: Option<&str>) -> Result<Vec<Question>, AppError> {
        let questions = self.questions.read().await;
        Ok(questions
            .iter()
            .filter(|q| assigned_to.is_none_or(|email| q.is_visible_to(email)))
            .cloned()
            .collect())
    }

    async fn get_question(&self, id: &str) -> Result<Option<Question>, AppError> {
        let questions = self.questions.read().await;
        Ok(questions.iter().find(|q| q.id == id).cloned())
    }

    async fn create_question(&self, question: Question) -> Result<Question, AppError> {
        let mut questions = self.questions.write().await;
        if questions.iter().any(|q| q.id == question.id) {
            return Err(AppError::Conflict(format!("Question '{}' already exists", question.id)));
        }
        questions.push(question.clone());
        Ok(question)
    }

    async fn create_questions(&self, new: Vec<Question>) -> Result<Vec<Question>, AppError> {
        let mut questions = self.questions.write().await;
        if let Some(dup) = new.iter().find(|n| questions.iter().any(|q| q.id == n.id)) {
            return Err(AppError::Conflict(format!("Question '{}' already exists", dup.id)));
        }
        questions.extend(new.iter().cloned());
        Ok(new)
    }

    async fn update_question(&self, question: Question) -> Result<Option<Question>, AppError> {
        let mut questions = self.questions.write().await;
        match questions.iter_mut().find(|q| q.id == question.id) {
            Some(slot) => {
                *slot = question.clone();
                Ok(Some(question))
            }
            None => Ok(None),
        }
    }

    async fn delete_question(&self, id: &str) -> Result<bool, AppError> {
        let mut questions = self.questions.write().await;
        let before = questions.len();
        questions.retain(|q| q.id != id);
        Ok(questions.len() != before)
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn insert_submission(&self, submission: Submission) -> Result<(), AppError> {
        self.submissions.write().await.push(submission);
        Ok(())
    }

    async fn list_submissions(&self) -> Result<Vec<Submission>, AppError> {
        Ok(self.submissions.read().await.clone())
    }

    async fn latest_submission_for(&self, student_email: &str) -> Result<Option<Submission>, AppError> {
        let submissions = self.submissions.read().await;
        Ok(submissions
            .iter()
            .rev()
            .find(|s| s.student_email.eq_ignore_ascii_case(student_email))
            .cloned())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&email.to_lowercase()).cloned())
    }

    async fn create_user(&self, user: User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        let key = user.email.to_lowercase();
        if users.contains_key(&key) {
            return Err(AppError::Conflict(format!("Email '{}' already exists", user.email)));
        }
        users.insert(key, user.clone());
        Ok(user)
    }
}
