// src/exam/aggregate.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    exam::scoring::ScoreSummary,
    models::{
        question::{Question, QuestionType},
        submission::{EvaluatedAnswer, Snapshot, Submission},
    },
};

const NOT_AVAILABLE: &str = "N/A";

/// The parts of a question the monitoring view displays.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRef {
    pub id: String,
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub correct_answer: String,
}

/// A stored answer joined with its (current) question.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedAnswer {
    pub question_id: String,
    pub answer: String,
    pub score: i32,
    /// `None` when the question has since been deleted.
    pub question: Option<QuestionRef>,
    pub question_text: String,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedSubmission {
    pub id: String,
    pub student_email: String,
    pub exam_start_time: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
    /// Whole minutes between start and submission.
    pub duration_minutes: Option<i64>,
    pub answers: Vec<EnrichedAnswer>,
    pub snapshots: Vec<Snapshot>,
    pub summary: ScoreSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSubmissions {
    pub student_email: String,
    pub attempts: Vec<EnrichedSubmission>,
}

/// Floor of the elapsed minutes, or `None` if either end is unknown.
pub fn duration_minutes(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<i64> {
    let (start, end) = (start?, end?);
    Some((end - start).num_milliseconds().div_euclid(60_000))
}

/// Display statistics from the stored per-answer scores.
///
/// Raw answer text is never re-compared, so edits to a question after the
/// attempt do not change these numbers.
pub fn stored_summary(answers: &[EvaluatedAnswer]) -> ScoreSummary {
    let mut summary = ScoreSummary::default();
    for a in answers {
        summary.total_score += a.score;
        if a.score == 1 {
            summary.correct_count += 1;
        } else if a.answer.is_empty() {
            summary.unattempted_count += 1;
        } else {
            summary.wrong_count += 1;
        }
    }
    summary
}

fn enrich_answer(answer: &EvaluatedAnswer, questions: &HashMap<&str, &Question>) -> EnrichedAnswer {
    let question = questions.get(answer.question_id.as_str()).map(|q| QuestionRef {
        id: q.id.clone(),
        question_text: q.question_text.clone(),
        question_type: q.question_type,
        correct_answer: q.correct_answer.clone(),
    });

    let (question_text, correct_answer) = match &question {
        Some(q) => (q.question_text.clone(), q.correct_answer.clone()),
        None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
    };

    EnrichedAnswer {
        question_id: answer.question_id.clone(),
        answer: answer.answer.clone(),
        score: answer.score,
        question,
        question_text,
        correct_answer,
    }
}

fn enrich_one(submission: &Submission, questions: &HashMap<&str, &Question>) -> EnrichedSubmission {
    EnrichedSubmission {
        id: submission.id.clone(),
        student_email: submission.student_email.clone(),
        exam_start_time: submission.exam_start_time,
        submitted_at: submission.submitted_at,
        duration_minutes: duration_minutes(submission.exam_start_time, Some(submission.submitted_at)),
        answers: submission
            .answers
            .iter()
            .map(|a| enrich_answer(a, questions))
            .collect(),
        snapshots: submission.snapshots.0.clone(),
        summary: stored_summary(&submission.answers),
    }
}

/// Resolves every submission's answers against the live question set.
pub fn enrich_submissions(submissions: &[Submission], questions: &[Question]) -> Vec<EnrichedSubmission> {
    let by_id: HashMap<&str, &Question> = questions.iter().map(|q| (q.id.as_str(), q)).collect();
    submissions.iter().map(|s| enrich_one(s, &by_id)).collect()
}

/// Groups enriched submissions by student, keeping first-seen order.
pub fn group_by_student(submissions: Vec<EnrichedSubmission>) -> Vec<StudentSubmissions> {
    let mut groups: Vec<StudentSubmissions> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for submission in submissions {
        match index.get(&submission.student_email) {
            Some(&i) => groups[i].attempts.push(submission),
            None => {
                index.insert(submission.student_email.clone(), groups.len());
                groups.push(StudentSubmissions {
                    student_email: submission.student_email.clone(),
                    attempts: vec![submission],
                });
            }
        }
    }

    groups
}
