// src/exam/scoring.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    config::PENALTY_CAP,
    models::{question::Question, submission::EvaluatedAnswer},
};

/// Exam-level totals for one scoring run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub total_score: i32,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub unattempted_count: u32,
}

/// Per-question results plus the summary.
#[derive(Debug, Clone)]
pub struct ScoreReport {
    pub answers: Vec<EvaluatedAnswer>,
    pub summary: ScoreSummary,
}

/// Negative marking: the first `cap` wrong answers cost one point each,
/// any further wrong answers cost nothing.
#[derive(Debug, Clone, Copy)]
pub struct PenaltyBudget {
    used: u32,
    cap: u32,
}

impl PenaltyBudget {
    pub fn new(cap: u32) -> Self {
        Self { used: 0, cap }
    }

    /// Score for the next wrong answer.
    fn charge(&mut self) -> i32 {
        if self.used < self.cap {
            self.used += 1;
            -1
        } else {
            0
        }
    }

    pub fn used(&self) -> u32 {
        self.used
    }
}

impl Default for PenaltyBudget {
    fn default() -> Self {
        Self::new(PENALTY_CAP)
    }
}

/// Case-insensitive comparison with both sides trimmed.
pub fn is_correct(answer: &str, correct_answer: &str) -> bool {
    answer.trim().to_lowercase() == correct_answer.trim().to_lowercase()
}

/// Scores `answers` (already normalized) against `questions`, in question order.
///
/// Answers for questions outside `questions` are ignored; questions without an
/// answer are unattempted. The total is never clamped.
pub fn score_exam(
    questions: &[Question],
    answers: &HashMap<String, String>,
    mut budget: PenaltyBudget,
) -> ScoreReport {
    let mut summary = ScoreSummary::default();
    let mut evaluated = Vec::with_capacity(questions.len());

    for question in questions {
        let answer = answers.get(&question.id).cloned().unwrap_or_default();

        let score = if answer.is_empty() {
            summary.unattempted_count += 1;
            0
        } else if is_correct(&answer, &question.correct_answer) {
            summary.correct_count += 1;
            1
        } else {
            summary.wrong_count += 1;
            budget.charge()
        };

        summary.total_score += score;
        evaluated.push(EvaluatedAnswer {
            question_id: question.id.clone(),
            answer,
            score,
        });
    }

    ScoreReport {
        answers: evaluated,
        summary,
    }
}
