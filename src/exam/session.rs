// src/exam/session.rs

//! Client-side exam session: the local answer map and the countdown that
//! forces a single automatic submission when time runs out.

use std::{collections::HashMap, fmt, time::Duration};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::models::submission::{RawAnswer, SubmitExamRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaPermission {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitReason {
    Manual,
    TimeUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Active,
    Failed(String),
    Submitted(SubmitReason),
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    PermissionDenied,
    NotActive,
    AlreadySubmitted,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::PermissionDenied => write!(f, "camera or microphone permission denied"),
            SessionError::NotActive => write!(f, "exam is not running"),
            SessionError::AlreadySubmitted => write!(f, "exam already submitted"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Events fed into a running session from the UI.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Answer { question_id: String, value: String },
    Submit,
}

#[derive(Debug, Clone)]
pub struct ExamSession {
    student_email: String,
    phase: SessionPhase,
    remaining_secs: u32,
    question_ids: Vec<String>,
    answers: HashMap<String, String>,
    started_at: Option<DateTime<Utc>>,
}

impl ExamSession {
    /// Creates a session after the media check. A denied permission aborts
    /// before any exam state exists.
    pub fn start(
        student_email: impl Into<String>,
        duration_secs: u32,
        media: MediaPermission,
    ) -> Result<Self, SessionError> {
        if media == MediaPermission::Denied {
            tracing::warn!("Media permission denied, aborting exam session");
            return Err(SessionError::PermissionDenied);
        }

        Ok(Self {
            student_email: student_email.into(),
            phase: SessionPhase::Loading,
            remaining_secs: duration_secs,
            question_ids: Vec::new(),
            answers: HashMap::new(),
            started_at: None,
        })
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Questions arrived; the countdown may start.
    ///
    /// Every loaded question starts out with an empty answer, so any payload
    /// carries one entry per question even if nothing was touched.
    pub fn questions_loaded<I, S>(&mut self, question_ids: I, now: DateTime<Utc>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.phase != SessionPhase::Loading {
            return;
        }

        for id in question_ids {
            let id = id.into();
            if !self.answers.contains_key(&id) {
                self.answers.insert(id.clone(), String::new());
                self.question_ids.push(id);
            }
        }
        self.phase = SessionPhase::Active;
        self.started_at = Some(now);
    }

    pub fn load_failed(&mut self, message: impl Into<String>) {
        if self.phase == SessionPhase::Loading {
            self.phase = SessionPhase::Failed(message.into());
        }
    }

    /// Media stream was lost mid-exam.
    pub fn abort(&mut self) {
        if !matches!(self.phase, SessionPhase::Submitted(_)) {
            self.phase = SessionPhase::Aborted;
        }
    }

    pub fn record_answer(&mut self, question_id: impl Into<String>, value: impl Into<String>) {
        if self.phase == SessionPhase::Active {
            self.answers.insert(question_id.into(), value.into());
        }
    }

    /// One second elapsed. Returns the auto-submit payload exactly once, when
    /// the countdown reaches zero. Does nothing outside `Active`.
    pub fn tick(&mut self) -> Option<SubmitExamRequest> {
        if self.phase != SessionPhase::Active {
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.phase = SessionPhase::Submitted(SubmitReason::TimeUp);
            return Some(self.payload());
        }
        None
    }

    /// Manual submit; stops the countdown.
    pub fn submit(&mut self) -> Result<SubmitExamRequest, SessionError> {
        match self.phase {
            SessionPhase::Active => {
                self.phase = SessionPhase::Submitted(SubmitReason::Manual);
                Ok(self.payload())
            }
            SessionPhase::Submitted(_) => Err(SessionError::AlreadySubmitted),
            _ => Err(SessionError::NotActive),
        }
    }

    /// Loaded questions in load order, then any answers for ids outside the
    /// loaded set, sorted.
    fn payload(&self) -> SubmitExamRequest {
        let mut extra: Vec<&String> = self
            .answers
            .keys()
            .filter(|id| !self.question_ids.contains(id))
            .collect();
        extra.sort();

        let answers: Vec<RawAnswer> = self
            .question_ids
            .iter()
            .chain(extra)
            .map(|id| RawAnswer {
                question_id: id.clone(),
                answer: serde_json::Value::String(self.answers.get(id).cloned().unwrap_or_default()),
            })
            .collect();

        SubmitExamRequest {
            student_email: self.student_email.clone(),
            answers,
            exam_start_time: self.started_at,
            snapshots: Vec::new(),
        }
    }
}

/// Drives an active session: ticks once per second and applies UI events
/// until the exam is submitted, by hand or by the clock.
///
/// A closed event channel only stops input; the clock still runs out.
/// Returns `None` when the session was not active to begin with.
pub async fn run_countdown(
    session: &mut ExamSession,
    mut events: mpsc::Receiver<SessionEvent>,
) -> Option<(SubmitReason, SubmitExamRequest)> {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // The first tick completes immediately.
    interval.tick().await;

    if session.phase() != &SessionPhase::Active {
        return None;
    }

    let mut events_open = true;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Some(payload) = session.tick() {
                    tracing::info!("Exam time is up, submitting automatically");
                    return Some((SubmitReason::TimeUp, payload));
                }
            }
            event = events.recv(), if events_open => match event {
                Some(SessionEvent::Answer { question_id, value }) => {
                    session.record_answer(question_id, value);
                }
                Some(SessionEvent::Submit) => match session.submit() {
                    Ok(payload) => return Some((SubmitReason::Manual, payload)),
                    Err(e) => tracing::warn!("Ignoring submit: {}", e),
                },
                None => {
                    tracing::debug!("Exam input closed, waiting for the clock");
                    events_open = false;
                }
            },
        }
    }
}
