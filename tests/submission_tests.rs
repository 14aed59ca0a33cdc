// tests/submission_tests.rs

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use common::{spawn_app, spawn_app_with, test_config};
use exam_proctor::{
    error::AppError,
    exam::session::{ExamSession, MediaPermission},
    models::submission::Submission,
    state::AppState,
    store::SubmissionStore,
};
use serde_json::json;

/// Accepts reads but fails every write, like a database that went away.
struct BrokenSubmissions;

#[async_trait]
impl SubmissionStore for BrokenSubmissions {
    async fn insert_submission(&self, _submission: Submission) -> Result<(), AppError> {
        Err(AppError::InternalServerError("connection reset by peer".to_string()))
    }

    async fn list_submissions(&self) -> Result<Vec<Submission>, AppError> {
        Ok(Vec::new())
    }

    async fn latest_submission_for(&self, _student_email: &str) -> Result<Option<Submission>, AppError> {
        Ok(None)
    }
}

fn answers(pairs: &[(&str, &str)]) -> serde_json::Value {
    json!(pairs
        .iter()
        .map(|(id, answer)| json!({ "questionId": id, "answer": answer }))
        .collect::<Vec<_>>())
}

#[tokio::test]
async fn five_right_four_wrong_scores_two() {
    let app = spawn_app().await;
    app.seed_questions(9).await;

    let response = app
        .submit(json!({
            "studentEmail": "ana@school.edu",
            "answers": answers(&[
                ("q00", "A"),
                ("q01", "a"),
                ("q02", " A "),
                ("q03", "A"),
                ("q04", "A"),
                ("q05", "B"),
                ("q06", "B"),
                ("q07", "B"),
                ("q08", "B"),
            ])
        }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["summary"]["totalScore"], 2);
    assert_eq!(body["summary"]["correctCount"], 5);
    assert_eq!(body["summary"]["wrongCount"], 4);
    assert_eq!(body["summary"]["unattemptedCount"], 0);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn all_correct_scores_question_count() {
    let app = spawn_app().await;
    app.seed_questions(4).await;

    let body: serde_json::Value = app
        .submit(json!({
            "studentEmail": "bo@school.edu",
            "answers": answers(&[("q00", "A"), ("q01", "A"), ("q02", "A"), ("q03", "A")])
        }))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["summary"]["totalScore"], 4);
    assert_eq!(body["summary"]["correctCount"], 4);
    assert_eq!(body["summary"]["wrongCount"], 0);
    assert_eq!(body["summary"]["unattemptedCount"], 0);
}

#[tokio::test]
async fn empty_answers_are_rejected_and_not_stored() {
    let app = spawn_app().await;
    app.seed_questions(3).await;

    let response = app
        .submit(json!({ "studentEmail": "cy@school.edu", "answers": [] }))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("empty"));
    assert!(app.state.submissions.list_submissions().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_submissions_are_bad_requests() {
    let app = spawn_app().await;
    app.seed_questions(1).await;

    for body in [
        json!({ "answers": [{ "questionId": "q00", "answer": "A" }] }),
        json!({ "studentEmail": 12, "answers": [{ "questionId": "q00", "answer": "A" }] }),
        json!({ "studentEmail": "dee@school.edu", "answers": { "q00": "A" } }),
    ] {
        let response = app.submit(body).await;
        assert_eq!(response.status().as_u16(), 400);
    }
}

#[tokio::test]
async fn partial_answers_count_as_unattempted() {
    let app = spawn_app().await;
    app.seed_questions(3).await;

    let body: serde_json::Value = app
        .submit(json!({
            "studentEmail": "eve@school.edu",
            "answers": [
                { "questionId": "q00", "answer": "A" },
                { "questionId": "q01", "answer": null },
                { "questionId": "q01", "answer": 5 }
            ]
        }))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["summary"]["totalScore"], 1);
    assert_eq!(body["summary"]["unattemptedCount"], 2);
}

#[tokio::test]
async fn monitoring_lists_enriched_submissions() {
    let app = spawn_app().await;
    app.seed_questions(2).await;
    let started = Utc::now() - Duration::seconds(185);

    app.submit(json!({
        "studentEmail": "fay@school.edu",
        "examStartTime": started.to_rfc3339(),
        "answers": answers(&[("q00", "A"), ("q01", "wrong")]),
        "snapshots": [{ "image": "data:image/jpeg;base64,AAAA", "timestamp": started.to_rfc3339() }]
    }))
    .await;
    app.submit(json!({
        "studentEmail": "gus@school.edu",
        "answers": answers(&[("q00", "")])
    }))
    .await;

    let token = app.teacher_token().await;

    let unauthenticated = app.client.get(app.url("/api/submissions")).send().await.unwrap();
    assert_eq!(unauthenticated.status().as_u16(), 401);

    let list: Vec<serde_json::Value> = app
        .client
        .get(app.url("/api/submissions"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(list.len(), 2);
    let fay = &list[0];
    assert_eq!(fay["studentEmail"], "fay@school.edu");
    assert_eq!(fay["durationMinutes"], 3);
    assert_eq!(fay["summary"]["correctCount"], 1);
    assert_eq!(fay["summary"]["wrongCount"], 1);
    assert_eq!(fay["answers"][0]["questionText"], "Question 0");
    assert_eq!(fay["answers"][0]["correctAnswer"], "A");
    assert_eq!(fay["snapshots"].as_array().unwrap().len(), 1);

    let gus = &list[1];
    assert!(gus["durationMinutes"].is_null());
    assert_eq!(gus["summary"]["unattemptedCount"], 2);
}

#[tokio::test]
async fn deleted_questions_show_as_not_available() {
    let app = spawn_app().await;
    app.seed_questions(1).await;
    let token = app.teacher_token().await;

    app.submit(json!({ "studentEmail": "hal@school.edu", "answers": answers(&[("q00", "A")]) }))
        .await;

    app.client
        .delete(app.url("/api/questions/q00"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let list: Vec<serde_json::Value> = app
        .client
        .get(app.url("/api/submissions"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let answer = &list[0]["answers"][0];
    assert!(answer["question"].is_null());
    assert_eq!(answer["questionText"], "N/A");
    assert_eq!(list[0]["summary"]["correctCount"], 1);
}

#[tokio::test]
async fn grouped_view_keeps_every_attempt() {
    let app = spawn_app().await;
    app.seed_questions(1).await;

    for (email, answer) in [("ivy@school.edu", "A"), ("jon@school.edu", "B"), ("ivy@school.edu", "B")] {
        app.submit(json!({ "studentEmail": email, "answers": answers(&[("q00", answer)]) }))
            .await;
    }

    let token = app.teacher_token().await;
    let groups: Vec<serde_json::Value> = app
        .client
        .get(app.url("/api/submissions/grouped"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["studentEmail"], "ivy@school.edu");
    assert_eq!(groups[0]["attempts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn student_lookup() {
    let app = spawn_app().await;
    app.seed_questions(1).await;
    let token = app.teacher_token().await;

    let missing = app
        .client
        .get(app.url("/api/submissions/student/kim@school.edu"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);

    app.submit(json!({ "studentEmail": "kim@school.edu", "answers": answers(&[("q00", "B")]) }))
        .await;
    app.submit(json!({ "studentEmail": "kim@school.edu", "answers": answers(&[("q00", "A")]) }))
        .await;

    let latest: serde_json::Value = app
        .client
        .get(app.url("/api/submissions/student/kim@school.edu"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(latest["answers"][0]["score"], 1);

    // Another student may not read it.
    app.client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "email": "lee@school.edu", "password": "password123" }))
        .send()
        .await
        .unwrap();
    let other = app.login("lee@school.edu", "password123").await;

    let forbidden = app
        .client
        .get(app.url("/api/submissions/student/kim@school.edu"))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);
}

#[tokio::test]
async fn no_visible_questions_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .submit(json!({ "studentEmail": "max@school.edu", "answers": answers(&[("q00", "A")]) }))
        .await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn exam_settings_are_public() {
    let app = spawn_app().await;

    let body: serde_json::Value = app
        .client
        .get(app.url("/api/submissions/settings"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["durationSecs"], 60);
    assert_eq!(body["penaltyCap"], 3);
}

#[tokio::test]
async fn timed_out_untouched_exam_is_scored_unattempted() {
    let app = spawn_app().await;
    let paper = app.seed_questions(3).await;

    let mut session = ExamSession::start("nia@school.edu", 1, MediaPermission::Granted).unwrap();
    session.questions_loaded(paper.iter().map(|q| q.id.clone()), Utc::now());
    let payload = session.tick().expect("time is up");

    let response = app.submit(serde_json::to_value(&payload).unwrap()).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["summary"]["unattemptedCount"], 3);
    assert_eq!(body["summary"]["totalScore"], 0);
    assert_eq!(app.state.submissions.list_submissions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unreadable_bodies_get_json_errors() {
    let app = spawn_app().await;
    app.seed_questions(1).await;

    let truncated = app
        .client
        .post(app.url("/api/submissions/submit"))
        .header("content-type", "application/json")
        .body(r#"{"studentEmail": "#)
        .send()
        .await
        .unwrap();
    assert_eq!(truncated.status().as_u16(), 400);
    let body: serde_json::Value = truncated.json().await.unwrap();
    assert!(body["error"].is_string());

    let untyped = app
        .client
        .post(app.url("/api/submissions/submit"))
        .body(r#"{"studentEmail": "oli@school.edu", "answers": [{"questionId": "q00"}]}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(untyped.status().as_u16(), 400);
    let body: serde_json::Value = untyped.json().await.unwrap();
    assert!(body["error"].is_string());

    assert!(app.state.submissions.list_submissions().await.unwrap().is_empty());
}

#[tokio::test]
async fn storage_failure_is_a_generic_server_error() {
    let mut state = AppState::in_memory(test_config());
    state.submissions = Arc::new(BrokenSubmissions);
    let app = spawn_app_with(state).await;
    app.seed_questions(2).await;

    let response = app
        .submit(json!({ "studentEmail": "pat@school.edu", "answers": answers(&[("q00", "A")]) }))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
}
