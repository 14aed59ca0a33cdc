// tests/common/mod.rs

#![allow(dead_code)]

use chrono::Utc;
use exam_proctor::{
    config::Config,
    handlers::auth::create_account,
    models::question::{Question, QuestionType},
    routes,
    state::AppState,
    store::QuestionStore,
};
use sqlx::types::Json;

pub const TEACHER_EMAIL: &str = "teacher@school.edu";
pub const TEACHER_PASSWORD: &str = "teacherpass";

pub struct TestApp {
    pub address: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        teacher_email: None,
        teacher_password: None,
        exam_duration_secs: 60,
    }
}

/// Spawns the app on a random port over the in-memory store, with one teacher account.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(AppState::in_memory(test_config())).await
}

/// Same as `spawn_app`, over a caller-assembled state.
pub async fn spawn_app_with(state: AppState) -> TestApp {
    create_account(state.users.as_ref(), TEACHER_EMAIL, TEACHER_PASSWORD, "teacher")
        .await
        .expect("Failed to seed teacher");

    let app = routes::create_router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        state,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let body: serde_json::Value = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .expect("Failed to parse login json");

        body["token"].as_str().expect("Token not found").to_string()
    }

    pub async fn teacher_token(&self) -> String {
        self.login(TEACHER_EMAIL, TEACHER_PASSWORD).await
    }

    /// Inserts `n` shared short-answer questions whose correct answer is "A".
    pub async fn seed_questions(&self, n: usize) -> Vec<Question> {
        let questions: Vec<Question> = (0..n)
            .map(|i| Question {
                id: format!("q{:02}", i),
                question_text: format!("Question {}", i),
                question_type: QuestionType::Short,
                options: Json(vec![]),
                correct_answer: "A".to_string(),
                assigned_to: None,
                created_at: Utc::now(),
            })
            .collect();

        self.state
            .questions
            .create_questions(questions)
            .await
            .expect("Failed to seed questions")
    }

    pub async fn submit(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/submissions/submit"))
            .json(&body)
            .send()
            .await
            .expect("Submit failed")
    }
}
