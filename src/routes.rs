// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, questions, submissions},
    state::AppState,
    utils::jwt::{auth_middleware, teacher_middleware},
};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Assembles the main application router.
///
/// * Public: auth, question list for the exam page, exam submission.
/// * Authenticated: a student's own latest submission.
/// * Teacher: question management and the monitoring views.
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let teacher_only = ServiceBuilder::new()
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(middleware::from_fn(teacher_middleware));

    let question_routes = Router::new()
        .route("/", get(questions::list_questions))
        .merge(
            Router::new()
                .route("/", post(questions::create_question))
                .route("/bulk", post(questions::create_questions_bulk))
                .route(
                    "/{id}",
                    get(questions::get_question)
                        .put(questions::update_question)
                        .delete(questions::delete_question),
                )
                .layer(teacher_only.clone()),
        );

    let submission_routes = Router::new()
        .route("/submit", post(submissions::submit_exam))
        .route("/settings", get(submissions::exam_settings))
        .merge(
            Router::new()
                .route("/", get(submissions::list_submissions))
                .route("/grouped", get(submissions::list_submissions_grouped))
                .layer(teacher_only),
        )
        .merge(
            Router::new()
                .route("/student/{email}", get(submissions::get_submission_by_student))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/questions", question_routes)
        .nest("/api/submissions", submission_routes)
        // Global Middleware (applied from outside in)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}
