// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, ROLE_STUDENT, RegisterRequest, Session, User},
    store::{DynUserStore, UserStore},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Checks credentials against the user store and issues a token.
///
/// Unknown emails and wrong passwords both yield `AuthError`.
pub async fn authenticate(
    users: &dyn UserStore,
    config: &Config,
    email: &str,
    password: &str,
) -> Result<Session, AppError> {
    let user = users
        .find_user_by_email(email)
        .await?
        .ok_or(AppError::AuthError("Invalid email or password".to_string()))?;

    if !verify_password(password, &user.password)? {
        return Err(AppError::AuthError("Invalid email or password".to_string()));
    }

    let token = sign_jwt(&user.email, &user.role, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Session {
        token,
        email: user.email,
        role: user.role,
    })
}

/// Creates an account with a hashed password. Used for registration and for
/// seeding the teacher account at startup.
pub async fn create_account(
    users: &dyn UserStore,
    email: &str,
    password: &str,
    role: &str,
) -> Result<User, AppError> {
    let user = User {
        email: email.trim().to_lowercase(),
        password: hash_password(password)?,
        role: role.to_string(),
        created_at: chrono::Utc::now(),
    };
    users.create_user(user).await
}

/// Registers a new student.
///
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(users): State<DynUserStore>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = create_account(users.as_ref(), &payload.email, &payload.password, ROLE_STUDENT).await?;
    tracing::info!("Registered student {}", user.email);

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(users): State<DynUserStore>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let session = authenticate(users.as_ref(), &config, &payload.email, &payload.password).await?;

    Ok(Json(json!({
        "token": session.token,
        "type": "Bearer",
        "user": { "email": session.email, "role": session.role }
    })))
}
