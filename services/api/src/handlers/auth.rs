//! Login, registration and logout.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::{info, warn};

use super::{ApiError, authenticate, session_token};
use crate::{
    models::{ErrorResponse, LoginPayload, LoginResponse, Profile, RegisterPayload, UserRole},
    state::AppState,
    users::NewAccount,
};

/// Log in as a student or teacher.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials or role mismatch", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, ApiError> {
    if !state
        .users
        .check_credentials(&payload.username, &payload.password, payload.role)
        .await
    {
        warn!(username = %payload.username, role = %payload.role, "Rejected login");
        return Err(ApiError::Unauthorized(
            "Invalid credentials or role mismatch".to_string(),
        ));
    }

    let profile = state.users.profile(payload.role, &payload.username).await?;
    let tutor_session = match payload.role {
        UserRole::Student => Some(state.tutor.start_session()),
        UserRole::Teacher => None,
    };
    let token = state
        .sessions
        .create(&payload.username, payload.role, tutor_session)
        .await;

    Ok(Json(LoginResponse {
        token,
        role: payload.role,
        name: profile.name,
    }))
}

/// Create a student or teacher account.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Account created", body = Profile),
        (status = 400, description = "A field is empty", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .users
        .register(
            payload.role,
            NewAccount {
                username: payload.username,
                name: payload.name,
                email: payload.email,
                password: payload.password,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// End the current session. A student's tutoring conversation is discarded.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Unknown session", body = ErrorResponse)
    ),
    params(
        ("x-session-token" = String, Header, description = "Session token from login")
    )
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let session = authenticate(&state, &headers).await?;
    let token = session_token(&headers)?;
    state.sessions.remove(&token).await;
    let active_sessions = state.sessions.active_count().await;
    info!(
        username = %session.username,
        active_sessions,
        "Logged out"
    );
    Ok(StatusCode::NO_CONTENT)
}
