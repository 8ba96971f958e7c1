//! Axum Handlers for the REST API
//!
//! This module contains the error type shared by every handler and the
//! session-token authentication helpers. Handlers are grouped by area and
//! carry `utoipa` doc comments for the OpenAPI document.

pub mod auth;
pub mod contact;
pub mod courses;
pub mod profile;
pub mod tutor;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::{
    courses::CourseError,
    models::{ErrorResponse, UserRole},
    sessions::PortalSession,
    state::AppState,
    users::UserStoreError,
};

/// Header carrying the token returned by `POST /auth/login`.
pub const SESSION_HEADER: &str = "x-session-token";

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    BadGateway(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::BadGateway(message) => (StatusCode::BAD_GATEWAY, message),
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalServerError(err)
    }
}

impl From<UserStoreError> for ApiError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::UnknownUser(_) | UserStoreError::NotEnrolled(_) => {
                Self::NotFound(err.to_string())
            }
            UserStoreError::UsernameTaken(_)
            | UserStoreError::EmailTaken(_)
            | UserStoreError::AlreadyEnrolled(_) => Self::Conflict(err.to_string()),
            UserStoreError::InvalidInput(_) => Self::BadRequest(err.to_string()),
            UserStoreError::Io(_) | UserStoreError::Parse(_) => {
                Self::InternalServerError(err.into())
            }
        }
    }
}

impl From<CourseError> for ApiError {
    fn from(err: CourseError) -> Self {
        match err {
            CourseError::UnknownCourse(_) | CourseError::NotFound(_) => {
                Self::NotFound(err.to_string())
            }
            CourseError::InvalidPath(_) => Self::BadRequest(err.to_string()),
            CourseError::Io(_) => Self::InternalServerError(err.into()),
        }
    }
}

/// Reads the session token header, if present and well formed.
fn session_token(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or_else(|| ApiError::Unauthorized(format!("{} header is required", SESSION_HEADER)))
}

/// Resolves the caller's portal session from the request headers.
pub(crate) async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Arc<PortalSession>, ApiError> {
    let token = session_token(headers)?;
    state
        .sessions
        .get(&token)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Session expired or unknown. Please log in.".to_string()))
}

/// Fails unless the caller is logged in as a teacher of `course`.
pub(crate) async fn require_teacher_of(
    state: &AppState,
    session: &PortalSession,
    course: &str,
) -> Result<(), ApiError> {
    if session.role != UserRole::Teacher {
        return Err(ApiError::Forbidden("Only teachers can manage courses".to_string()));
    }
    if !state.courses.contains(course).await {
        return Err(CourseError::UnknownCourse(course.to_string()).into());
    }
    if !state.users.has_course(UserRole::Teacher, &session.username, course).await {
        return Err(ApiError::Forbidden(format!("You do not teach '{}'", course)));
    }
    Ok(())
}

/// Fails unless the caller is enrolled in (student) or teaches (teacher) `course`.
pub(crate) async fn require_course_access(
    state: &AppState,
    session: &PortalSession,
    course: &str,
) -> Result<(), ApiError> {
    if !state.courses.contains(course).await {
        return Err(CourseError::UnknownCourse(course.to_string()).into());
    }
    if !state.users.has_course(session.role, &session.username, course).await {
        return Err(ApiError::Forbidden(format!("You have no access to '{}'", course)));
    }
    Ok(())
}
