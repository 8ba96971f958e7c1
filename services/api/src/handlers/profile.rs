//! Profile viewing, editing and course enrollment.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use std::sync::Arc;

use super::{ApiError, authenticate};
use crate::{
    courses::CourseError,
    models::{EnrollPayload, ErrorResponse, Profile, UpdateProfilePayload, UserRole},
    sessions::PortalSession,
    state::AppState,
};

fn require_student(session: &PortalSession) -> Result<(), ApiError> {
    match session.role {
        UserRole::Student => Ok(()),
        UserRole::Teacher => Err(ApiError::Forbidden(
            "Only students can manage enrollments".to_string(),
        )),
    }
}

/// Get the profile of the logged-in user.
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Profile", body = Profile),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    ),
    params(
        ("x-session-token" = String, Header, description = "Session token from login")
    )
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Profile>, ApiError> {
    let session = authenticate(&state, &headers).await?;
    let profile = state.users.profile(session.role, &session.username).await?;
    Ok(Json(profile))
}

/// Update name, email and password of the logged-in user.
#[utoipa::path(
    put,
    path = "/profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = Profile),
        (status = 400, description = "A field is empty", body = ErrorResponse),
        (status = 409, description = "Email used by another account", body = ErrorResponse)
    ),
    params(
        ("x-session-token" = String, Header, description = "Session token from login")
    )
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<Profile>, ApiError> {
    let session = authenticate(&state, &headers).await?;
    let profile = state
        .users
        .update_profile(
            session.role,
            &session.username,
            &payload.name,
            &payload.email,
            &payload.password,
        )
        .await?;
    Ok(Json(profile))
}

/// Enroll the logged-in student in a course.
#[utoipa::path(
    post,
    path = "/profile/enrollments",
    request_body = EnrollPayload,
    responses(
        (status = 200, description = "Enrolled", body = Profile),
        (status = 403, description = "Not a student", body = ErrorResponse),
        (status = 404, description = "Unknown course", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse)
    ),
    params(
        ("x-session-token" = String, Header, description = "Session token from login")
    )
)]
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<EnrollPayload>,
) -> Result<Json<Profile>, ApiError> {
    let session = authenticate(&state, &headers).await?;
    require_student(&session)?;
    if !state.courses.contains(&payload.course).await {
        return Err(CourseError::UnknownCourse(payload.course).into());
    }
    let profile = state.users.enroll(&session.username, &payload.course).await?;
    Ok(Json(profile))
}

/// Remove a course from the logged-in student's enrollments.
#[utoipa::path(
    delete,
    path = "/profile/enrollments/{course}",
    responses(
        (status = 200, description = "Unenrolled", body = Profile),
        (status = 403, description = "Not a student", body = ErrorResponse),
        (status = 404, description = "Not enrolled", body = ErrorResponse)
    ),
    params(
        ("course" = String, Path, description = "Course name"),
        ("x-session-token" = String, Header, description = "Session token from login")
    )
)]
pub async fn unenroll(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(course): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let session = authenticate(&state, &headers).await?;
    require_student(&session)?;
    let profile = state.users.unenroll(&session.username, &course).await?;
    Ok(Json(profile))
}
