//! Course catalog and course material handlers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{ApiError, authenticate, require_course_access, require_teacher_of};
use crate::{
    models::{CourseSummary, ErrorResponse, MaterialFolder, UpdateDescriptionPayload},
    state::AppState,
};

/// List all courses with their descriptions.
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "All courses", body = [CourseSummary]),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    ),
    params(
        ("x-session-token" = String, Header, description = "Session token from login")
    )
)]
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<CourseSummary>>, ApiError> {
    authenticate(&state, &headers).await?;
    Ok(Json(state.courses.list().await))
}

/// Replace a course description (teacher of the course only).
#[utoipa::path(
    put,
    path = "/courses/{course}/description",
    request_body = UpdateDescriptionPayload,
    responses(
        (status = 200, description = "Description updated", body = CourseSummary),
        (status = 403, description = "Not the course teacher", body = ErrorResponse),
        (status = 404, description = "Unknown course", body = ErrorResponse)
    ),
    params(
        ("course" = String, Path, description = "Course name"),
        ("x-session-token" = String, Header, description = "Session token from login")
    )
)]
pub async fn update_description(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(course): Path<String>,
    Json(payload): Json<UpdateDescriptionPayload>,
) -> Result<Json<CourseSummary>, ApiError> {
    let session = authenticate(&state, &headers).await?;
    require_teacher_of(&state, &session, &course).await?;
    let summary = state
        .courses
        .update_description(&course, &payload.description)
        .await?;
    Ok(Json(summary))
}

/// List the folders and PDFs of a course.
#[utoipa::path(
    get,
    path = "/courses/{course}/materials",
    responses(
        (status = 200, description = "Course folders", body = [MaterialFolder]),
        (status = 403, description = "Not enrolled in or teaching the course", body = ErrorResponse),
        (status = 404, description = "Unknown course", body = ErrorResponse)
    ),
    params(
        ("course" = String, Path, description = "Course name"),
        ("x-session-token" = String, Header, description = "Session token from login")
    )
)]
pub async fn list_materials(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(course): Path<String>,
) -> Result<Json<Vec<MaterialFolder>>, ApiError> {
    let session = authenticate(&state, &headers).await?;
    require_course_access(&state, &session, &course).await?;
    Ok(Json(state.courses.list_materials(&course).await?))
}

/// Download a course PDF.
#[utoipa::path(
    get,
    path = "/courses/{course}/files/{path}",
    responses(
        (status = 200, description = "PDF content", content_type = "application/pdf"),
        (status = 400, description = "Invalid path", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    ),
    params(
        ("course" = String, Path, description = "Course name"),
        ("path" = String, Path, description = "PDF path relative to the course directory"),
        ("x-session-token" = String, Header, description = "Session token from login")
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((course, path)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let session = authenticate(&state, &headers).await?;
    require_course_access(&state, &session, &course).await?;
    let bytes = state.courses.read_pdf(&course, &path).await?;
    Ok(([(header::CONTENT_TYPE, "application/pdf")], bytes))
}

/// Upload a PDF into an existing folder of a course (teacher of the course only).
#[utoipa::path(
    put,
    path = "/courses/{course}/files/{path}",
    request_body(content = Vec<u8>, content_type = "application/pdf"),
    responses(
        (status = 201, description = "PDF stored"),
        (status = 400, description = "Invalid path", body = ErrorResponse),
        (status = 403, description = "Not the course teacher", body = ErrorResponse),
        (status = 404, description = "Folder not found", body = ErrorResponse)
    ),
    params(
        ("course" = String, Path, description = "Course name"),
        ("path" = String, Path, description = "PDF path relative to the course directory"),
        ("x-session-token" = String, Header, description = "Session token from login")
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((course, path)): Path<(String, String)>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let session = authenticate(&state, &headers).await?;
    require_teacher_of(&state, &session, &course).await?;
    state.courses.write_pdf(&course, &path, &body).await?;
    Ok(StatusCode::CREATED)
}

/// Delete a course PDF (teacher of the course only).
#[utoipa::path(
    delete,
    path = "/courses/{course}/files/{path}",
    responses(
        (status = 204, description = "PDF deleted"),
        (status = 403, description = "Not the course teacher", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    ),
    params(
        ("course" = String, Path, description = "Course name"),
        ("path" = String, Path, description = "PDF path relative to the course directory"),
        ("x-session-token" = String, Header, description = "Session token from login")
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((course, path)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let session = authenticate(&state, &headers).await?;
    require_teacher_of(&state, &session, &course).await?;
    state.courses.delete_pdf(&course, &path).await?;
    Ok(StatusCode::NO_CONTENT)
}
