//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers::{auth, contact, courses, profile, tutor},
    models::{
        ChatPayload, ChatResponse, ChatTurn, ContactPayload, CourseSummary, EnrollPayload,
        ErrorResponse, LoginPayload, LoginResponse, MaterialFolder, Profile, RegisterPayload,
        UpdateDescriptionPayload, UpdateProfilePayload, UserRole,
    },
    state::AppState,
};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Largest accepted PDF upload.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::register,
        auth::logout,
        profile::get_profile,
        profile::update_profile,
        profile::enroll,
        profile::unenroll,
        courses::list_courses,
        courses::update_description,
        courses::list_materials,
        courses::download_file,
        courses::upload_file,
        courses::delete_file,
        tutor::send_message,
        tutor::get_history,
        contact::submit_contact,
    ),
    components(
        schemas(
            UserRole, LoginPayload, LoginResponse, RegisterPayload, Profile, UpdateProfilePayload,
            EnrollPayload, CourseSummary, UpdateDescriptionPayload, MaterialFolder, ChatPayload,
            ChatResponse, ChatTurn, ContactPayload, ErrorResponse
        )
    ),
    tags(
        (name = "EdTech API", description = "Course portal and BAC curriculum AI tutor")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/profile/enrollments", post(profile::enroll))
        .route("/profile/enrollments/{course}", delete(profile::unenroll))
        .route("/courses", get(courses::list_courses))
        .route(
            "/courses/{course}/description",
            put(courses::update_description),
        )
        .route("/courses/{course}/materials", get(courses::list_materials))
        .route(
            "/courses/{course}/files/{*path}",
            get(courses::download_file)
                .put(courses::upload_file)
                .delete(courses::delete_file)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/tutor/messages", post(tutor::send_message))
        .route("/tutor/history", get(tutor::get_history))
        .route("/contact", post(contact::submit_contact))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
        .layer(TraceLayer::new_for_http())
}
