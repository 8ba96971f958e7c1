//! Contact form.

use axum::{http::StatusCode, response::Json};
use tracing::info;

use super::ApiError;
use crate::models::{ContactPayload, ErrorResponse};

/// Send a message to the EdTech team. All fields are required.
#[utoipa::path(
    post,
    path = "/contact",
    request_body = ContactPayload,
    responses(
        (status = 202, description = "Message received"),
        (status = 400, description = "A field is empty", body = ErrorResponse)
    )
)]
pub async fn submit_contact(Json(payload): Json<ContactPayload>) -> Result<StatusCode, ApiError> {
    if [&payload.name, &payload.email, &payload.message]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(ApiError::BadRequest(
            "Please fill out all fields before submitting.".to_string(),
        ));
    }
    info!(name = %payload.name, email = %payload.email, message = %payload.message, "Contact message received");
    Ok(StatusCode::ACCEPTED)
}
