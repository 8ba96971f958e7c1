//! AI tutor chat handlers (students only).

use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
};
use edtech_core::{conversation::TutorSession, responder::TutorReply};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{Instrument, info_span, warn};

use super::{ApiError, authenticate};
use crate::{
    models::{ChatPayload, ChatResponse, ChatTurn, ErrorResponse},
    sessions::PortalSession,
    state::AppState,
};

/// Shown when the provider could not produce a reply, so the student can retry.
pub const NO_REPLY_MESSAGE: &str = "No reply available from the tutor. Please try again.";

fn tutor_conversation(session: &PortalSession) -> Result<&Mutex<TutorSession>, ApiError> {
    session
        .tutor
        .as_ref()
        .ok_or_else(|| ApiError::Forbidden("Only students can use the AI tutor".to_string()))
}

/// Ask the tutor a question.
///
/// The question is classified against the BAC Math/Physics/Science
/// curriculum first; in-scope questions are answered with the conversation
/// so far as context, anything else gets a polite redirect.
#[utoipa::path(
    post,
    path = "/tutor/messages",
    request_body = ChatPayload,
    responses(
        (status = 200, description = "Tutor reply", body = ChatResponse),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 403, description = "Not a student", body = ErrorResponse),
        (status = 502, description = "No reply available from the provider", body = ErrorResponse)
    ),
    params(
        ("x-session-token" = String, Header, description = "Session token from login")
    )
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<ChatPayload>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session = authenticate(&state, &headers).await?;
    let conversation = tutor_conversation(&session)?;
    if payload.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Message must not be empty".to_string()));
    }

    let span = info_span!("tutor_message", username = %session.username);
    let turn = async {
        // Held across both provider calls so messages on one session serialize.
        let mut conversation = conversation.lock().await;
        state.tutor.ask(&mut conversation, &payload.text).await
    }
    .instrument(span)
    .await;

    match turn.reply {
        TutorReply::Reply(reply) => Ok(Json(ChatResponse {
            in_scope: turn.in_scope,
            reply,
        })),
        TutorReply::NoReply(failure) => {
            warn!(username = %session.username, error = %failure, "Tutor produced no reply");
            Err(ApiError::BadGateway(NO_REPLY_MESSAGE.to_string()))
        }
    }
}

/// Get the visible tutoring conversation of the current session.
#[utoipa::path(
    get,
    path = "/tutor/history",
    responses(
        (status = 200, description = "Conversation so far", body = [ChatTurn]),
        (status = 403, description = "Not a student", body = ErrorResponse)
    ),
    params(
        ("x-session-token" = String, Header, description = "Session token from login")
    )
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ChatTurn>>, ApiError> {
    let session = authenticate(&state, &headers).await?;
    let conversation = tutor_conversation(&session)?.lock().await;
    Ok(Json(
        conversation.visible_turns().iter().map(ChatTurn::from).collect(),
    ))
}
