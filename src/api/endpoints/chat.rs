//! Chat endpoints.
//!
//! `POST /api/chat/send` — one full assistant turn: query the model, run
//! the extraction & merge engine over its reply, record both sides in the
//! transcript, and return the cleaned reply.
//! `GET /api/chat/history` — the session transcript.

use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::extraction::{self, Extraction};
use crate::fields::FieldKey;
use crate::prompt;
use crate::session::{ChatMessage, ChatRole};

#[derive(Deserialize)]
pub struct ChatSendRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatTurnResponse {
    /// Assistant reply with any structured block stripped, or the failure
    /// message when the backend was unavailable.
    pub reply: String,
    /// Did the backend answer this turn?
    pub assistant_ok: bool,
    /// Did this turn update the checklist?
    pub checklist_updated: bool,
    /// Keys written this turn, in vocabulary order.
    pub updated_fields: Vec<FieldKey>,
}

/// `POST /api/chat/send` — run one assistant turn.
///
/// Upstream failures are part of the normal response shape (`assistant_ok:
/// false` plus an operator-facing message) — the turn is recorded and the
/// checklist stays intact, never a 5xx.
pub async fn send(
    State(ctx): State<ApiContext>,
    Extension(session_ctx): Extension<SessionContext>,
    Json(req): Json<ChatSendRequest>,
) -> Result<Json<ChatTurnResponse>, ApiError> {
    let message = req.message.trim().to_string();
    if message.is_empty() {
        return Err(ApiError::BadRequest("La consulta no puede estar vacía".into()));
    }
    if message.len() > 2000 {
        return Err(ApiError::BadRequest(
            "Consulta demasiado larga (máximo 2000 caracteres)".into(),
        ));
    }

    // The backend client blocks; keep it off the async workers.
    let assistant = Arc::clone(&ctx.assistant);
    let instruction = prompt::system_instruction();
    let query = message.clone();
    let consulted = tokio::task::spawn_blocking(move || assistant.consult(&instruction, &query))
        .await
        .map_err(|e| ApiError::Internal(format!("assistant task failed: {e}")))?;

    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;
    let session = sessions
        .get_mut(&session_ctx.token_hash)
        .ok_or(ApiError::Unauthorized)?;

    session.stats.turns += 1;
    session.push_message(ChatRole::User, message);

    let response = match consulted {
        Ok(raw) => {
            let outcome = extraction::process_reply(&raw, &mut session.fields);
            if outcome.merged() {
                session.stats.merged_turns += 1;
            }
            if matches!(outcome.extraction, Extraction::Malformed(_)) {
                session.stats.extraction_failures += 1;
            }
            session.push_message(ChatRole::Assistant, outcome.cleaned.clone());
            ChatTurnResponse {
                reply: outcome.cleaned,
                assistant_ok: true,
                checklist_updated: outcome.merged(),
                updated_fields: outcome.updated,
            }
        }
        Err(error) => {
            tracing::warn!(%error, session_id = %session_ctx.session_id, "assistant turn failed upstream");
            session.stats.upstream_failures += 1;
            let reply = error.operator_message().to_string();
            session.push_message(ChatRole::Assistant, reply.clone());
            ChatTurnResponse {
                reply,
                assistant_ok: false,
                checklist_updated: false,
                updated_fields: Vec::new(),
            }
        }
    };

    Ok(Json(response))
}

#[derive(Serialize)]
pub struct ChatHistoryResponse {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
}

/// `GET /api/chat/history` — full session transcript.
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(session_ctx): Extension<SessionContext>,
) -> Result<Json<ChatHistoryResponse>, ApiError> {
    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;
    let session = sessions
        .get_mut(&session_ctx.token_hash)
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(ChatHistoryResponse {
        session_id: session.id.clone(),
        messages: session.transcript.clone(),
    }))
}
