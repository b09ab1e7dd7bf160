//! MARCH checklist endpoints.
//!
//! `GET  /api/checklist` — current field values.
//! `PUT  /api/checklist` — manual operator edits (partial).
//! `POST /api/checklist/reset` — restore session-start defaults.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::fields::FieldKey;

#[derive(Serialize)]
pub struct ChecklistResponse {
    pub fields: BTreeMap<FieldKey, String>,
}

/// `GET /api/checklist` — snapshot of all field values.
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(session_ctx): Extension<SessionContext>,
) -> Result<Json<ChecklistResponse>, ApiError> {
    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;
    let session = sessions
        .get_mut(&session_ctx.token_hash)
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(ChecklistResponse {
        fields: session.fields.snapshot(),
    }))
}

#[derive(Deserialize)]
pub struct ChecklistUpdateRequest {
    pub fields: BTreeMap<String, String>,
}

/// `PUT /api/checklist` — apply manual edits.
///
/// Unlike model output, manual edits are explicit operator input: an
/// unknown key is a typo worth reporting, not forward-compatibility noise,
/// so the whole request is rejected before anything is written. Manual
/// edits may also clear a field — the placeholder rules only guard model
/// merges.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(session_ctx): Extension<SessionContext>,
    Json(req): Json<ChecklistUpdateRequest>,
) -> Result<Json<ChecklistResponse>, ApiError> {
    let mut edits: Vec<(FieldKey, String)> = Vec::with_capacity(req.fields.len());
    for (name, value) in req.fields {
        let key = FieldKey::from_wire(&name)
            .ok_or_else(|| ApiError::BadRequest(format!("Campo desconocido: {name}")))?;
        edits.push((key, value));
    }

    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;
    let session = sessions
        .get_mut(&session_ctx.token_hash)
        .ok_or(ApiError::Unauthorized)?;

    for (key, value) in edits {
        session.fields.set(key, value);
    }

    Ok(Json(ChecklistResponse {
        fields: session.fields.snapshot(),
    }))
}

/// `POST /api/checklist/reset` — restore session-start defaults.
pub async fn reset(
    State(ctx): State<ApiContext>,
    Extension(session_ctx): Extension<SessionContext>,
) -> Result<Json<ChecklistResponse>, ApiError> {
    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;
    let session = sessions
        .get_mut(&session_ctx.token_hash)
        .ok_or(ApiError::Unauthorized)?;

    session.fields.reset();

    Ok(Json(ChecklistResponse {
        fields: session.fields.snapshot(),
    }))
}
