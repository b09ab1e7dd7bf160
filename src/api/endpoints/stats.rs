//! Session statistics endpoint.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::session::TurnStats;

#[derive(Serialize)]
pub struct StatsResponse {
    pub session_id: String,
    pub stats: TurnStats,
}

/// `GET /api/stats` — per-session turn counters.
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(session_ctx): Extension<SessionContext>,
) -> Result<Json<StatsResponse>, ApiError> {
    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;
    let session = sessions
        .get_mut(&session_ctx.token_hash)
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(StatsResponse {
        session_id: session.id.clone(),
        stats: session.stats,
    }))
}
