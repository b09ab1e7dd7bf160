//! Session entry endpoints.
//!
//! `POST /api/auth/login` — Unprotected: exchanges the shared credential
//! pair for a bearer token.
//! `POST /api/auth/logout` — Protected: destroys the session and all its
//! state (checklist, transcript, counters).

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub usuario: String,
    pub contrasena: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// `POST /api/auth/login` — open an operator session.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;

    let token = sessions
        .login(&req.usuario, &req.contrasena)
        .ok_or(ApiError::AccessDenied)?;

    Ok(Json(LoginResponse { token }))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub closed: bool,
}

/// `POST /api/auth/logout` — destroy the current session.
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;

    let closed = sessions.logout(&session.token_hash);
    Ok(Json(LogoutResponse { closed }))
}
