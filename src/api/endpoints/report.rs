//! Report endpoints.
//!
//! `GET /api/report` — flattened plain-text preview.
//! `GET /api/report/pdf` — downloadable PDF document.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Local;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::report;

#[derive(Serialize)]
pub struct ReportPreviewResponse {
    pub report: String,
    pub generated_at: String,
}

/// `GET /api/report` — plain-text report preview.
pub async fn preview(
    State(ctx): State<ApiContext>,
    Extension(session_ctx): Extension<SessionContext>,
) -> Result<Json<ReportPreviewResponse>, ApiError> {
    let snapshot = {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        sessions
            .get_mut(&session_ctx.token_hash)
            .ok_or(ApiError::Unauthorized)?
            .fields
            .snapshot()
    };

    let now = Local::now();
    Ok(Json(ReportPreviewResponse {
        report: report::render_text(&snapshot, now),
        generated_at: now.to_rfc3339(),
    }))
}

/// `GET /api/report/pdf` — PDF download.
pub async fn pdf(
    State(ctx): State<ApiContext>,
    Extension(session_ctx): Extension<SessionContext>,
) -> Result<Response, ApiError> {
    let snapshot = {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        sessions
            .get_mut(&session_ctx.token_hash)
            .ok_or(ApiError::Unauthorized)?
            .fields
            .snapshot()
    };

    let bytes = report::render_pdf(&snapshot, Local::now())?;
    tracing::info!(
        session_id = %session_ctx.session_id,
        size = bytes.len(),
        "report PDF exported"
    );

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report::PDF_FILENAME),
        ),
    ];
    Ok((headers, bytes).into_response())
}
