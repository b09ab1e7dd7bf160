//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Rate limiter → 2. Auth validator (protected routes only)

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::assistant::AssistantClient;
use crate::session::SessionStore;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(sessions: SessionStore, assistant: Arc<dyn AssistantClient>) -> Router {
    build_router(ApiContext::new(sessions, assistant))
}

fn build_router(ctx: ApiContext) -> Router {
    // Protected routes — bearer auth + rate limit
    //
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Rate limit → Auth → Handler
    //
    // Extension must be outermost so all middleware can access ApiContext.
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/chat/send", post(endpoints::chat::send))
        .route("/chat/history", get(endpoints::chat::history))
        .route(
            "/checklist",
            get(endpoints::checklist::get).put(endpoints::checklist::update),
        )
        .route("/checklist/reset", post(endpoints::checklist::reset))
        .route("/stats", get(endpoints::stats::get))
        .route("/report", get(endpoints::report::preview))
        .route("/report/pdf", get(endpoints::report::pdf))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes (rate-limited only, no auth required)
    let unprotected = Router::new()
        .route("/auth/login", post(endpoints::auth::login))
        .route("/health", get(endpoints::health::check))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
}
