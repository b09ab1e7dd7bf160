//! HTTP API layer.
//!
//! Exposes the advisor to the operator's single-page form as JSON endpoints
//! nested under `/api/`, protected by a middleware stack: Rate Limit →
//! Auth → Handler.
//!
//! The router is composable — `api_router()` returns a `Router` that can be
//! mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, ApiServer};
pub use types::ApiContext;
