//! Assistant query service — the opaque model backend the advisor talks to.
//!
//! The core only sees the [`AssistantClient`] trait; everything
//! provider-specific stays in the concrete client. Any error here degrades
//! the turn to "no extraction" with an operator-visible message — it never
//! ends the session.

mod gemini;

pub use gemini::{GeminiClient, MockAssistantClient};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssistantError {
    #[error("model backend unreachable at {0}")]
    Connection(String),

    #[error("model request timed out after {0}s")]
    Timeout(u64),

    #[error("model backend rate limit exceeded")]
    RateLimited,

    #[error("model backend returned error (status {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("malformed backend response: {0}")]
    ResponseParsing(String),

    #[error("backend response contained no text")]
    EmptyResponse,
}

impl AssistantError {
    /// Message shown to the operator in place of the assistant's reply.
    pub fn operator_message(&self) -> &'static str {
        match self {
            AssistantError::RateLimited => {
                "Límite de consultas excedido. Espere 60 segundos e intente de nuevo."
            }
            _ => {
                "El asesor no está disponible en este momento. \
                 Intente de nuevo o edite la lista de chequeo manualmente."
            }
        }
    }
}

/// Model backend abstraction (allows mocking).
pub trait AssistantClient: Send + Sync {
    /// One blocking request/response turn.
    fn consult(&self, system_instruction: &str, user_text: &str)
        -> Result<String, AssistantError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_message_tells_the_operator_to_wait() {
        assert!(AssistantError::RateLimited
            .operator_message()
            .contains("60 segundos"));
    }

    #[test]
    fn other_failures_point_to_manual_editing() {
        let err = AssistantError::Connection("http://localhost:9".into());
        assert!(err.operator_message().contains("manualmente"));
        let err = AssistantError::EmptyResponse;
        assert!(err.operator_message().contains("manualmente"));
    }
}
