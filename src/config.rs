//! Service identity constants and environment-driven configuration.

use std::net::SocketAddr;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Asesor AME";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Organization identity printed on every report.
pub const ORGANIZACION: &str = "ORGANIZACIÓN RESCATE HUMBOLDT";
/// Motto closing every report.
pub const LEMA: &str =
    "\"No solo es querer salvar, sino saber salvar\" Organización Rescate Humboldt.";
/// Property/signature tag of the advisory system.
pub const FIRMA: &str = "ALLH-ORH:2026";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8750";
const DEFAULT_BACKEND_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 3600;
const DEFAULT_USUARIO: &str = "ORH2026";
const DEFAULT_CONTRASENA: &str = "ORH2026";

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the API server binds to.
    pub bind_addr: SocketAddr,
    /// Base URL of the model backend.
    pub backend_url: String,
    /// API key for the model backend. May be empty — the service still
    /// starts and every assistant turn degrades to an upstream failure.
    pub api_key: String,
    /// Model identifier sent to the backend.
    pub model: String,
    /// Per-request timeout for assistant calls.
    pub request_timeout_secs: u64,
    /// Shared operator credential pair.
    pub usuario: String,
    pub contrasena: String,
    /// Sessions are dropped after this much inactivity.
    pub session_ttl_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address {0:?}")]
    InvalidBindAddr(String),
    #[error("invalid value {value:?} for {name}")]
    InvalidNumber { name: &'static str, value: String },
}

impl Config {
    /// Resolve configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration from an arbitrary variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = lookup("AME_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr(bind))?;

        let api_key = lookup("GENAI_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("GENAI_API_KEY is not set; assistant turns will fail upstream");
        }

        Ok(Self {
            bind_addr,
            backend_url: lookup("GENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            api_key,
            model: lookup("GENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            request_timeout_secs: parse_secs(&lookup, "GENAI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            usuario: lookup("AME_USUARIO").unwrap_or_else(|| DEFAULT_USUARIO.to_string()),
            contrasena: lookup("AME_CONTRASENA")
                .unwrap_or_else(|| DEFAULT_CONTRASENA.to_string()),
            session_ttl_secs: parse_secs(
                &lookup,
                "AME_SESSION_TTL_SECS",
                DEFAULT_SESSION_TTL_SECS,
            )?,
        })
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
    }
}

/// Default `RUST_LOG`-style filter when the environment provides none.
pub fn default_log_filter() -> String {
    "asesor_ame=info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_env(_name: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let config = Config::from_lookup(empty_env).unwrap();
        assert_eq!(config.bind_addr.port(), 8750);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.usuario, "ORH2026");
        assert_eq!(config.contrasena, "ORH2026");
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.session_ttl_secs, 8 * 3600);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn env_overrides_are_honored() {
        let config = Config::from_lookup(|name| match name {
            "AME_BIND_ADDR" => Some("0.0.0.0:9000".into()),
            "GENAI_API_KEY" => Some("k-123".into()),
            "GENAI_MODEL" => Some("gemini-2.5-pro".into()),
            "AME_USUARIO" => Some("brigada7".into()),
            "GENAI_TIMEOUT_SECS" => Some("15".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:9000");
        assert_eq!(config.api_key, "k-123");
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.usuario, "brigada7");
        assert_eq!(config.contrasena, "ORH2026");
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let result = Config::from_lookup(|name| {
            (name == "AME_BIND_ADDR").then(|| "not-an-addr".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidBindAddr(_))));
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let result = Config::from_lookup(|name| {
            (name == "GENAI_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidNumber { name: "GENAI_TIMEOUT_SECS", .. })
        ));
    }

    #[test]
    fn identity_constants() {
        assert_eq!(FIRMA, "ALLH-ORH:2026");
        assert!(LEMA.contains("saber salvar"));
        assert_eq!(APP_NAME, "Asesor AME");
    }
}
