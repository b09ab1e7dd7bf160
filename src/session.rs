//! In-memory operator sessions.
//!
//! A session is created by the shared-credential login and holds everything
//! the operator works with: the field store, the chat transcript, and the
//! turn counters. Nothing is persisted — closing the session destroys all of
//! it. Tokens are random bearer strings; only their SHA-256 hash is kept.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::fields::FieldSet;

pub type TokenHash = [u8; 32];

/// Role of a chat transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Per-session counters over assistant turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TurnStats {
    /// Assistant turns attempted, successful or not.
    pub turns: u32,
    /// Turns whose reply updated at least one checklist field.
    pub merged_turns: u32,
    /// Turns with a marker whose payload failed both parse attempts.
    pub extraction_failures: u32,
    /// Turns lost to backend errors (rate limit, connectivity, ...).
    pub upstream_failures: u32,
}

/// One operator's working state.
pub struct Session {
    pub id: String,
    pub fields: FieldSet,
    pub transcript: Vec<ChatMessage>,
    pub stats: TurnStats,
    last_activity: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            fields: FieldSet::new(),
            transcript: Vec::new(),
            stats: TurnStats::default(),
            last_activity: Instant::now(),
        }
    }

    pub fn push_message(&mut self, role: ChatRole, content: impl Into<String>) {
        self.transcript.push(ChatMessage {
            role,
            content: content.into(),
        });
    }
}

/// All live sessions, keyed by token hash.
pub struct SessionStore {
    sessions: HashMap<TokenHash, Session>,
    ttl: Duration,
    usuario: String,
    contrasena: String,
}

impl SessionStore {
    pub fn new(usuario: &str, contrasena: &str, ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
            usuario: usuario.to_string(),
            contrasena: contrasena.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.usuario,
            &config.contrasena,
            Duration::from_secs(config.session_ttl_secs),
        )
    }

    /// Validate the shared credential pair and open a session.
    ///
    /// Returns the bearer token on success; the caller never sees it again.
    pub fn login(&mut self, usuario: &str, contrasena: &str) -> Option<String> {
        if usuario != self.usuario || contrasena != self.contrasena {
            tracing::warn!("login rejected");
            return None;
        }
        self.sweep();

        let token = generate_token();
        let session = Session::new();
        tracing::info!(session_id = %session.id, "operator session opened");
        self.sessions.insert(hash_token(&token), session);
        Some(token)
    }

    /// Resolve a bearer token to a live session, refreshing its activity.
    ///
    /// Expired sessions are swept on the way in, so a stale token can never
    /// resolve.
    pub fn authenticate(&mut self, token: &str) -> Option<(TokenHash, String)> {
        self.sweep();
        let hash = hash_token(token);
        let session = self.sessions.get_mut(&hash)?;
        session.last_activity = Instant::now();
        Some((hash, session.id.clone()))
    }

    pub fn get_mut(&mut self, hash: &TokenHash) -> Option<&mut Session> {
        self.sessions.get_mut(hash)
    }

    /// Destroy a session. Returns whether one existed.
    pub fn logout(&mut self, hash: &TokenHash) -> bool {
        match self.sessions.remove(hash) {
            Some(session) => {
                tracing::info!(session_id = %session.id, "operator session closed");
                true
            }
            None => false,
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn sweep(&mut self) {
        let ttl = self.ttl;
        self.sessions
            .retain(|_, session| session.last_activity.elapsed() < ttl);
    }
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> TokenHash {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldKey;

    fn test_store() -> SessionStore {
        SessionStore::new("ORH2026", "ORH2026", Duration::from_secs(3600))
    }

    #[test]
    fn login_with_shared_credentials_opens_session() {
        let mut store = test_store();
        let token = store.login("ORH2026", "ORH2026").unwrap();
        assert!(!token.is_empty());
        assert_eq!(store.active_sessions(), 1);
    }

    #[test]
    fn login_with_wrong_credentials_is_denied() {
        let mut store = test_store();
        assert!(store.login("ORH2026", "wrong").is_none());
        assert!(store.login("admin", "ORH2026").is_none());
        assert_eq!(store.active_sessions(), 0);
    }

    #[test]
    fn authenticate_resolves_a_live_token() {
        let mut store = test_store();
        let token = store.login("ORH2026", "ORH2026").unwrap();
        let (hash, session_id) = store.authenticate(&token).unwrap();
        assert!(!session_id.is_empty());
        assert!(store.get_mut(&hash).is_some());
    }

    #[test]
    fn authenticate_rejects_unknown_token() {
        let mut store = test_store();
        store.login("ORH2026", "ORH2026").unwrap();
        assert!(store.authenticate("not-a-token").is_none());
    }

    #[test]
    fn expired_sessions_are_swept() {
        let mut store = SessionStore::new("ORH2026", "ORH2026", Duration::from_millis(0));
        let token = store.login("ORH2026", "ORH2026").unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert!(store.authenticate(&token).is_none());
        assert_eq!(store.active_sessions(), 0);
    }

    #[test]
    fn logout_destroys_all_session_state() {
        let mut store = test_store();
        let token = store.login("ORH2026", "ORH2026").unwrap();
        let (hash, _) = store.authenticate(&token).unwrap();

        store.get_mut(&hash).unwrap().fields.set(FieldKey::M, "ok");
        assert!(store.logout(&hash));
        assert!(!store.logout(&hash));
        assert!(store.authenticate(&token).is_none());
    }

    #[test]
    fn sessions_start_with_empty_transcript_and_stats() {
        let mut store = test_store();
        let token = store.login("ORH2026", "ORH2026").unwrap();
        let (hash, _) = store.authenticate(&token).unwrap();
        let session = store.get_mut(&hash).unwrap();
        assert!(session.transcript.is_empty());
        assert_eq!(session.stats, TurnStats::default());
    }

    #[test]
    fn each_login_gets_an_independent_session() {
        let mut store = test_store();
        let t1 = store.login("ORH2026", "ORH2026").unwrap();
        let t2 = store.login("ORH2026", "ORH2026").unwrap();
        assert_ne!(t1, t2);

        let (h1, _) = store.authenticate(&t1).unwrap();
        store.get_mut(&h1).unwrap().fields.set(FieldKey::M, "solo sesión 1");

        let (h2, _) = store.authenticate(&t2).unwrap();
        assert_eq!(store.get_mut(&h2).unwrap().fields.get(FieldKey::M), "");
    }

    #[test]
    fn token_hash_is_deterministic_and_distinct() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
    }
}
