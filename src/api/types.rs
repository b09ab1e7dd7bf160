//! Shared types for the API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::assistant::AssistantClient;
use crate::session::{SessionStore, TokenHash};

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub sessions: Arc<Mutex<SessionStore>>,
    pub assistant: Arc<dyn AssistantClient>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    pub fn new(sessions: SessionStore, assistant: Arc<dyn AssistantClient>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(sessions)),
            assistant,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new())),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Session context — injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated session context, injected into request extensions by the
/// auth middleware after successful token validation.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token_hash: TokenHash,
    pub session_id: String,
}

// ═══════════════════════════════════════════════════════════
// Rate limiter — per-source sliding window
// ═══════════════════════════════════════════════════════════

/// Per-source rate limiter with per-minute and per-hour limits.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
    per_hour: u32,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
            per_minute: 60,
            per_hour: 600,
        }
    }

    /// Check if a source is within rate limits. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, source: &str) -> Result<(), u64> {
        let now = Instant::now();
        let entries = self.windows.entry(source.to_string()).or_default();

        // Clean entries older than 1 hour
        entries.retain(|ts| now.duration_since(*ts) < Duration::from_secs(3600));

        // Check per-minute
        let last_minute = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < Duration::from_secs(60))
            .count() as u32;
        if last_minute >= self.per_minute {
            return Err(60);
        }

        // Check per-hour
        if entries.len() as u32 >= self.per_hour {
            return Err(3600);
        }

        entries.push(now);
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limiter_allows_under_limit() {
        let mut limiter = RateLimiter::new();
        assert!(limiter.check("source-1").is_ok());
        assert!(limiter.check("source-1").is_ok());
    }

    #[test]
    fn rate_limiter_rejects_over_per_minute() {
        let mut limiter = RateLimiter {
            windows: HashMap::new(),
            per_minute: 2,
            per_hour: 1000,
        };
        assert!(limiter.check("source-1").is_ok());
        assert!(limiter.check("source-1").is_ok());
        assert_eq!(limiter.check("source-1"), Err(60));
    }

    #[test]
    fn rate_limiter_isolates_sources() {
        let mut limiter = RateLimiter {
            windows: HashMap::new(),
            per_minute: 1,
            per_hour: 1000,
        };
        assert!(limiter.check("source-1").is_ok());
        assert!(limiter.check("source-2").is_ok());
        assert_eq!(limiter.check("source-1"), Err(60));
    }

    #[test]
    fn rate_limiter_rejects_over_per_hour() {
        let mut limiter = RateLimiter {
            windows: HashMap::new(),
            per_minute: 1000,
            per_hour: 3,
        };
        for _ in 0..3 {
            assert!(limiter.check("source-1").is_ok());
        }
        assert_eq!(limiter.check("source-1"), Err(3600));
    }
}
