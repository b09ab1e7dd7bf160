//! Structured extraction & merge engine.
//!
//! Takes one raw assistant reply, locates the embedded `UPDATE_DATA:` block,
//! parses it permissively, folds accepted values into the session's field
//! store, and returns the cleaned reply for display. Parse failures degrade
//! to "no extraction" and are reported as values, never as panics or errors
//! to the caller.

mod marker;
mod merge;
mod parser;

pub use marker::UPDATE_MARKER;
pub use merge::apply_update;
pub use parser::{parse_update, FieldUpdate, PayloadError, SENTINEL};

use crate::fields::{FieldKey, FieldSet};

/// What the engine found in one assistant reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// No marker in the reply. The cleaned text is the input, untouched.
    Absent,
    /// Marker found and the payload parsed into merge candidates.
    Parsed(FieldUpdate),
    /// Marker found but the payload failed both parse attempts. The marker
    /// and payload are still stripped from the cleaned text so raw JSON
    /// fragments never reach the operator.
    Malformed(PayloadError),
}

/// Result of running one assistant reply through the engine.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Reply text with the marker and payload removed.
    pub cleaned: String,
    /// Keys whose stored values were overwritten this turn.
    pub updated: Vec<FieldKey>,
    pub extraction: Extraction,
}

impl TurnOutcome {
    /// Did this turn change the field store?
    pub fn merged(&self) -> bool {
        !self.updated.is_empty()
    }
}

/// Locate and parse the structured block without touching any field store.
pub fn extract(raw: &str) -> (String, Extraction) {
    let Some(split) = marker::split_at_marker(raw) else {
        return (raw.to_string(), Extraction::Absent);
    };

    let cleaned = join_around_marker(split.before, split.after);
    match parser::parse_update(split.payload) {
        Ok(update) => (cleaned, Extraction::Parsed(update)),
        Err(error) => {
            tracing::debug!(%error, "structured payload unparseable, skipping merge");
            (cleaned, Extraction::Malformed(error))
        }
    }
}

/// Full per-turn pipeline: extract, then merge into `fields`.
pub fn process_reply(raw: &str, fields: &mut FieldSet) -> TurnOutcome {
    let (cleaned, extraction) = extract(raw);
    let updated = match &extraction {
        Extraction::Parsed(update) => apply_update(fields, update),
        _ => Vec::new(),
    };
    if !updated.is_empty() {
        tracing::debug!(fields = updated.len(), "checklist updated from assistant turn");
    }
    TurnOutcome {
        cleaned,
        updated,
        extraction,
    }
}

/// Stitch the operator-visible text back together around the removed block.
fn join_around_marker(before: &str, after: &str) -> String {
    let before = before.trim_end();
    let after = after.trim_start();
    match (before.is_empty(), after.is_empty()) {
        (true, _) => after.to_string(),
        (_, true) => before.to_string(),
        _ => format!("{before}\n\n{after}"),
    }
}
