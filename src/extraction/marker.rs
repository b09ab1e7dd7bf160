//! Locating the structured-data block inside a model reply.
//!
//! The reply convention places a literal `UPDATE_DATA:` marker followed by a
//! JSON object. Only the first marker occurrence is honored. The payload is
//! the first balanced object after the marker; narrative text after the
//! closing brace belongs to the operator-visible reply. When no balanced
//! object exists (truncated output), the payload runs to end of input.

use std::sync::OnceLock;

use regex::Regex;

/// Literal marker the model is instructed to emit before its data block.
pub const UPDATE_MARKER: &str = "UPDATE_DATA:";

/// A reply split around the marker.
#[derive(Debug, PartialEq)]
pub(crate) struct MarkerSplit<'a> {
    /// Text before the marker.
    pub before: &'a str,
    /// Captured payload span (starts at `{` when a balanced object was found).
    pub payload: &'a str,
    /// Text after the payload. Empty when the payload runs to end of input.
    pub after: &'a str,
}

fn marker_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"UPDATE_DATA:\s*").expect("static pattern"))
}

/// Split a reply at the first marker occurrence. `None` when no marker.
pub(crate) fn split_at_marker(raw: &str) -> Option<MarkerSplit<'_>> {
    let found = marker_pattern().find(raw)?;
    let before = &raw[..found.start()];
    let rest = &raw[found.end()..];

    match balanced_object_len(rest) {
        Some(len) => Some(MarkerSplit {
            before,
            payload: &rest[..len],
            after: &rest[len..],
        }),
        // Truncated or absent object: everything after the marker is payload
        // so no fragment of it can leak into the cleaned text.
        None => Some(MarkerSplit {
            before,
            payload: rest,
            after: "",
        }),
    }
}

/// Byte length of the balanced JSON object at the start of `s`, or `None`.
///
/// Tracks double-quoted strings and escapes so braces inside string values
/// don't unbalance the scan. Single-quoted near-JSON is not string-aware
/// here; it is handled by the relaxed parse attempt downstream.
fn balanced_object_len(s: &str) -> Option<usize> {
    if !s.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}
