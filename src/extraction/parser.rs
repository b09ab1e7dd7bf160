//! Parsing a captured payload into a typed partial update.
//!
//! Strict JSON first; on failure a single repair is attempted by treating
//! single quotes as double quotes. The repair is lossy (an apostrophe inside
//! a value breaks it) and exists only because the model occasionally emits
//! Python-style dicts.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::fields::FieldKey;

/// Placeholder the model emits for fields it has no information about.
/// Never accepted as a real value.
pub const SENTINEL: &str = "...";

/// Recognized top-level payload groups and their sub-keys.
const GROUPS: [(&str, &[FieldKey]); 3] = [
    ("march", &FieldKey::CHECKLIST),
    ("info", &FieldKey::INFO),
    ("textos", &FieldKey::TEXTOS),
];

/// A typed partial update: the accepted merge candidates of one payload.
///
/// Sentinel and empty values are already dropped; absent means "leave the
/// stored value alone".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate {
    entries: BTreeMap<FieldKey, String>,
}

impl FieldUpdate {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Both parse attempts failed. Carries each attempt's error text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("payload is not valid JSON (strict: {strict}; relaxed: {relaxed})")]
pub struct PayloadError {
    pub strict: String,
    pub relaxed: String,
}

/// Parse a payload span into the accepted merge candidates.
pub fn parse_update(payload: &str) -> Result<FieldUpdate, PayloadError> {
    let value = match serde_json::from_str::<Value>(payload) {
        Ok(value) => value,
        Err(strict) => {
            let repaired = relax_quotes(payload);
            match serde_json::from_str::<Value>(&repaired) {
                Ok(value) => value,
                Err(relaxed) => {
                    return Err(PayloadError {
                        strict: strict.to_string(),
                        relaxed: relaxed.to_string(),
                    })
                }
            }
        }
    };

    Ok(collect_known_fields(&value))
}

/// Walk the recognized groups and keep only acceptable candidates.
///
/// Unknown groups, unknown sub-keys, and non-string values are ignored
/// without error. A candidate is accepted only if it is a non-empty,
/// non-sentinel string.
fn collect_known_fields(value: &Value) -> FieldUpdate {
    let mut update = FieldUpdate::default();
    for (group, keys) in GROUPS {
        let Some(object) = value.get(group).and_then(Value::as_object) else {
            continue;
        };
        for key in keys {
            let Some(candidate) = object.get(key.wire_name()).and_then(Value::as_str) else {
                continue;
            };
            if candidate.trim().is_empty() || candidate.trim() == SENTINEL {
                continue;
            }
            update.entries.insert(*key, candidate.to_string());
        }
    }
    update
}

/// Best-effort repair for single-quoted near-JSON.
fn relax_quotes(payload: &str) -> String {
    payload.replace('\'', "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_json_payload() {
        let update = parse_update(
            r#"{"march": {"M": "torniquete aplicado", "A": "permeable"}}"#,
        )
        .unwrap();
        assert_eq!(update.get(FieldKey::M), Some("torniquete aplicado"));
        assert_eq!(update.get(FieldKey::A), Some("permeable"));
        assert_eq!(update.len(), 2);
    }

    #[test]
    fn single_quoted_payload_matches_double_quoted() {
        let double = parse_update(r#"{"march": {"M": "vendaje compresivo"}}"#).unwrap();
        let single = parse_update(r#"{'march': {'M': 'vendaje compresivo'}}"#).unwrap();
        assert_eq!(double, single);
    }

    #[test]
    fn sentinel_values_are_dropped() {
        let update = parse_update(
            r#"{"march": {"M": "torniquete", "A": "...", "R": ""}}"#,
        )
        .unwrap();
        assert_eq!(update.get(FieldKey::M), Some("torniquete"));
        assert_eq!(update.get(FieldKey::A), None);
        assert_eq!(update.get(FieldKey::R), None);
    }

    #[test]
    fn unknown_groups_and_keys_are_ignored() {
        let update = parse_update(
            r#"{"march": {"M": "ok", "X": "??"}, "extras": {"M": "no"}, "info": {"operador": "Luz"}}"#,
        )
        .unwrap();
        assert_eq!(update.len(), 2);
        assert_eq!(update.get(FieldKey::M), Some("ok"));
        assert_eq!(update.get(FieldKey::Operador), Some("Luz"));
    }

    #[test]
    fn non_string_values_are_ignored() {
        let update = parse_update(r#"{"march": {"M": 5, "A": null, "R": ["x"]}}"#).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn all_three_groups_collected() {
        let update = parse_update(
            r#"{"march": {"H": "manta térmica"},
                "info": {"ubicacion": "Pico Oriental", "tipo_incidente": "Montaña"},
                "textos": {"riesgo": "caída de rocas"}}"#,
        )
        .unwrap();
        assert_eq!(update.get(FieldKey::H), Some("manta térmica"));
        assert_eq!(update.get(FieldKey::Ubicacion), Some("Pico Oriental"));
        assert_eq!(update.get(FieldKey::TipoIncidente), Some("Montaña"));
        assert_eq!(update.get(FieldKey::Riesgo), Some("caída de rocas"));
    }

    #[test]
    fn malformed_payload_reports_both_attempts() {
        let err = parse_update(r#"{"march": {"#).unwrap_err();
        assert!(!err.strict.is_empty());
        assert!(!err.relaxed.is_empty());
    }

    #[test]
    fn apostrophe_inside_value_defeats_the_repair() {
        // Known weakness of the quote relaxation: the apostrophe terminates
        // the string early and the payload stays unparseable.
        let result = parse_update(r#"{'info': {'paciente': "O'Brien"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn top_level_non_object_yields_empty_update() {
        let update = parse_update(r#"[1, 2, 3]"#).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn whitespace_padded_sentinel_is_still_dropped() {
        let update = parse_update(r#"{"march": {"M": " ... "}}"#).unwrap();
        assert!(update.is_empty());
    }
}
