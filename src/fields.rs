//! The report field vocabulary and the per-session field store.
//!
//! The vocabulary is closed: five MARCH checklist steps, five incident
//! metadata fields, three free-text fields. Every key always holds a string
//! value; keys are never added or removed after session start.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Default incident type at session start.
pub const DEFAULT_TIPO_INCIDENTE: &str = "Terrestre";

/// One key of the closed report vocabulary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum FieldKey {
    /// Hemorragia masiva
    #[serde(rename = "M")]
    M,
    /// Vía aérea
    #[serde(rename = "A")]
    A,
    /// Respiración
    #[serde(rename = "R")]
    R,
    /// Circulación
    #[serde(rename = "C")]
    C,
    /// Hipotermia / cabeza
    #[serde(rename = "H")]
    H,
    #[serde(rename = "operador")]
    Operador,
    #[serde(rename = "paciente")]
    Paciente,
    #[serde(rename = "ubicacion")]
    Ubicacion,
    #[serde(rename = "tipo_incidente")]
    TipoIncidente,
    #[serde(rename = "hora")]
    Hora,
    #[serde(rename = "farmaco")]
    Farmaco,
    #[serde(rename = "clima")]
    Clima,
    #[serde(rename = "riesgo")]
    Riesgo,
}

impl FieldKey {
    /// The five MARCH checklist steps, in protocol order.
    pub const CHECKLIST: [FieldKey; 5] =
        [FieldKey::M, FieldKey::A, FieldKey::R, FieldKey::C, FieldKey::H];

    /// Incident metadata fields.
    pub const INFO: [FieldKey; 5] = [
        FieldKey::Operador,
        FieldKey::Paciente,
        FieldKey::Ubicacion,
        FieldKey::TipoIncidente,
        FieldKey::Hora,
    ];

    /// Free-text note fields.
    pub const TEXTOS: [FieldKey; 3] = [FieldKey::Farmaco, FieldKey::Clima, FieldKey::Riesgo];

    /// Every key of the vocabulary.
    pub const ALL: [FieldKey; 13] = [
        FieldKey::M,
        FieldKey::A,
        FieldKey::R,
        FieldKey::C,
        FieldKey::H,
        FieldKey::Operador,
        FieldKey::Paciente,
        FieldKey::Ubicacion,
        FieldKey::TipoIncidente,
        FieldKey::Hora,
        FieldKey::Farmaco,
        FieldKey::Clima,
        FieldKey::Riesgo,
    ];

    /// Key name as it appears in the `UPDATE_DATA:` payload and the API.
    pub fn wire_name(&self) -> &'static str {
        match self {
            FieldKey::M => "M",
            FieldKey::A => "A",
            FieldKey::R => "R",
            FieldKey::C => "C",
            FieldKey::H => "H",
            FieldKey::Operador => "operador",
            FieldKey::Paciente => "paciente",
            FieldKey::Ubicacion => "ubicacion",
            FieldKey::TipoIncidente => "tipo_incidente",
            FieldKey::Hora => "hora",
            FieldKey::Farmaco => "farmaco",
            FieldKey::Clima => "clima",
            FieldKey::Riesgo => "riesgo",
        }
    }

    /// Resolve a wire name back to a key. Unknown names yield `None`.
    pub fn from_wire(name: &str) -> Option<FieldKey> {
        FieldKey::ALL.iter().copied().find(|k| k.wire_name() == name)
    }

    /// Uppercase label used in the flattened report.
    pub fn report_label(&self) -> &'static str {
        match self {
            FieldKey::M => "M",
            FieldKey::A => "A",
            FieldKey::R => "R",
            FieldKey::C => "C",
            FieldKey::H => "H",
            FieldKey::Operador => "OPERADOR",
            FieldKey::Paciente => "PACIENTE",
            FieldKey::Ubicacion => "UBICACION",
            FieldKey::TipoIncidente => "TIPO DE INCIDENTE",
            FieldKey::Hora => "HORA",
            FieldKey::Farmaco => "FARMACO",
            FieldKey::Clima => "CLIMA",
            FieldKey::Riesgo => "RIESGO",
        }
    }
}

/// The session's current checklist/report values.
///
/// Holds exactly one string per vocabulary key. Mutated either by manual
/// operator edits or by the extraction engine after an assistant turn.
/// Memory-resident only; dies with the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldSet {
    values: BTreeMap<FieldKey, String>,
}

impl FieldSet {
    /// Fresh field set with session-start defaults.
    pub fn new() -> Self {
        Self::starting_at(Local::now())
    }

    /// Fresh field set stamped with the given clock. Split out so tests can
    /// pin the `hora` default.
    pub fn starting_at(now: DateTime<Local>) -> Self {
        let mut values = BTreeMap::new();
        for key in FieldKey::ALL {
            let default = match key {
                FieldKey::Hora => now.format("%H:%M").to_string(),
                FieldKey::TipoIncidente => DEFAULT_TIPO_INCIDENTE.to_string(),
                _ => String::new(),
            };
            values.insert(key, default);
        }
        Self { values }
    }

    pub fn get(&self, key: FieldKey) -> &str {
        // Every key is inserted at construction and never removed.
        self.values.get(&key).map(String::as_str).unwrap_or_default()
    }

    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Copy of all keys and values, for rendering and API responses.
    pub fn snapshot(&self) -> BTreeMap<FieldKey, String> {
        self.values.clone()
    }

    /// Restore session-start defaults, re-stamping `hora`.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::new()
    }
}
