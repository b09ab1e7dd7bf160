//! Folding accepted candidates into the field store.

use crate::fields::{FieldKey, FieldSet};

use super::parser::FieldUpdate;

/// Overwrite stored values with the update's candidates, last write wins.
///
/// Candidates absent from the update leave the stored value untouched, so a
/// placeholder or empty model answer can never erase operator data. Returns
/// the keys written, in vocabulary order.
pub fn apply_update(fields: &mut FieldSet, update: &FieldUpdate) -> Vec<FieldKey> {
    let mut written = Vec::with_capacity(update.len());
    for (key, value) in update.iter() {
        fields.set(key, value);
        written.push(key);
    }
    written
}
