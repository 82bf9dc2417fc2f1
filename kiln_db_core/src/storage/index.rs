use std::collections::BTreeMap;

use crate::error::{EngineError, Result};
use crate::types::value::{value_to_string, Value};

/// Stable handle of a row inside its table. Handles grow monotonically, so
/// ordering by handle is insertion order.
pub type RowId = u64;

/// Ordered primary-key index over a single-column key.
///
/// The index maps a key to the handle of the row stored in the owning
/// [`Table`](crate::storage::Table); the row itself lives only in the table,
/// so an in-place update is visible through both views.
#[derive(Debug, Clone, Default)]
pub struct PrimaryKeyIndex {
    entries: BTreeMap<Value, RowId>,
}

impl PrimaryKeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &Value) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &Value) -> Option<RowId> {
        self.entries.get(key).copied()
    }

    /// Fails if the key is already present; the index is left untouched.
    pub fn insert(&mut self, table: &str, key: Value, row_id: RowId) -> Result<()> {
        if self.entries.contains_key(&key) {
            return Err(EngineError::DuplicateKey {
                table: table.to_string(),
                key: value_to_string(&key),
            });
        }
        self.entries.insert(key, row_id);
        Ok(())
    }

    pub fn remove(&mut self, key: &Value) -> Option<RowId> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, RowId)> {
        self.entries.iter().map(|(k, id)| (k, *id))
    }
}
