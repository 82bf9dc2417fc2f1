use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::warn;

use crate::error::{EngineError, Result};
use crate::storage::index::{PrimaryKeyIndex, RowId};
use crate::storage::schema::Schema;
use crate::types::Row;
use crate::types::value::{compare_values, Value};

/// `column = value` against a resolved column position.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMatch {
    pub column: usize,
    pub value: Value,
}

/// A row that bulk load skipped, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based position of the row in the load input.
    pub row_number: usize,
    pub error: EngineError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkLoadReport {
    pub inserted: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Row storage for one table.
///
/// Rows live in an arena keyed by [`RowId`]; the optional primary-key index
/// stores handles into that arena and `row_set` maps each stored row back to
/// its handle. All three are only ever mutated together, by the methods below.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    schema: Schema,
    rows: BTreeMap<RowId, Row>,
    row_set: HashMap<Row, RowId>,
    next_row_id: RowId,
    index: Option<PrimaryKeyIndex>,
    pk_column: Option<usize>,
}

impl Table {
    /// Creates an empty table. The index is built only when requested and the
    /// schema has a single-column primary key.
    pub fn new(name: impl Into<String>, schema: Schema, with_index: bool) -> Self {
        let pk_column = if with_index { schema.single_primary_key() } else { None };
        Self {
            name: name.into(),
            schema,
            rows: BTreeMap::new(),
            row_set: HashMap::new(),
            next_row_id: 0,
            index: pk_column.map(|_| PrimaryKeyIndex::new()),
            pk_column,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn index(&self) -> Option<&PrimaryKeyIndex> {
        self.index.as_ref()
    }

    /// Position of the indexed primary-key column, if the table is indexed.
    pub fn indexed_column(&self) -> Option<usize> {
        self.pk_column
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    pub fn row_ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.keys().copied()
    }

    pub fn get(&self, row_id: RowId) -> Option<&Row> {
        self.rows.get(&row_id)
    }

    /// Point lookup through the primary-key index.
    pub fn lookup(&self, key: &Value) -> Option<(RowId, &Row)> {
        let row_id = self.index.as_ref()?.get(key)?;
        self.rows.get(&row_id).map(|row| (row_id, row))
    }

    /// Appends a row. Nothing is mutated when the call fails.
    pub fn insert(&mut self, row: Row) -> Result<RowId> {
        if row.len() != self.schema.column_count() {
            return Err(EngineError::ValueCount {
                expected: self.schema.column_count(),
                found: row.len(),
            });
        }

        let key = self.primary_key_of(&row);
        if let (Some(index), Some(key)) = (&self.index, &key)
            && index.has(key)
        {
            return Err(EngineError::DuplicateKey {
                table: self.name.clone(),
                key: crate::types::value::value_to_string(key),
            });
        }
        if self.row_set.contains_key(&row) {
            return Err(EngineError::DuplicateRow {
                table: self.name.clone(),
            });
        }

        let row_id = self.next_row_id;
        if let (Some(index), Some(key)) = (self.index.as_mut(), key) {
            index.insert(&self.name, key, row_id)?;
        }
        self.row_set.insert(row.clone(), row_id);
        self.rows.insert(row_id, row);
        self.next_row_id += 1;
        Ok(row_id)
    }

    /// Inserts each row with the same rule as [`Table::insert`], skipping and
    /// recording rows that fail instead of aborting the load.
    pub fn bulk_load(&mut self, rows: impl IntoIterator<Item = Result<Row>>) -> BulkLoadReport {
        let mut report = BulkLoadReport::default();
        for (i, candidate) in rows.into_iter().enumerate() {
            let row_number = i + 1;
            match candidate.and_then(|row| self.insert(row)) {
                Ok(_) => report.inserted += 1,
                Err(error) => {
                    warn!(table = %self.name, row_number, %error, "storage.bulk_load.skip");
                    report.skipped.push(SkippedRow { row_number, error });
                }
            }
        }
        report
    }

    /// Handles of rows matching the predicate; `None` matches every row.
    pub fn matching_row_ids(&self, predicate: Option<&ColumnMatch>) -> Vec<RowId> {
        let Some(m) = predicate else {
            return self.rows.keys().copied().collect();
        };
        if self.pk_column == Some(m.column) {
            return self.lookup(&m.value).map(|(id, _)| vec![id]).unwrap_or_default();
        }
        self.rows
            .iter()
            .filter(|(_, row)| {
                row.get(m.column)
                    .is_some_and(|cell| compare_values(cell, &m.value) == Some(Ordering::Equal))
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// Applies `assignments` in place to every matching row.
    ///
    /// Primary-key columns cannot be assigned. The update is rejected as a
    /// whole if it would leave two structurally equal rows.
    pub fn update(&mut self, assignments: &[(usize, Value)], predicate: Option<&ColumnMatch>) -> Result<usize> {
        for (column, _) in assignments {
            let col = self.schema.columns.get(*column).ok_or_else(|| {
                EngineError::NotFound(format!("Unknown column position {column} in UPDATE"))
            })?;
            if col.primary_key {
                return Err(EngineError::UnsupportedUpdate {
                    column: col.name.clone(),
                });
            }
        }

        let mut updated: BTreeMap<RowId, Row> = BTreeMap::new();
        for row_id in self.matching_row_ids(predicate) {
            let Some(row) = self.rows.get(&row_id) else { continue };
            let mut new_row = row.clone();
            for (column, value) in assignments {
                new_row[*column] = value.clone();
            }
            updated.insert(row_id, new_row);
        }

        // Rows being rewritten no longer hold their old contents.
        let mut rewritten: HashSet<&Row> = HashSet::with_capacity(updated.len());
        for (row_id, new_row) in &updated {
            let clashes_with_kept = self
                .row_set
                .get(new_row)
                .is_some_and(|other| other != row_id && !updated.contains_key(other));
            if clashes_with_kept || !rewritten.insert(new_row) {
                return Err(EngineError::DuplicateRow {
                    table: self.name.clone(),
                });
            }
        }

        let count = updated.len();
        for row_id in updated.keys() {
            if let Some(old) = self.rows.get(row_id) {
                self.row_set.remove(old);
            }
        }
        for (row_id, new_row) in updated {
            self.row_set.insert(new_row.clone(), row_id);
            self.rows.insert(row_id, new_row);
        }
        Ok(count)
    }

    /// Removes every matching row together with its index entry.
    pub fn delete(&mut self, predicate: Option<&ColumnMatch>) -> usize {
        if predicate.is_none() {
            let count = self.rows.len();
            self.rows.clear();
            self.row_set.clear();
            if let Some(index) = self.index.as_mut() {
                index.clear();
            }
            return count;
        }

        let targets = self.matching_row_ids(predicate);
        for row_id in &targets {
            let Some(row) = self.rows.remove(row_id) else { continue };
            self.row_set.remove(&row);
            if let (Some(index), Some(pk)) = (self.index.as_mut(), self.pk_column) {
                index.remove(&row[pk]);
            }
        }
        targets.len()
    }

    fn primary_key_of(&self, row: &Row) -> Option<Value> {
        self.pk_column.and_then(|pk| row.get(pk).cloned())
    }
}
