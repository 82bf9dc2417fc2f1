use std::ops::Range;

use crate::error::{EngineError, Result};
use crate::storage::Schema;
use crate::types::datatype::DataType;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutColumn {
    /// Table name or alias qualifying the column.
    pub table: String,
    pub name: String,
    /// Declared type when the column comes straight from a table.
    pub dtype: Option<DataType>,
}

/// Column layout of an intermediate relation.
///
/// Joined tables occupy consecutive column ranges; each new range starts at
/// the current width of the layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    columns: Vec<LayoutColumn>,
    ranges: Vec<(String, Range<usize>)>,
}

impl Layout {
    pub fn from_schema(qualifier: &str, schema: &Schema) -> Self {
        let columns: Vec<LayoutColumn> = schema
            .columns
            .iter()
            .map(|c| LayoutColumn {
                table: qualifier.to_string(),
                name: c.name.clone(),
                dtype: Some(c.dtype.clone()),
            })
            .collect();
        let ranges = vec![(qualifier.to_string(), 0..columns.len())];
        Self { columns, ranges }
    }

    pub fn from_columns(qualifier: &str, columns: Vec<LayoutColumn>) -> Self {
        let ranges = vec![(qualifier.to_string(), 0..columns.len())];
        Self { columns, ranges }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[LayoutColumn] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&LayoutColumn> {
        self.columns.get(idx)
    }

    /// Column ranges of each joined table, in join order.
    pub fn ranges(&self) -> &[(String, Range<usize>)] {
        &self.ranges
    }

    /// Appends `right` after the current maximum offset.
    pub fn join(&self, right: &Layout) -> Layout {
        let start = self.ranges.iter().map(|(_, r)| r.end).max().unwrap_or(0);
        let mut columns = self.columns.clone();
        columns.extend(right.columns.iter().cloned());
        let mut ranges = self.ranges.clone();
        for (table, r) in &right.ranges {
            ranges.push((table.clone(), r.start + start..r.end + start));
        }
        Layout { columns, ranges }
    }

    /// Resolves `table.column` exactly or an unqualified name uniquely.
    pub fn resolve(&self, reference: &str, clause: &str) -> Result<usize> {
        if let Some((table, name)) = reference.split_once('.') {
            return self
                .columns
                .iter()
                .position(|c| c.table == table && c.name == name)
                .ok_or_else(|| EngineError::column_not_found(reference, clause));
        }

        let matches: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.name == reference)
            .map(|(i, _)| i)
            .collect();
        match matches.as_slice() {
            [idx] => Ok(*idx),
            [] => Err(EngineError::column_not_found(reference, clause)),
            _ => Err(EngineError::NotFound(format!(
                "Ambiguous column '{reference}' in {clause}. Use qualified name table.column"
            ))),
        }
    }

    /// Bare names for a single-table relation, `table.column` otherwise.
    pub fn output_names(&self) -> Vec<String> {
        let qualify = self.ranges.len() > 1;
        self.columns
            .iter()
            .map(|c| {
                if qualify {
                    format!("{}.{}", c.table, c.name)
                } else {
                    c.name.clone()
                }
            })
            .collect()
    }
}
