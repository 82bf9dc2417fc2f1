use crate::error::{EngineError, Result};
use crate::types::datatype::DataType;
use crate::types::value::{convert_value, Value};

/// Target of a single-column foreign-key reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
}

/// Represents a single column in a table schema
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: DataType,
    pub nullable: bool,
    pub primary_key: bool,
    pub foreign_key: Option<ForeignKeyRef>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
            nullable: true,
            primary_key: false,
            foreign_key: None,
        }
    }

    /// Converts a raw token into a value for this column.
    pub fn convert(&self, raw: &str) -> Result<Value> {
        convert_value(raw, &self.dtype, self.nullable, self.primary_key)
            .map_err(|e| e.for_column(&self.name))
    }
}

/// Represents the schema of a table; column order defines row tuple order
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Returns the number of columns in this schema
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    /// Position of the primary-key column when the key is exactly one column.
    pub fn single_primary_key(&self) -> Option<usize> {
        let mut positions = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.primary_key)
            .map(|(i, _)| i);
        match (positions.next(), positions.next()) {
            (Some(i), None) => Some(i),
            _ => None,
        }
    }

    /// Resolves a column reference, accepting an optional `table.` qualifier.
    pub fn resolve(&self, table: &str, reference: &str) -> Option<usize> {
        let name = match reference.split_once('.') {
            Some((qualifier, col)) if qualifier == table => col,
            Some(_) => return None,
            None => reference,
        };
        self.column_index(name)
    }

    /// Converts an ordered list of raw tokens into a row.
    pub fn convert_row<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<Value>> {
        if values.len() != self.column_count() {
            return Err(EngineError::ValueCount {
                expected: self.column_count(),
                found: values.len(),
            });
        }
        self.columns
            .iter()
            .zip(values)
            .map(|(col, raw)| col.convert(raw.as_ref()))
            .collect()
    }
}
