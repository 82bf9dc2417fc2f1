use thiserror::Error;

use crate::types::datatype::DataType;

/// Every failure the engine reports to its callers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Duplicate table, missing type, missing primary key, malformed constraint.
    #[error("schema error: {0}")]
    Schema(String),

    #[error("cannot convert '{value}' to {dtype}: {reason}")]
    TypeConversion {
        value: String,
        dtype: DataType,
        reason: String,
    },

    #[error("null value violates not-null constraint{}", column_suffix(.column))]
    NullConstraint { column: Option<String> },

    #[error("duplicate primary key {key} in table '{table}'")]
    DuplicateKey { table: String, key: String },

    #[error("duplicate row in table '{table}'")]
    DuplicateRow { table: String },

    #[error("expected {expected} values but got {found}")]
    ValueCount { expected: usize, found: usize },

    /// Unknown table or column reference.
    #[error("{0}")]
    NotFound(String),

    /// Unsupported WHERE shape where only equality is accepted.
    #[error("unsupported predicate: {0}")]
    Predicate(String),

    #[error("updating primary key column '{column}' is not supported")]
    UnsupportedUpdate { column: String },

    /// Incomparable or type-mismatched join keys.
    #[error("join error: {0}")]
    Join(String),

    /// Malformed plan handed to the step executor.
    #[error("execution error: {0}")]
    Execution(String),
}

impl EngineError {
    pub(crate) fn table_not_found(table: &str) -> Self {
        EngineError::NotFound(format!("Table '{table}' does not exist"))
    }

    pub(crate) fn column_not_found(column: &str, clause: &str) -> Self {
        EngineError::NotFound(format!("Unknown column '{column}' in {clause}"))
    }

    /// Attaches the column name to a conversion failure.
    pub(crate) fn for_column(self, name: &str) -> Self {
        match self {
            EngineError::NullConstraint { column: None } => EngineError::NullConstraint {
                column: Some(name.to_string()),
            },
            other => other,
        }
    }
}

fn column_suffix(column: &Option<String>) -> String {
    column
        .as_ref()
        .map(|c| format!(" on column '{c}'"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, EngineError>;
