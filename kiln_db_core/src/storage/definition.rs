//! Table definitions as handed over by the SQL front-end.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{EngineError, Result};

/// A field that the front-end emits either as a single item or as a list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.clone().into_vec()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: OneOrMany<ColumnDefinition>,
    #[serde(default)]
    pub constraint: Option<OneOrMany<ConstraintDef>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    /// Raw type descriptor, normalized by the schema compiler.
    #[serde(rename = "type", default)]
    pub dtype: Option<JsonValue>,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintDef {
    PrimaryKey {
        columns: OneOrMany<String>,
    },
    ForeignKey {
        columns: OneOrMany<String>,
        references: References,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct References {
    pub table: String,
    pub columns: OneOrMany<String>,
}

impl TableDefinition {
    /// Accepts either the bare definition or the parser's
    /// `{"create table": {...}}` envelope.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let body = value.get("create table").unwrap_or(value);
        serde_json::from_value(body.clone())
            .map_err(|e| EngineError::Schema(format!("Malformed table definition: {e}")))
    }
}
