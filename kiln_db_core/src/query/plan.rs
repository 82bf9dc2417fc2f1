//! Query plans as handed over by the SQL front-end.
//!
//! ```json
//! {
//!   "steps": [{
//!     "name": "orders", "alias": "o",
//!     "condition": {"gt": ["o.total", 10]},
//!     "projections": ["o.id", "c.name AS customer"],
//!     "joins": {"customers": {"alias": "c", "source_key": ["o.customer_id"], "join_key": ["c.id"]}}
//!   }],
//!   "order_by": {"column": "o.id"}
//! }
//! ```
//!
//! `joins` may also be a list whose entries carry a `table` field.

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

use crate::error::{EngineError, Result};
use crate::query::join::JoinSide;
use crate::query::where_clause::WhereClause;
use crate::storage::OneOrMany;
use crate::types::Row;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderBy {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanStep {
    /// Table to scan, or the name of an earlier step to continue from.
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub condition: Option<WhereClause>,
    #[serde(default)]
    pub projections: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_joins")]
    pub joins: Vec<JoinStep>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JoinStep {
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub alias: Option<String>,
    /// Residual filter applied right after this join.
    #[serde(default)]
    pub condition: Option<WhereClause>,
    #[serde(deserialize_with = "deserialize_key")]
    pub source_key: Vec<String>,
    #[serde(deserialize_with = "deserialize_key")]
    pub join_key: Vec<String>,
    #[serde(default)]
    pub side: JoinSide,
}

/// Final output of a plan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Plan {
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        Plan::deserialize(value).map_err(|e| EngineError::Execution(format!("malformed plan: {e}")))
    }

    /// Single scan step over `table`.
    pub fn scan(table: &str, condition: Option<WhereClause>) -> Self {
        Plan {
            steps: vec![PlanStep::new(table).with_condition(condition)],
            order_by: None,
        }
    }
}

impl PlanStep {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
            condition: None,
            projections: None,
            joins: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: Option<WhereClause>) -> Self {
        self.condition = condition;
        self
    }

    /// Name the step's columns are qualified with.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl JoinStep {
    pub fn inner(table: &str, source_key: &[&str], join_key: &[&str]) -> Self {
        Self {
            table: table.to_string(),
            alias: None,
            condition: None,
            source_key: source_key.iter().map(|s| s.to_string()).collect(),
            join_key: join_key.iter().map(|s| s.to_string()).collect(),
            side: JoinSide::Inner,
        }
    }

    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

fn deserialize_key<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    OneOrMany::<String>::deserialize(deserializer).map(OneOrMany::into_vec)
}

/// Accepts `{table: {..}}` in declaration order, or a list of entries.
fn deserialize_joins<'de, D>(deserializer: D) -> std::result::Result<Vec<JoinStep>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Ok(Vec::new()),
        JsonValue::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
            .collect(),
        JsonValue::Object(map) => map
            .into_iter()
            .map(|(table, body)| {
                let mut step: JoinStep = serde_json::from_value(body).map_err(D::Error::custom)?;
                if step.table.is_empty() {
                    step.table = table;
                }
                Ok(step)
            })
            .collect(),
        other => Err(D::Error::custom(format!("joins must be a map or a list, got {other}"))),
    }
}
