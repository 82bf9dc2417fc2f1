//! Structured WHERE clauses as emitted by the SQL front-end.
//!
//! The front-end shape is a nested JSON object keyed by operator:
//! `{"eq": ["id", 1]}`, `{"or": [{..}, {..}]}`, `{"eq": ["name", {"literal": "x"}]}`.
//! Bare strings are column references; `{"literal": ..}` wraps a string constant.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{EngineError, Result};
use crate::types::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Literal {
    /// Raw token handed to the type converter.
    pub fn to_raw(&self) -> String {
        match self {
            Literal::Null => String::new(),
            Literal::Bool(b) => b.to_string(),
            Literal::Int(n) => n.to_string(),
            Literal::Float(f) => f.to_string(),
            Literal::Text(s) => s.clone(),
        }
    }

    /// The literal's own value when no column type applies.
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(n) => Value::Int(*n),
            Literal::Float(f) => Value::Float(*f),
            Literal::Text(s) => Value::Varchar(s.clone()),
        }
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Int(n)
    }
}

impl From<f64> for Literal {
    fn from(f: f64) -> Self {
        Literal::Float(f)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(String),
    Literal(Literal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "JsonValue")]
pub enum WhereClause {
    Compare {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    And(Vec<WhereClause>),
    Or(Vec<WhereClause>),
    Not(Box<WhereClause>),
    /// An operator the engine does not evaluate (`like`, `in`, ...).
    Unsupported(String),
}

impl WhereClause {
    /// `column = literal`
    pub fn eq(column: &str, literal: impl Into<Literal>) -> Self {
        WhereClause::Compare {
            op: CompareOp::Eq,
            left: Operand::Column(column.to_string()),
            right: Operand::Literal(literal.into()),
        }
    }

    pub fn compare(op: CompareOp, column: &str, literal: impl Into<Literal>) -> Self {
        WhereClause::Compare {
            op,
            left: Operand::Column(column.to_string()),
            right: Operand::Literal(literal.into()),
        }
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, WhereClause::Compare { op: CompareOp::Eq, .. })
    }

    /// The `(column, literal)` pair of an equality predicate, either way round.
    pub fn as_column_equality(&self) -> Option<(&str, &Literal)> {
        match self {
            WhereClause::Compare {
                op: CompareOp::Eq,
                left,
                right,
            } => match (left, right) {
                (Operand::Column(c), Operand::Literal(l)) | (Operand::Literal(l), Operand::Column(c)) => {
                    Some((c.as_str(), l))
                }
                _ => None,
            },
            _ => None,
        }
    }

    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let JsonValue::Object(map) = value else {
            return Err(EngineError::Predicate(format!("expected an operator object, got {value}")));
        };
        let mut entries = map.iter();
        let (op, args) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(EngineError::Predicate(format!(
                    "expected exactly one operator, got {value}"
                )));
            }
        };

        let compare = match op.as_str() {
            "eq" => Some(CompareOp::Eq),
            "neq" | "ne" => Some(CompareOp::Neq),
            "lt" => Some(CompareOp::Lt),
            "lte" => Some(CompareOp::Lte),
            "gt" => Some(CompareOp::Gt),
            "gte" => Some(CompareOp::Gte),
            _ => None,
        };
        if let Some(op) = compare {
            return match args.as_array().map(Vec::as_slice) {
                Some([left, right]) => Ok(WhereClause::Compare {
                    op,
                    left: parse_operand(left)?,
                    right: parse_operand(right)?,
                }),
                _ => Err(EngineError::Predicate(format!("'{}' expects two operands", op_name(op)))),
            };
        }

        match op.as_str() {
            "and" | "or" => {
                let items = args
                    .as_array()
                    .ok_or_else(|| EngineError::Predicate(format!("'{op}' expects a list of clauses")))?
                    .iter()
                    .map(WhereClause::from_json)
                    .collect::<Result<Vec<_>>>()?;
                Ok(if op == "and" {
                    WhereClause::And(items)
                } else {
                    WhereClause::Or(items)
                })
            }
            "not" => Ok(WhereClause::Not(Box::new(WhereClause::from_json(args)?))),
            other => Ok(WhereClause::Unsupported(other.to_string())),
        }
    }
}

impl TryFrom<JsonValue> for WhereClause {
    type Error = EngineError;

    fn try_from(value: JsonValue) -> Result<Self> {
        WhereClause::from_json(&value)
    }
}

fn parse_operand(value: &JsonValue) -> Result<Operand> {
    match value {
        JsonValue::String(s) => Ok(Operand::Column(s.clone())),
        JsonValue::Object(map) => match map.get("literal") {
            Some(inner) if map.len() == 1 => parse_literal(inner).map(Operand::Literal),
            _ => Err(EngineError::Predicate(format!("nested expressions are not supported: {value}"))),
        },
        scalar => parse_literal(scalar).map(Operand::Literal),
    }
}

fn parse_literal(value: &JsonValue) -> Result<Literal> {
    match value {
        JsonValue::Null => Ok(Literal::Null),
        JsonValue::Bool(b) => Ok(Literal::Bool(*b)),
        JsonValue::Number(n) => n
            .as_i64()
            .map(Literal::Int)
            .or_else(|| n.as_f64().map(Literal::Float))
            .ok_or_else(|| EngineError::Predicate(format!("unrepresentable number {n}"))),
        JsonValue::String(s) => Ok(Literal::Text(s.clone())),
        other => Err(EngineError::Predicate(format!("unsupported literal {other}"))),
    }
}

fn op_name(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "eq",
        CompareOp::Neq => "neq",
        CompareOp::Lt => "lt",
        CompareOp::Lte => "lte",
        CompareOp::Gt => "gt",
        CompareOp::Gte => "gte",
    }
}
