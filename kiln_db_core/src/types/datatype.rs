use std::fmt;

use serde_json::Value as JsonValue;

use crate::error::{EngineError, Result};

/// Largest precision an exact in-memory decimal can carry.
pub const MAX_DECIMAL_PRECISION: u32 = 28;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Int,
    Float,
    Boolean,
    Varchar,
    Decimal { precision: u32, scale: u32 },
}

impl DataType {
    /// Same family of values, ignoring decimal precision/scale.
    pub fn same_kind(&self, other: &DataType) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "int"),
            DataType::Float => write!(f, "float"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Varchar => write!(f, "varchar"),
            DataType::Decimal { precision, scale } => write!(f, "decimal({precision},{scale})"),
        }
    }
}

/// Normalizes a front-end type descriptor into a [`DataType`].
///
/// Accepts either a bare name (`"int"`) or a single-key object whose key is the
/// type name and whose value carries its arguments (`{"varchar": 255}`,
/// `{"decimal": [5, 2]}`).
pub fn parse_datatype(descriptor: &JsonValue) -> Result<DataType> {
    match descriptor {
        JsonValue::String(name) => datatype_from_name(name, &JsonValue::Null),
        JsonValue::Object(map) => {
            let mut entries = map.iter();
            match (entries.next(), entries.next()) {
                (Some((name, args)), None) => datatype_from_name(name, args),
                _ => Err(EngineError::Schema(format!(
                    "Type descriptor must name exactly one type: {descriptor}"
                ))),
            }
        }
        other => Err(EngineError::Schema(format!("Invalid type descriptor: {other}"))),
    }
}

fn datatype_from_name(name: &str, args: &JsonValue) -> Result<DataType> {
    match name.to_lowercase().as_str() {
        "int" | "integer" | "bigint" | "smallint" => Ok(DataType::Int),
        "float" | "double" | "real" => Ok(DataType::Float),
        "boolean" | "bool" => Ok(DataType::Boolean),
        "varchar" | "text" | "char" | "string" | "date" => Ok(DataType::Varchar),
        "decimal" | "numeric" => parse_decimal_args(args),
        other => Err(EngineError::Schema(format!(
            "Unknown type '{other}'. Use int|float|boolean|varchar|decimal"
        ))),
    }
}

fn parse_decimal_args(args: &JsonValue) -> Result<DataType> {
    let (precision, scale) = match args {
        JsonValue::Array(items) if items.len() == 2 => (
            decimal_arg(&items[0], "precision")?,
            decimal_arg(&items[1], "scale")?,
        ),
        JsonValue::Array(items) if items.len() == 1 => (decimal_arg(&items[0], "precision")?, 0),
        JsonValue::Number(_) => (decimal_arg(args, "precision")?, 0),
        _ => {
            return Err(EngineError::Schema(format!(
                "Decimal type requires [precision, scale], got {args}"
            )));
        }
    };
    if precision == 0 || precision > MAX_DECIMAL_PRECISION {
        return Err(EngineError::Schema(format!(
            "Decimal precision must be between 1 and {MAX_DECIMAL_PRECISION}, got {precision}"
        )));
    }
    if scale > precision {
        return Err(EngineError::Schema(format!(
            "Decimal scale {scale} exceeds precision {precision}"
        )));
    }
    Ok(DataType::Decimal { precision, scale })
}

fn decimal_arg(v: &JsonValue, what: &str) -> Result<u32> {
    v.as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| EngineError::Schema(format!("Decimal {what} must be a non-negative integer, got {v}")))
}
