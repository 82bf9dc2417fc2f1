use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, Result};
use crate::types::datatype::DataType;

/// A typed cell value.
///
/// `Value` is totally ordered and hashable so it can key the primary-key
/// index and the hash-join build table. Floats order by `f64::total_cmp`.
/// Values of different variants order by variant rank; this cross-type order
/// exists only so the trait impls are total, and join code rejects it.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Varchar(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Decimal(_) => 4,
            Value::Varchar(_) => 5,
        }
    }

    /// True when both values are of the same variant, or either is null.
    pub fn comparable_with(&self, other: &Value) -> bool {
        self.is_null() || other.is_null() || self.rank() == other.rank()
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Varchar(_) => "varchar",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (Value::Varchar(a), Value::Varchar(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(n) => n.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Decimal(d) => d.normalize().hash(state),
            Value::Varchar(s) => s.hash(state),
        }
    }
}

/// Converts a raw external token into a typed value for a column declaration.
///
/// Blank input is null when the column allows it; anything else must parse as
/// the declared type.
pub fn convert_value(raw: &str, dtype: &DataType, nullable: bool, primary_key: bool) -> Result<Value> {
    if raw.trim().is_empty() {
        if nullable && !primary_key {
            return Ok(Value::Null);
        }
        return Err(EngineError::NullConstraint { column: None });
    }

    match dtype {
        DataType::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| conversion_error(raw, dtype, e.to_string())),
        DataType::Float => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| conversion_error(raw, dtype, e.to_string())),
        DataType::Varchar => Ok(Value::Varchar(raw.to_string())),
        DataType::Boolean => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| conversion_error(raw, dtype, "not a boolean token".to_string())),
        DataType::Decimal { precision, scale } => {
            parse_decimal(raw, *precision, *scale).map(Value::Decimal)
        }
    }
}

fn parse_bool(token: &str) -> Option<bool> {
    match token {
        "true" | "1" | "t" | "y" | "yes" => Some(true),
        "false" | "0" | "f" | "n" | "no" => Some(false),
        _ => None,
    }
}

/// Parses a fixed-point value rounded half-to-even to `scale` fractional
/// digits. The stored scale always equals `scale`.
fn parse_decimal(raw: &str, precision: u32, scale: u32) -> Result<Decimal> {
    let dtype = DataType::Decimal { precision, scale };
    let token = raw.trim();
    let parsed = Decimal::from_str(token)
        .or_else(|_| Decimal::from_scientific(token))
        .map_err(|e| conversion_error(raw, &dtype, e.to_string()))?;

    let mut rounded = parsed.round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(scale);

    let digits = rounded.mantissa().unsigned_abs().to_string().len() as u32;
    if digits > precision {
        return Err(conversion_error(
            raw,
            &dtype,
            format!("needs {digits} digits but precision is {precision}"),
        ));
    }
    Ok(rounded)
}

fn conversion_error(raw: &str, dtype: &DataType, reason: String) -> EngineError {
    EngineError::TypeConversion {
        value: raw.to_string(),
        dtype: dtype.clone(),
        reason,
    }
}

pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => format!("{f:?}"),
        Value::Decimal(d) => d.to_string(),
        Value::Varchar(s) => s.clone(),
    }
}

/// SQL-style comparison used by predicates: nulls compare as unknown, numeric
/// variants compare across int/float/decimal, other mixes are unknown.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Int(x), Value::Float(y)) => (*x as f64).partial_cmp(y),
        (Value::Float(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::Int(x), Value::Decimal(y)) => Some(Decimal::from(*x).cmp(y)),
        (Value::Decimal(x), Value::Int(y)) => Some(x.cmp(&Decimal::from(*y))),
        (Value::Float(x), Value::Decimal(y)) => x.partial_cmp(&y.to_f64()?),
        (Value::Decimal(x), Value::Float(y)) => x.to_f64()?.partial_cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (x, y) if x.rank() == y.rank() => Some(x.cmp(y)),
        _ => None,
    }
}
