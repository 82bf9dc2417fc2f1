use std::cmp::Ordering;

use crate::error::{EngineError, Result};
use crate::query::layout::{Layout, LayoutColumn};
use crate::query::where_clause::{CompareOp, Operand, WhereClause};
use crate::types::Row;
use crate::types::value::{compare_values, convert_value, Value};

/// Filter and projection capability the step executor calls into.
///
/// The executor decides *when* conditions and projections run; an evaluator
/// decides what they mean.
pub trait ExpressionEvaluator {
    fn matches(&self, condition: &WhereClause, layout: &Layout, row: &Row) -> Result<bool>;

    /// Projects rows onto `projections`, producing the output layout qualified
    /// by `qualifier`.
    fn project(
        &self,
        qualifier: &str,
        projections: &[String],
        layout: &Layout,
        rows: Vec<Row>,
    ) -> Result<(Layout, Vec<Row>)>;
}

/// Evaluates comparisons over column references and literals, and projects
/// plain or aliased column references.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicEvaluator;

impl ExpressionEvaluator for BasicEvaluator {
    fn matches(&self, condition: &WhereClause, layout: &Layout, row: &Row) -> Result<bool> {
        match condition {
            WhereClause::Compare { op, left, right } => {
                let (lhs, rhs) = operand_values(left, right, layout, row)?;
                Ok(compare_values(&lhs, &rhs).is_some_and(|ord| op_holds(*op, ord)))
            }
            WhereClause::And(items) => {
                for item in items {
                    if !self.matches(item, layout, row)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            WhereClause::Or(items) => {
                for item in items {
                    if self.matches(item, layout, row)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            WhereClause::Not(inner) => Ok(!self.matches(inner, layout, row)?),
            WhereClause::Unsupported(op) => Err(EngineError::Predicate(format!("operator '{op}'"))),
        }
    }

    fn project(
        &self,
        qualifier: &str,
        projections: &[String],
        layout: &Layout,
        rows: Vec<Row>,
    ) -> Result<(Layout, Vec<Row>)> {
        let mut selected: Vec<(usize, LayoutColumn)> = Vec::new();
        for item in projections {
            let (expr, alias) = split_select_alias(item);
            if expr == "*" {
                for (idx, col) in layout.columns().iter().enumerate() {
                    selected.push((idx, out_column(qualifier, col, None)));
                }
                continue;
            }
            let idx = layout.resolve(&expr, "SELECT list")?;
            let col = layout
                .column(idx)
                .ok_or_else(|| EngineError::column_not_found(&expr, "SELECT list"))?;
            selected.push((idx, out_column(qualifier, col, alias)));
        }

        let out_layout = Layout::from_columns(
            qualifier,
            selected.iter().map(|(_, c)| c.clone()).collect(),
        );
        let out_rows = rows
            .iter()
            .map(|row| {
                selected
                    .iter()
                    .map(|(idx, _)| row.get(*idx).cloned().unwrap_or(Value::Null))
                    .collect::<Row>()
            })
            .collect();
        Ok((out_layout, out_rows))
    }
}

fn out_column(qualifier: &str, col: &LayoutColumn, alias: Option<String>) -> LayoutColumn {
    LayoutColumn {
        table: qualifier.to_string(),
        name: alias.unwrap_or_else(|| col.name.clone()),
        dtype: col.dtype.clone(),
    }
}

/// Literals take the type of the column they are compared with.
fn operand_values(left: &Operand, right: &Operand, layout: &Layout, row: &Row) -> Result<(Value, Value)> {
    let lhs = column_cell(left, layout, row)?;
    let rhs = column_cell(right, layout, row)?;
    let lhs_value = match &lhs {
        Some((v, _)) => v.clone(),
        None => literal_value(left, rhs.as_ref().map(|(_, c)| *c)),
    };
    let rhs_value = match &rhs {
        Some((v, _)) => v.clone(),
        None => literal_value(right, lhs.as_ref().map(|(_, c)| *c)),
    };
    Ok((lhs_value, rhs_value))
}

fn column_cell<'a>(operand: &Operand, layout: &'a Layout, row: &Row) -> Result<Option<(Value, &'a LayoutColumn)>> {
    let Operand::Column(reference) = operand else {
        return Ok(None);
    };
    let idx = layout.resolve(reference, "WHERE")?;
    let col = layout
        .column(idx)
        .ok_or_else(|| EngineError::column_not_found(reference, "WHERE"))?;
    let cell = row
        .get(idx)
        .cloned()
        .ok_or_else(|| EngineError::Execution(format!("Row is missing value for column '{reference}'")))?;
    Ok(Some((cell, col)))
}

fn literal_value(operand: &Operand, against: Option<&LayoutColumn>) -> Value {
    let Operand::Literal(lit) = operand else {
        return Value::Null;
    };
    match against.and_then(|c| c.dtype.as_ref()) {
        Some(dtype) => convert_value(&lit.to_raw(), dtype, true, false).unwrap_or_else(|_| lit.to_value()),
        None => lit.to_value(),
    }
}

fn op_holds(op: CompareOp, ord: Ordering) -> bool {
    match op {
        CompareOp::Eq => ord == Ordering::Equal,
        CompareOp::Neq => ord != Ordering::Equal,
        CompareOp::Lt => ord == Ordering::Less,
        CompareOp::Lte => ord != Ordering::Greater,
        CompareOp::Gt => ord == Ordering::Greater,
        CompareOp::Gte => ord != Ordering::Less,
    }
}

/// Splits `expr AS alias`.
pub fn split_select_alias(token: &str) -> (String, Option<String>) {
    let lower = token.to_ascii_lowercase();
    if let Some(pos) = lower.rfind(" as ") {
        let expr = token[..pos].trim();
        let alias = token[pos + 4..].trim();
        if !expr.is_empty() && !alias.is_empty() {
            return (expr.to_string(), Some(alias.to_string()));
        }
    }
    (token.trim().to_string(), None)
}
