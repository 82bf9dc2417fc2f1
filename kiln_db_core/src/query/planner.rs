//! Rewrites single-table equality predicates into primary-key index seeks.
//!
//! The planner only ever narrows the rows a scan starts from; the full WHERE
//! condition is still evaluated on whatever it returns. It never fails:
//! shapes it does not understand fall back to a full scan (`None`).

use tracing::debug;

use crate::storage::{RowId, Table};
use crate::query::where_clause::WhereClause;
use crate::types::Row;
use crate::types::value::{convert_value, Value};

/// Row handles the scan should start from, or `None` for a full scan.
pub fn plan_access_path(clause: Option<&WhereClause>, table: &Table) -> Option<Vec<RowId>> {
    let clause = clause?;
    table.index()?;

    let path = match clause {
        WhereClause::Compare { .. } => point_lookup(clause, table).map(|id| vec![id]),
        WhereClause::Or(items) => {
            let eqs = equalities(items);
            // Any other member could match rows outside the index seeks.
            if eqs.len() == items.len() {
                plan_disjunction(&eqs, table)
            } else {
                None
            }
        }
        WhereClause::And(items) => plan_conjunction(&equalities(items), table),
        _ => None,
    };
    debug!(
        table = table.name(),
        index_rows = path.as_ref().map(Vec::len),
        "query.access_path"
    );
    path
}

/// Same as [`plan_access_path`], materialized into rows.
pub fn access_path_rows(clause: Option<&WhereClause>, table: &Table) -> Option<Vec<Row>> {
    plan_access_path(clause, table).map(|ids| {
        ids.into_iter()
            .filter_map(|id| table.get(id).cloned())
            .collect()
    })
}

fn equalities(items: &[WhereClause]) -> Vec<&WhereClause> {
    items.iter().filter(|c| c.is_equality()).collect()
}

/// Knowing only one side of an OR says nothing about the rest of the table,
/// so a partially resolved disjunction falls back to every row.
fn plan_disjunction(eqs: &[&WhereClause], table: &Table) -> Option<Vec<RowId>> {
    match eqs {
        [single] => point_lookup(single, table).map(|_| table.row_ids().collect()),
        [a, b] => match (point_lookup(a, table), point_lookup(b, table)) {
            (Some(x), Some(y)) if x == y => Some(vec![x]),
            (Some(x), Some(y)) => Some(vec![x, y]),
            (Some(_), None) | (None, Some(_)) => Some(table.row_ids().collect()),
            (None, None) => None,
        },
        _ => None,
    }
}

/// Rows satisfying an AND must satisfy every resolved side.
fn plan_conjunction(eqs: &[&WhereClause], table: &Table) -> Option<Vec<RowId>> {
    match eqs {
        [single] => point_lookup(single, table).map(|id| vec![id]),
        [a, b] => match (point_lookup(a, table), point_lookup(b, table)) {
            (Some(x), Some(y)) if x == y => Some(vec![x]),
            (Some(_), Some(_)) => Some(Vec::new()),
            (Some(x), None) | (None, Some(x)) => Some(vec![x]),
            (None, None) => None,
        },
        _ => None,
    }
}

/// Resolves `pk = literal` when the key is present in the index.
fn point_lookup(clause: &WhereClause, table: &Table) -> Option<RowId> {
    let (column, literal) = clause.as_column_equality()?;
    let pk = table.indexed_column()?;
    if table.schema().resolve(table.name(), column)? != pk {
        return None;
    }
    let dtype = &table.schema().columns[pk].dtype;
    let key = convert_value(&literal.to_raw(), dtype, true, false).ok()?;
    if matches!(key, Value::Null) {
        return None;
    }
    table.lookup(&key).map(|(id, _)| id)
}
