use std::collections::HashMap;

use tracing::info;

use crate::error::{EngineError, Result};
use crate::query::WhereClause;
use crate::storage::{BulkLoadReport, Catalog, ColumnMatch, RowId, Table};
use crate::types::Row;
use crate::types::value::{convert_value, Value};

pub fn handle_insert<S: AsRef<str>>(table: &str, values: &[S], catalog: &mut Catalog) -> Result<RowId> {
    let target = catalog.table_mut(table)?;
    let row = target.schema().convert_row(values)?;
    target.insert(row)
}

/// Loads raw field mappings keyed by column name. Bad rows are skipped and
/// reported; only an unknown table fails the call.
pub fn handle_bulk_load(
    table: &str,
    rows: &[HashMap<String, String>],
    catalog: &mut Catalog,
) -> Result<BulkLoadReport> {
    let target = catalog.table_mut(table)?;
    let converted: Vec<Result<Row>> = rows.iter().map(|fields| row_from_fields(&*target, fields)).collect();
    let report = target.bulk_load(converted);
    info!(
        table,
        inserted = report.inserted,
        skipped = report.skipped.len(),
        "storage.bulk_load.completed"
    );
    Ok(report)
}

/// Applies `column = raw value` assignments to rows matching `predicate`.
pub fn handle_update<K: AsRef<str>, V: AsRef<str>>(
    table: &str,
    assignments: &[(K, V)],
    predicate: Option<&WhereClause>,
    catalog: &mut Catalog,
) -> Result<usize> {
    let target = catalog.table_mut(table)?;
    let mut converted: Vec<(usize, Value)> = Vec::with_capacity(assignments.len());
    for (column, raw) in assignments {
        let column = column.as_ref();
        let idx = target
            .schema()
            .resolve(table, column)
            .ok_or_else(|| EngineError::column_not_found(column, "UPDATE"))?;
        let value = target.schema().columns[idx].convert(raw.as_ref())?;
        converted.push((idx, value));
    }
    let matcher = resolve_equality(target, predicate)?;
    target.update(&converted, matcher.as_ref())
}

pub fn handle_delete(table: &str, predicate: Option<&WhereClause>, catalog: &mut Catalog) -> Result<usize> {
    let target = catalog.table_mut(table)?;
    let matcher = resolve_equality(target, predicate)?;
    Ok(target.delete(matcher.as_ref()))
}

/// Mutations accept no predicate or a single `column = literal`.
pub fn resolve_equality(table: &Table, predicate: Option<&WhereClause>) -> Result<Option<ColumnMatch>> {
    let Some(clause) = predicate else {
        return Ok(None);
    };
    let (column, literal) = clause.as_column_equality().ok_or_else(|| {
        EngineError::Predicate("only `column = literal` is accepted here".to_string())
    })?;
    let idx = table
        .schema()
        .resolve(table.name(), column)
        .ok_or_else(|| EngineError::column_not_found(column, "WHERE"))?;
    let dtype = &table.schema().columns[idx].dtype;
    let value = convert_value(&literal.to_raw(), dtype, true, false)?;
    Ok(Some(ColumnMatch { column: idx, value }))
}

fn row_from_fields(table: &Table, fields: &HashMap<String, String>) -> Result<Row> {
    let schema = table.schema();
    if fields.len() != schema.column_count() {
        return Err(EngineError::ValueCount {
            expected: schema.column_count(),
            found: fields.len(),
        });
    }
    schema
        .columns
        .iter()
        .map(|col| {
            let raw = fields
                .get(&col.name)
                .ok_or_else(|| EngineError::column_not_found(&col.name, "LOAD"))?;
            col.convert(raw)
        })
        .collect()
}
