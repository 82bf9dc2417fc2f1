use tracing::info;

use crate::error::Result;
use crate::storage::{compile_schema, Catalog, Table, TableDefinition};

/// Compiles `def` and registers the new table. Returns the table name.
pub fn handle_create_table(def: &TableDefinition, catalog: &mut Catalog) -> Result<String> {
    let compiled = compile_schema(def, |name| catalog.exists(name))?;
    let table = Table::new(def.name.clone(), compiled.schema, compiled.needs_index);
    info!(
        table = %def.name,
        columns = table.schema().column_count(),
        indexed = table.index().is_some(),
        "storage.table.created"
    );
    catalog.add_table(table)?;
    Ok(def.name.clone())
}

pub fn handle_drop_table(table: &str, catalog: &mut Catalog) -> Result<()> {
    let dropped = catalog.drop_table(table)?;
    info!(table, rows = dropped.len(), "storage.table.dropped");
    Ok(())
}
