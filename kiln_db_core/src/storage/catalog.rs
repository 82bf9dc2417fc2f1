use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::storage::table::Table;

/// Named tables of one in-process database.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<String, Table>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Checks if a table exists in the catalog
    pub fn exists(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Registers a table. Returns an error if the name is taken.
    pub fn add_table(&mut self, table: Table) -> Result<()> {
        if self.exists(table.name()) {
            return Err(EngineError::Schema(format!(
                "Table '{}' already exists",
                table.name()
            )));
        }
        self.tables.insert(table.name().to_string(), table);
        Ok(())
    }

    pub fn drop_table(&mut self, table: &str) -> Result<Table> {
        self.tables
            .remove(table)
            .ok_or_else(|| EngineError::table_not_found(table))
    }

    pub fn table(&self, table: &str) -> Result<&Table> {
        self.tables
            .get(table)
            .ok_or_else(|| EngineError::table_not_found(table))
    }

    pub fn table_mut(&mut self, table: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| EngineError::table_not_found(table))
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }
}
