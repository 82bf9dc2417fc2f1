pub mod config;
pub mod engine;
pub mod error;
pub mod query;
pub mod storage;
pub mod types;

use std::collections::HashMap;

use serde_json::Value as JsonValue;

pub use config::EngineConfig;
pub use error::{EngineError, Result};

use query::{BasicEvaluator, ExpressionEvaluator, Executor, Plan, QueryResult, WhereClause};
use storage::{BulkLoadReport, Catalog, RowId, Schema, Table, TableDefinition};
use types::Row;

/// One in-memory database session: a catalog of tables plus engine settings.
#[derive(Debug, Clone, Default)]
pub struct Database {
    catalog: Catalog,
    config: EngineConfig,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            catalog: Catalog::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn create_table(&mut self, def: &TableDefinition) -> Result<String> {
        engine::handle_create_table(def, &mut self.catalog)
    }

    /// Same as [`Database::create_table`], from the front-end's JSON shape.
    pub fn create_table_json(&mut self, def: &JsonValue) -> Result<String> {
        let def = TableDefinition::from_json(def)?;
        self.create_table(&def)
    }

    pub fn drop_table(&mut self, table: &str) -> Result<()> {
        engine::handle_drop_table(table, &mut self.catalog)
    }

    /// Inserts one row given as raw tokens in column order.
    pub fn insert<S: AsRef<str>>(&mut self, table: &str, values: &[S]) -> Result<RowId> {
        engine::handle_insert(table, values, &mut self.catalog)
    }

    pub fn bulk_load(&mut self, table: &str, rows: &[HashMap<String, String>]) -> Result<BulkLoadReport> {
        engine::handle_bulk_load(table, rows, &mut self.catalog)
    }

    pub fn update<K: AsRef<str>, V: AsRef<str>>(
        &mut self,
        table: &str,
        assignments: &[(K, V)],
        predicate: Option<&WhereClause>,
    ) -> Result<usize> {
        engine::handle_update(table, assignments, predicate, &mut self.catalog)
    }

    pub fn delete(&mut self, table: &str, predicate: Option<&WhereClause>) -> Result<usize> {
        engine::handle_delete(table, predicate, &mut self.catalog)
    }

    pub fn execute(&self, plan: &Plan) -> Result<QueryResult> {
        self.execute_with(plan, &BasicEvaluator)
    }

    /// Runs `plan` with a caller-supplied expression evaluator.
    pub fn execute_with(&self, plan: &Plan, evaluator: &dyn ExpressionEvaluator) -> Result<QueryResult> {
        Executor::new(&self.catalog, &self.config, evaluator).execute(plan)
    }

    pub fn table_names(&self) -> Vec<String> {
        self.catalog.table_names()
    }

    pub fn table(&self, table: &str) -> Result<&Table> {
        self.catalog.table(table)
    }

    pub fn schema(&self, table: &str) -> Result<&Schema> {
        self.catalog.table(table).map(Table::schema)
    }

    /// All rows of `table` in insertion order.
    pub fn scan(&self, table: &str) -> Result<Vec<Row>> {
        Ok(self.catalog.table(table)?.rows().cloned().collect())
    }
}
