use std::collections::HashSet;

use crate::error::{EngineError, Result};
use crate::storage::definition::{ConstraintDef, OneOrMany, References, TableDefinition};
use crate::storage::schema::{Column, ForeignKeyRef, Schema};
use crate::types::datatype::parse_datatype;

/// Output of schema compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    pub schema: Schema,
    /// True when the primary key is exactly one column.
    pub needs_index: bool,
}

/// Turns a parsed table definition into a validated schema.
///
/// `table_exists` reports whether a table name is already taken.
pub fn compile_schema(
    def: &TableDefinition,
    table_exists: impl Fn(&str) -> bool,
) -> Result<CompiledSchema> {
    if def.name.trim().is_empty() {
        return Err(EngineError::Schema("Table name cannot be empty".to_string()));
    }
    if table_exists(&def.name) {
        return Err(EngineError::Schema(format!("Table '{}' already exists", def.name)));
    }

    let column_defs = def.columns.to_vec();
    if column_defs.is_empty() {
        return Err(EngineError::Schema(format!(
            "Table '{}' must declare at least one column",
            def.name
        )));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut columns: Vec<Column> = Vec::with_capacity(column_defs.len());
    for c in &column_defs {
        if !seen.insert(c.name.as_str()) {
            return Err(EngineError::Schema(format!("Duplicate column '{}'", c.name)));
        }
        let descriptor = c.dtype.as_ref().ok_or_else(|| {
            EngineError::Schema(format!("Invalid column - no type is specified: '{}'", c.name))
        })?;
        columns.push(Column {
            name: c.name.clone(),
            dtype: parse_datatype(descriptor)?,
            nullable: c.nullable.unwrap_or(true),
            primary_key: c.primary_key,
            foreign_key: None,
        });
    }

    let constraints = def.constraint.as_ref().map(OneOrMany::to_vec);
    if let Some(entries) = &constraints {
        for entry in entries {
            apply_constraint(&mut columns, entry)?;
        }
    }

    let pk_count = columns.iter().filter(|c| c.primary_key).count();
    if pk_count == 0 && constraints.is_some() {
        return Err(EngineError::Schema("No primary key specified".to_string()));
    }

    // PK implies NOT NULL.
    for c in columns.iter_mut().filter(|c| c.primary_key) {
        c.nullable = false;
    }

    Ok(CompiledSchema {
        schema: Schema::new(columns),
        needs_index: pk_count == 1,
    })
}

fn apply_constraint(columns: &mut [Column], constraint: &ConstraintDef) -> Result<()> {
    match constraint {
        ConstraintDef::PrimaryKey { columns: keys } => {
            for key in keys.to_vec() {
                find_column(columns, &key, "PRIMARY KEY")?.primary_key = true;
            }
            Ok(())
        }
        ConstraintDef::ForeignKey {
            columns: keys,
            references,
        } => {
            let targets = foreign_key_pairs(keys, references)?;
            for (key, target) in targets {
                find_column(columns, &key, "FOREIGN KEY")?.foreign_key = Some(target);
            }
            Ok(())
        }
    }
}

/// Matches each key column positionally against the referenced columns.
fn foreign_key_pairs(
    keys: &OneOrMany<String>,
    references: &References,
) -> Result<Vec<(String, ForeignKeyRef)>> {
    let key_cols = keys.to_vec();
    let ref_cols = references.columns.to_vec();
    if key_cols.is_empty() {
        return Err(EngineError::Schema("FOREIGN KEY column list cannot be empty".to_string()));
    }
    if key_cols.len() != ref_cols.len() {
        return Err(EngineError::Schema(
            "FOREIGN KEY column count must match referenced column count".to_string(),
        ));
    }
    Ok(key_cols
        .into_iter()
        .zip(ref_cols)
        .map(|(key, column)| {
            (
                key,
                ForeignKeyRef {
                    table: references.table.clone(),
                    column,
                },
            )
        })
        .collect())
}

fn find_column<'a>(columns: &'a mut [Column], name: &str, clause: &str) -> Result<&'a mut Column> {
    columns
        .iter_mut()
        .find(|c| c.name == name)
        .ok_or_else(|| EngineError::Schema(format!("{clause} references unknown column '{name}'")))
}
