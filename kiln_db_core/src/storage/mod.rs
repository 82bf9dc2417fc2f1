pub mod catalog;
pub mod compiler;
pub mod definition;
pub mod index;
pub mod schema;
pub mod table;

// Re-export main types for convenience
pub use catalog::Catalog;
pub use compiler::{compile_schema, CompiledSchema};
pub use definition::{ColumnDefinition, ConstraintDef, OneOrMany, References, TableDefinition};
pub use index::{PrimaryKeyIndex, RowId};
pub use schema::{Column, ForeignKeyRef, Schema};
pub use table::{BulkLoadReport, ColumnMatch, SkippedRow, Table};
