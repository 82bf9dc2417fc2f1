pub mod ddl;
pub mod dml;
pub mod format;

pub use ddl::{handle_create_table, handle_drop_table};
pub use dml::{handle_bulk_load, handle_delete, handle_insert, handle_update, resolve_equality};
pub use format::{format_load_report, format_result};
