use super::*;
use kiln_db_core::types::datatype::DataType;

fn schema_error(db: &mut Database, def: serde_json::Value) -> String {
    match db.create_table_json(&def) {
        Err(EngineError::Schema(msg)) => msg,
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn test_create_duplicate_table() {
    let mut db = test_db();
    create_users(&mut db);
    let msg = schema_error(
        &mut db,
        json!({"name": "users", "columns": [{"name": "id", "type": "int"}]}),
    );
    assert!(msg.contains("already exists"));
}

#[test]
fn test_column_without_type() {
    let mut db = test_db();
    let msg = schema_error(&mut db, json!({"name": "t", "columns": [{"name": "id"}]}));
    assert!(msg.contains("no type is specified"));
    assert!(db.table_names().is_empty());
}

#[test]
fn test_constraint_block_without_primary_key() {
    let mut db = test_db();
    let msg = schema_error(
        &mut db,
        json!({
            "name": "orders",
            "columns": [{"name": "id", "type": "int"}, {"name": "user_id", "type": "int"}],
            "constraint": {"foreign_key": {"columns": "user_id", "references": {"table": "users", "columns": "id"}}}
        }),
    );
    assert_eq!(msg, "No primary key specified");
}

#[test]
fn test_no_constraints_creates_unindexed_table() {
    let mut db = test_db();
    db.create_table_json(&json!({"name": "log", "columns": [{"name": "line", "type": "text"}]}))
        .unwrap();
    let table = db.table("log").unwrap();
    assert!(table.index().is_none());
    assert_eq!(table.schema().columns[0].dtype, DataType::Varchar);
}

#[test]
fn test_single_primary_key_builds_index_and_forces_not_null() {
    let mut db = test_db();
    db.create_table_json(&json!({
        "create table": {
            "name": "users",
            "columns": [{"name": "id", "type": "int", "nullable": true}, {"name": "name", "type": "varchar"}],
            "constraint": [{"primary_key": {"columns": ["id"]}}]
        }
    }))
    .unwrap();
    let table = db.table("users").unwrap();
    assert!(table.index().is_some());
    assert_eq!(table.indexed_column(), Some(0));
    let id = &table.schema().columns[0];
    assert!(id.primary_key);
    assert!(!id.nullable);
}

#[test]
fn test_composite_primary_key_has_no_index() {
    let mut db = test_db();
    db.create_table_json(&json!({
        "name": "memberships",
        "columns": [{"name": "user_id", "type": "int"}, {"name": "group_id", "type": "int"}],
        "constraint": {"primary_key": {"columns": ["user_id", "group_id"]}}
    }))
    .unwrap();
    let table = db.table("memberships").unwrap();
    assert!(table.index().is_none());
    assert_eq!(table.schema().primary_key_columns().len(), 2);
}

#[test]
fn test_inline_primary_key_counts() {
    let mut db = test_db();
    db.create_table_json(&json!({
        "name": "users",
        "columns": [{"name": "id", "type": {"integer": {}}, "primary_key": true}]
    }))
    .unwrap();
    assert!(db.table("users").unwrap().index().is_some());
}

#[test]
fn test_type_descriptor_normalisation() {
    let mut db = test_db();
    db.create_table_json(&json!({
        "name": "mixed",
        "columns": [
            {"name": "a", "type": {"int": {}}},
            {"name": "b", "type": "double"},
            {"name": "c", "type": {"boolean": {}}},
            {"name": "d", "type": {"varchar": 255}},
            {"name": "e", "type": "date"},
            {"name": "f", "type": {"decimal": [10, 3]}},
            {"name": "g", "type": {"numeric": 6}}
        ]
    }))
    .unwrap();
    let types: Vec<DataType> = db
        .schema("mixed")
        .unwrap()
        .columns
        .iter()
        .map(|c| c.dtype.clone())
        .collect();
    assert_eq!(
        types,
        vec![
            DataType::Int,
            DataType::Float,
            DataType::Boolean,
            DataType::Varchar,
            DataType::Varchar,
            DataType::Decimal { precision: 10, scale: 3 },
            DataType::Decimal { precision: 6, scale: 0 },
        ]
    );
}

#[test]
fn test_unknown_type_is_schema_error() {
    let mut db = test_db();
    let msg = schema_error(&mut db, json!({"name": "t", "columns": [{"name": "x", "type": "blob"}]}));
    assert!(msg.contains("Unknown type 'blob'"));
}

#[test]
fn test_decimal_bounds_are_validated() {
    let mut db = test_db();
    schema_error(&mut db, json!({"name": "t", "columns": [{"name": "x", "type": {"decimal": [4, 5]}}]}));
    schema_error(&mut db, json!({"name": "t", "columns": [{"name": "x", "type": {"decimal": [29, 2]}}]}));
    db.create_table_json(&json!({"name": "t", "columns": [{"name": "x", "type": {"decimal": [28, 28]}}]}))
        .unwrap();
}

#[test]
fn test_constraint_on_unknown_column() {
    let mut db = test_db();
    let msg = schema_error(
        &mut db,
        json!({
            "name": "t",
            "columns": [{"name": "id", "type": "int"}],
            "constraint": {"primary_key": {"columns": "missing"}}
        }),
    );
    assert!(msg.contains("unknown column 'missing'"));
}

#[test]
fn test_foreign_key_column_count_mismatch() {
    let mut db = test_db();
    let msg = schema_error(
        &mut db,
        json!({
            "name": "t",
            "columns": [{"name": "id", "type": "int"}, {"name": "a", "type": "int"}],
            "constraint": [
                {"primary_key": {"columns": "id"}},
                {"foreign_key": {"columns": ["a"], "references": {"table": "other", "columns": ["x", "y"]}}}
            ]
        }),
    );
    assert!(msg.contains("column count"));
}

#[test]
fn test_foreign_key_is_recorded() {
    let mut db = test_db();
    db.create_table_json(&json!({
        "name": "orders",
        "columns": [{"name": "id", "type": "int"}, {"name": "user_id", "type": "int"}],
        "constraint": [
            {"primary_key": {"columns": "id"}},
            {"foreign_key": {"columns": "user_id", "references": {"table": "users", "columns": "id"}}}
        ]
    }))
    .unwrap();
    let fk = db.schema("orders").unwrap().columns[1].foreign_key.clone().unwrap();
    assert_eq!(fk.table, "users");
    assert_eq!(fk.column, "id");
}

#[test]
fn test_unknown_constraint_kind_is_rejected() {
    let mut db = test_db();
    let msg = schema_error(
        &mut db,
        json!({
            "name": "t",
            "columns": [{"name": "id", "type": "int"}],
            "constraint": {"unique": {"columns": "id"}}
        }),
    );
    assert!(msg.contains("Malformed table definition"));
}

#[test]
fn test_duplicate_column_names() {
    let mut db = test_db();
    let msg = schema_error(
        &mut db,
        json!({"name": "t", "columns": [{"name": "id", "type": "int"}, {"name": "id", "type": "text"}]}),
    );
    assert!(msg.contains("Duplicate column 'id'"));
}
