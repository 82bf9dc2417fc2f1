use super::*;
use kiln_db_core::engine::format_result;

#[test]
fn test_create_table_returns_name() {
    let mut db = test_db();
    let name = db
        .create_table_json(&json!({"name": "users", "columns": [{"name": "id", "type": "int"}]}))
        .unwrap();
    assert_eq!(name, "users");
    assert_eq!(db.table_names(), vec!["users".to_string()]);
}

#[test]
fn test_scan_returns_rows_in_insertion_order() {
    let mut db = test_db();
    create_users(&mut db);
    for id in [5, 3, 9, 1, 7] {
        db.insert("users", &[id.to_string(), format!("u{id}"), "20".to_string()])
            .unwrap();
    }
    let ids: Vec<Value> = db.scan("users").unwrap().into_iter().map(|r| r[0].clone()).collect();
    assert_eq!(
        ids,
        vec![Value::Int(5), Value::Int(3), Value::Int(9), Value::Int(1), Value::Int(7)]
    );
}

#[test]
fn test_select_formats_tab_separated() {
    let mut db = test_db();
    seed_users_3(&mut db);
    let out = run(&db, json!({"steps": [{"name": "users"}]}));
    assert_eq!(format_result(&out), "id\tname\tage\n1\ta\t30\n2\tb\t20\n3\tc\t10");
}

#[test]
fn test_select_empty_table_prints_header_only() {
    let mut db = test_db();
    create_users(&mut db);
    let out = run(&db, json!({"steps": [{"name": "users"}]}));
    assert_eq!(format_result(&out), "id\tname\tage");
}

#[test]
fn test_insert_into_missing_table() {
    let mut db = test_db();
    let err = db.insert("users", &["1"]).unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_insert_wrong_value_count() {
    let mut db = test_db();
    create_users(&mut db);
    let err = db.insert("users", &["1", "a"]).unwrap_err();
    assert_eq!(err, EngineError::ValueCount { expected: 3, found: 2 });
}

#[test]
fn test_insert_type_mismatch_int() {
    let mut db = test_db();
    create_users(&mut db);
    let err = db.insert("users", &["abc", "a", "1"]).unwrap_err();
    assert!(matches!(err, EngineError::TypeConversion { .. }));
    assert!(db.scan("users").unwrap().is_empty());
}

#[test]
fn test_blank_value_is_null_when_nullable() {
    let mut db = test_db();
    create_users(&mut db);
    db.insert("users", &["1", "", "  "]).unwrap();
    assert_eq!(
        db.scan("users").unwrap(),
        vec![vec![Value::Int(1), Value::Null, Value::Null]]
    );
}

#[test]
fn test_blank_primary_key_violates_not_null() {
    let mut db = test_db();
    create_users(&mut db);
    let err = db.insert("users", &["", "a", "1"]).unwrap_err();
    assert_eq!(
        err,
        EngineError::NullConstraint {
            column: Some("id".to_string())
        }
    );
}

#[test]
fn test_duplicate_key_and_duplicate_row() {
    let mut db = test_db();
    seed_users_3(&mut db);
    let err = db.insert("users", &["1", "z", "99"]).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateKey { .. }));

    db.create_table_json(&json!({
        "name": "tags",
        "columns": [{"name": "label", "type": "varchar"}]
    }))
    .unwrap();
    db.insert("tags", &["red"]).unwrap();
    let err = db.insert("tags", &["red"]).unwrap_err();
    assert_eq!(err, EngineError::DuplicateRow { table: "tags".to_string() });
    assert_eq!(db.scan("tags").unwrap().len(), 1);
}

#[test]
fn test_drop_table_removes_it() {
    let mut db = test_db();
    seed_users_3(&mut db);
    db.drop_table("users").unwrap();
    assert!(db.table_names().is_empty());
    assert!(matches!(db.drop_table("users"), Err(EngineError::NotFound(_))));
    assert!(db.scan("users").is_err());
}

#[test]
fn test_table_names_sorted() {
    let mut db = test_db();
    for name in ["zeta", "alpha", "mid"] {
        db.create_table_json(&json!({"name": name, "columns": {"name": "x", "type": "int"}}))
            .unwrap();
    }
    assert_eq!(db.table_names(), vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_empty_plan_is_execution_error() {
    let db = test_db();
    let plan = Plan::from_json(&json!({"steps": []})).unwrap();
    assert!(matches!(db.execute(&plan), Err(EngineError::Execution(_))));
}

#[test]
fn test_projection_with_alias_and_order_by_desc() {
    let mut db = test_db();
    seed_users_3(&mut db);
    let out = run(
        &db,
        json!({
            "steps": [{"name": "users", "projections": ["name AS who", "age"]}],
            "order_by": {"column": "age", "descending": true}
        }),
    );
    assert_eq!(out.columns, vec!["who", "age"]);
    assert_eq!(int_column(&out, 1), vec![30, 20, 10]);
}

#[test]
fn test_order_by_ascending_is_stable() {
    let mut db = test_db();
    create_users(&mut db);
    db.insert("users", &["1", "a", "20"]).unwrap();
    db.insert("users", &["2", "b", "10"]).unwrap();
    db.insert("users", &["3", "c", "20"]).unwrap();
    db.insert("users", &["4", "d", "10"]).unwrap();
    let out = run(&db, json!({"steps": [{"name": "users"}], "order_by": {"column": "age"}}));
    assert_eq!(int_column(&out, 0), vec![2, 4, 1, 3]);
}

#[test]
fn test_filter_with_inequality_and_not() {
    let mut db = test_db();
    seed_users_3(&mut db);
    let out = run(
        &db,
        json!({"steps": [{"name": "users", "condition": {"and": [{"gte": ["age", 20]}, {"not": {"eq": ["name", {"literal": "a"}]}}]}}]}),
    );
    assert_eq!(int_column(&out, 0), vec![2]);
}

#[test]
fn test_unknown_column_in_condition() {
    let mut db = test_db();
    seed_users_3(&mut db);
    let plan = Plan::from_json(&json!({"steps": [{"name": "users", "condition": {"lt": ["salary", 5]}}]})).unwrap();
    let err = db.execute(&plan).unwrap_err();
    assert!(err.to_string().contains("Unknown column 'salary'"));
}

#[test]
fn test_later_step_continues_from_earlier_step() {
    let mut db = test_db();
    seed_users_3(&mut db);
    let out = run(
        &db,
        json!({"steps": [
            {"name": "users", "condition": {"gt": ["age", 10]}},
            {"name": "users", "projections": ["id"]}
        ]}),
    );
    assert_eq!(out.columns, vec!["id"]);
    assert_eq!(int_column(&out, 0), vec![1, 2]);
}

#[test]
fn test_unsupported_operator_is_predicate_error() {
    let mut db = test_db();
    seed_users_3(&mut db);
    let where_clause = WhereClause::from_json(&json!({"like": ["name", "a%"]})).unwrap();
    let plan = Plan::scan("users", Some(where_clause));
    assert!(matches!(db.execute(&plan), Err(EngineError::Predicate(_))));
}
