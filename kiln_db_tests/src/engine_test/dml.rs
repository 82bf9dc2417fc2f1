use super::*;

#[test]
fn test_update_with_predicate() {
    let mut db = test_db();
    seed_users_3(&mut db);
    let n = db
        .update("users", &[("name", "zz"), ("age", "99")], Some(&WhereClause::eq("id", 2i64)))
        .unwrap();
    assert_eq!(n, 1);
    let rows = db.scan("users").unwrap();
    assert_eq!(
        rows[1],
        vec![Value::Int(2), Value::Varchar("zz".to_string()), Value::Int(99)]
    );
    // Position in scan order is unchanged.
    assert_eq!(rows[0][0], Value::Int(1));
    assert_eq!(rows[2][0], Value::Int(3));
}

#[test]
fn test_update_is_visible_through_index() {
    let mut db = test_db();
    seed_users_3(&mut db);
    db.update("users", &[("age", "1")], Some(&WhereClause::eq("id", 3i64)))
        .unwrap();
    let table = db.table("users").unwrap();
    let (_, row) = table.lookup(&Value::Int(3)).unwrap();
    assert_eq!(row[2], Value::Int(1));
}

#[test]
fn test_update_without_predicate_touches_every_row() {
    let mut db = test_db();
    seed_users_3(&mut db);
    let n = db.update("users", &[("age", "0")], None).unwrap();
    assert_eq!(n, 3);
    assert!(db.scan("users").unwrap().iter().all(|r| r[2] == Value::Int(0)));
}

#[test]
fn test_update_primary_key_is_unsupported() {
    let mut db = test_db();
    seed_users_3(&mut db);
    let err = db
        .update("users", &[("id", "10")], Some(&WhereClause::eq("id", 1i64)))
        .unwrap_err();
    assert_eq!(err, EngineError::UnsupportedUpdate { column: "id".to_string() });
    assert_eq!(db.scan("users").unwrap()[0][0], Value::Int(1));
}

#[test]
fn test_update_bad_value_changes_nothing() {
    let mut db = test_db();
    seed_users_3(&mut db);
    let before = db.scan("users").unwrap();
    let err = db.update("users", &[("age", "old")], None).unwrap_err();
    assert!(matches!(err, EngineError::TypeConversion { .. }));
    assert_eq!(db.scan("users").unwrap(), before);
}

#[test]
fn test_update_creating_duplicate_row_is_rejected() {
    let mut db = test_db();
    db.create_table_json(&json!({
        "name": "pairs",
        "columns": [{"name": "a", "type": "int"}, {"name": "b", "type": "int"}]
    }))
    .unwrap();
    db.insert("pairs", &["1", "1"]).unwrap();
    db.insert("pairs", &["2", "1"]).unwrap();
    let err = db
        .update("pairs", &[("a", "1")], Some(&WhereClause::eq("a", 2i64)))
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateRow { .. }));
    assert_eq!(db.scan("pairs").unwrap()[1][0], Value::Int(2));
}

#[test]
fn test_update_unknown_column() {
    let mut db = test_db();
    seed_users_3(&mut db);
    let err = db.update("users", &[("email", "x")], None).unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[test]
fn test_mutation_rejects_non_equality_predicate() {
    let mut db = test_db();
    seed_users_3(&mut db);
    let clause = WhereClause::from_json(&json!({"gt": ["age", 15]})).unwrap();
    let err = db.delete("users", Some(&clause)).unwrap_err();
    assert!(matches!(err, EngineError::Predicate(_)));
    let err = db.update("users", &[("age", "1")], Some(&clause)).unwrap_err();
    assert!(matches!(err, EngineError::Predicate(_)));
    assert_eq!(db.scan("users").unwrap().len(), 3);
}

#[test]
fn test_delete_by_primary_key_updates_index() {
    let mut db = test_db();
    seed_users_3(&mut db);
    let n = db.delete("users", Some(&WhereClause::eq("users.id", 2i64))).unwrap();
    assert_eq!(n, 1);
    let table = db.table("users").unwrap();
    assert_eq!(table.len(), 2);
    assert!(table.lookup(&Value::Int(2)).is_none());
    assert_eq!(table.index().map(|i| i.len()), Some(2));

    // The freed key can be reused.
    db.insert("users", &["2", "again", "1"]).unwrap();
}

#[test]
fn test_delete_by_non_key_column() {
    let mut db = test_db();
    seed_users_3(&mut db);
    db.insert("users", &["4", "d", "20"]).unwrap();
    let n = db.delete("users", Some(&WhereClause::eq("age", 20i64))).unwrap();
    assert_eq!(n, 2);
    let ids: Vec<Value> = db.scan("users").unwrap().into_iter().map(|r| r[0].clone()).collect();
    assert_eq!(ids, vec![Value::Int(1), Value::Int(3)]);
    assert_eq!(db.table("users").unwrap().index().map(|i| i.len()), Some(2));
}

#[test]
fn test_delete_without_predicate_clears_table_and_index() {
    let mut db = test_db();
    seed_users_3(&mut db);
    assert_eq!(db.delete("users", None).unwrap(), 3);
    let table = db.table("users").unwrap();
    assert!(table.is_empty());
    assert_eq!(table.index().map(|i| i.is_empty()), Some(true));
}

#[test]
fn test_delete_from_missing_table() {
    let mut db = test_db();
    assert!(matches!(db.delete("ghost", None), Err(EngineError::NotFound(_))));
}

#[test]
fn test_bulk_load_skips_bad_rows_and_continues() -> anyhow::Result<()> {
    let mut db = test_db();
    create_users(&mut db);
    let rows = vec![
        fields(&[("id", "1"), ("name", "a"), ("age", "30")]),
        fields(&[("id", "2"), ("name", "b"), ("age", "20")]),
        fields(&[("id", "3"), ("name", "c"), ("age", "ten")]),
        fields(&[("id", "4"), ("name", "d"), ("age", "40")]),
        fields(&[("id", "5"), ("name", "e"), ("age", "50")]),
    ];
    let report = db.bulk_load("users", &rows)?;
    assert_eq!(report.inserted, 4);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].row_number, 3);
    assert!(matches!(report.skipped[0].error, EngineError::TypeConversion { .. }));
    assert_eq!(db.scan("users")?.len(), 4);
    Ok(())
}

#[test]
fn test_bulk_load_reports_duplicates_and_field_mismatches() -> anyhow::Result<()> {
    let mut db = test_db();
    create_users(&mut db);
    let rows = vec![
        fields(&[("id", "1"), ("name", "a"), ("age", "30")]),
        fields(&[("id", "1"), ("name", "dup"), ("age", "31")]),
        fields(&[("id", "2"), ("name", "b")]),
        fields(&[("id", "3"), ("name", "c"), ("email", "c@x")]),
        fields(&[("id", "4"), ("name", "d"), ("age", "")]),
    ];
    let report = db.bulk_load("users", &rows)?;
    assert_eq!(report.inserted, 2);
    let skipped: Vec<usize> = report.skipped.iter().map(|s| s.row_number).collect();
    assert_eq!(skipped, vec![2, 3, 4]);
    assert!(matches!(report.skipped[0].error, EngineError::DuplicateKey { .. }));
    assert!(matches!(report.skipped[1].error, EngineError::ValueCount { .. }));
    assert!(matches!(report.skipped[2].error, EngineError::NotFound(_)));
    Ok(())
}

#[test]
fn test_bulk_load_into_missing_table_fails() {
    let mut db = test_db();
    assert!(db.bulk_load("ghost", &[]).is_err());
}
