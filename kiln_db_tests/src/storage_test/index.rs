use super::*;
use kiln_db_core::storage::{ColumnMatch, PrimaryKeyIndex};

#[test]
fn primary_key_index_point_operations() {
    let mut index = PrimaryKeyIndex::new();
    assert!(index.is_empty());
    index.insert("t", Value::Int(5), 0).unwrap();
    index.insert("t", Value::Int(1), 1).unwrap();
    assert!(index.has(&Value::Int(5)));
    assert_eq!(index.get(&Value::Int(1)), Some(1));
    assert_eq!(index.get(&Value::Int(2)), None);

    let err = index.insert("t", Value::Int(5), 9).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateKey { .. }));
    assert_eq!(index.get(&Value::Int(5)), Some(0));

    let keys: Vec<&Value> = index.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![&Value::Int(1), &Value::Int(5)]);

    assert_eq!(index.remove(&Value::Int(5)), Some(0));
    assert!(!index.has(&Value::Int(5)));
    index.clear();
    assert!(index.is_empty());
}

#[test]
fn index_mirrors_table_through_mutations() {
    let mut table = users_table();
    for id in [4, 2, 9, 7] {
        table.insert(user(id, &format!("u{id}"))).unwrap();
    }
    assert_index_mirrors_rows(&table);

    let target = ColumnMatch {
        column: 0,
        value: Value::Int(9),
    };
    table
        .update(&[(1, Value::Varchar("renamed".to_string()))], Some(&target))
        .unwrap();
    assert_index_mirrors_rows(&table);
    assert_eq!(table.lookup(&Value::Int(9)).map(|(_, r)| r[1].clone()), Some(Value::Varchar("renamed".to_string())));

    assert_eq!(table.delete(Some(&target)), 1);
    assert_index_mirrors_rows(&table);

    table.delete(None);
    assert_index_mirrors_rows(&table);
    assert!(table.is_empty());
}

#[test]
fn failed_insert_leaves_table_and_index_unchanged() {
    let mut table = users_table();
    table.insert(user(1, "a")).unwrap();
    table.insert(user(2, "b")).unwrap();

    let err = table.insert(user(1, "other")).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateKey { .. }));
    assert_eq!(table.len(), 2);
    assert_eq!(table.index().map(|i| i.len()), Some(2));

    let err = table.insert(vec![Value::Int(3)]).unwrap_err();
    assert!(matches!(err, EngineError::ValueCount { .. }));
    assert_eq!(table.len(), 2);
    assert_eq!(table.index().map(|i| i.len()), Some(2));
    assert_index_mirrors_rows(&table);
}

#[test]
fn unindexed_table_without_single_primary_key() {
    let table = Table::new(
        "log",
        Schema::new(vec![Column::new("line", DataType::Varchar)]),
        true,
    );
    assert!(table.index().is_none());
    assert!(table.lookup(&Value::Varchar("x".to_string())).is_none());
}
