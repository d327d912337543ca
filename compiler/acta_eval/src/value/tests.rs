use super::*;
use chrono::TimeDelta;
use pretty_assertions::assert_eq;

#[test]
fn test_display_scalars() {
    assert_eq!(Value::Int(-3).to_string(), "-3");
    assert_eq!(Value::Float(2.0).to_string(), "2.0");
    assert_eq!(Value::Float(0.25).to_string(), "0.25");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::Null.to_string(), "null");
    assert_eq!(Value::Duration(TimeDelta::minutes(90)).to_string(), "90m");
}

#[test]
fn test_display_aggregates() {
    let array = Value::array(vec![Value::Int(1), Value::string("a")]);
    assert_eq!(array.to_string(), "[1, a]");

    let point = Value::Struct(StructValue::new(
        "Point",
        vec![
            ("x".to_string(), Value::Int(1)),
            ("y".to_string(), Value::Int(2)),
        ],
    ));
    assert_eq!(point.to_string(), "Point { x: 1, y: 2 }");
}

#[test]
fn test_display_result_set() {
    let result = ResultSet::new(
        vec!["id".to_string(), "name".to_string()],
        vec![
            vec![Value::Int(1), Value::string("ada")],
            vec![Value::Int(2), Value::Null],
        ],
    );
    assert_eq!(
        Value::SqlResult(Rc::new(result)).to_string(),
        "id | name\n1 | ada\n2 | null"
    );
}

#[test]
fn test_int_and_float_are_distinct_values() {
    assert_ne!(Value::Int(1), Value::Float(1.0));
    assert_eq!(hash_key(&[Value::Int(1)]), hash_key(&[Value::Float(1.0)]));
    assert_ne!(hash_key(&[Value::Int(1)]), hash_key(&[Value::string("1")]));
}

#[test]
fn test_hash_key_separates_tuples() {
    let ab = hash_key(&[Value::string("a"), Value::string("b")]);
    let joined = hash_key(&[Value::string("ab")]);
    assert_ne!(ab, joined);
}

#[test]
fn test_struct_field_access() {
    let mut row = StructValue::new("row", vec![("n".to_string(), Value::Int(1))]);
    assert_eq!(row.get("n"), Some(&Value::Int(1)));
    assert!(row.set("n", Value::Int(2)));
    assert!(!row.set("missing", Value::Null));
    assert_eq!(row.get("n"), Some(&Value::Int(2)));
}

#[test]
fn test_result_set_rows_as_structs() {
    let result = ResultSet::new(vec!["n".to_string()], vec![vec![Value::Int(7)]]);
    let Some(Value::Struct(row)) = result.row_struct(0) else {
        panic!("expected a row struct");
    };
    assert_eq!(row.name, ROW_STRUCT);
    assert_eq!(row.get("n"), Some(&Value::Int(7)));
    assert_eq!(result.row_struct(1), None);
}

#[test]
fn test_tables_compare_by_identity() {
    let make = || {
        let Ok(table) = crate::relational::Table::new("t", Vec::new()) else {
            panic!("empty table is valid");
        };
        LocalScope::new(table)
    };
    let first = make();
    assert_eq!(Value::Table(first.clone()), Value::Table(first));
    assert_ne!(Value::Table(make()), Value::Table(make()));
}
