use super::*;
use acta_ir::Span;
use pretty_assertions::assert_eq;

use crate::errors::{ControlFlow, EvalErrorKind};
use crate::Value;

fn people() -> Table {
    let columns = vec![
        ColumnDef::new("id", "integer").primary_key(),
        ColumnDef::new("email", "varchar").unique(),
        ColumnDef::new("score", "float").default_value(Value::Int(0)),
        ColumnDef::new("name", "varchar").not_null(),
    ];
    let Ok(table) = Table::new("people", columns) else {
        panic!("people schema is valid");
    };
    table
}

fn row(id: i64, email: &str, name: &str) -> Vec<(String, Value)> {
    vec![
        ("id".to_string(), Value::Int(id)),
        ("email".to_string(), Value::string(email)),
        ("name".to_string(), Value::string(name)),
    ]
}

fn int_rows(values: &[(i64, Option<i64>)]) -> Vec<Vec<Value>> {
    values
        .iter()
        .map(|(key, parent)| vec![Value::Int(*key), parent.map_or(Value::Null, Value::Int)])
        .collect()
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

#[test]
fn test_insert_applies_defaults_and_widening() {
    let mut table = people();
    assert_eq!(table.insert(row(1, "a@x", "Ada")), Ok(()));
    assert_eq!(table.len(), 1);
    assert_eq!(
        table.row_values(0),
        vec![
            Value::Int(1),
            Value::string("a@x"),
            Value::Float(0.0),
            Value::string("Ada"),
        ]
    );
}

#[test]
fn test_primary_key_and_unique_constraints() {
    let mut table = people();
    assert_eq!(table.insert(row(1, "a@x", "Ada")), Ok(()));
    assert_eq!(
        table.insert(row(1, "b@x", "Bob")),
        Err(EvalErrorKind::PrimaryKeyViolation {
            table: "people".to_string(),
            column: "id".to_string(),
            value: "1".to_string(),
        })
    );
    assert_eq!(
        table.insert(row(2, "a@x", "Bob")),
        Err(EvalErrorKind::UniqueViolation {
            table: "people".to_string(),
            column: "email".to_string(),
            value: "a@x".to_string(),
        })
    );
    assert_eq!(table.len(), 1);
}

#[test]
fn test_not_null_constraint() {
    let mut table = people();
    let missing_name = vec![("id".to_string(), Value::Int(1))];
    assert_eq!(
        table.insert(missing_name),
        Err(EvalErrorKind::NotNullViolation {
            table: "people".to_string(),
            column: "name".to_string(),
        })
    );
}

#[test]
fn test_column_type_mismatch() {
    let mut table = people();
    let mut bad = row(1, "a@x", "Ada");
    bad[0].1 = Value::string("one");
    assert!(matches!(
        table.insert(bad),
        Err(EvalErrorKind::ColumnTypeMismatch { .. })
    ));
}

#[test]
fn test_update_may_keep_its_own_key() {
    let mut table = people();
    assert_eq!(table.insert(row(1, "a@x", "Ada")), Ok(()));
    assert_eq!(table.insert(row(2, "b@x", "Bob")), Ok(()));
    assert_eq!(
        table.update_rows(vec![(0, vec![("id".to_string(), Value::Int(1))])]),
        Ok(1)
    );
    assert!(matches!(
        table.update_rows(vec![(0, vec![("id".to_string(), Value::Int(2))])]),
        Err(EvalErrorKind::PrimaryKeyViolation { .. })
    ));
}

#[test]
fn test_update_checks_the_final_rows() {
    let mut table = people();
    assert_eq!(table.insert(row(1, "a@x", "Ada")), Ok(()));
    assert_eq!(table.insert(row(2, "b@x", "Bob")), Ok(()));
    let shift = |id: i64| vec![("id".to_string(), Value::Int(id))];

    assert_eq!(table.update_rows(vec![(0, shift(2)), (1, shift(3))]), Ok(2));
    assert_eq!(table.row_values(0)[0], Value::Int(2));
    assert_eq!(table.row_values(1)[0], Value::Int(3));

    let clash = |email: &str| vec![("email".to_string(), Value::string(email))];
    assert!(matches!(
        table.update_rows(vec![(0, clash("z@x")), (1, clash("z@x"))]),
        Err(EvalErrorKind::UniqueViolation { .. })
    ));
    assert_eq!(table.row_values(0)[1], Value::string("a@x"));
}

#[test]
fn test_insert_rows_is_all_or_nothing() {
    let mut table = people();
    assert_eq!(table.insert(row(1, "a@x", "Ada")), Ok(()));
    assert!(matches!(
        table.insert_rows(vec![row(2, "b@x", "Bob"), row(3, "b@x", "Cy")]),
        Err(EvalErrorKind::UniqueViolation { .. })
    ));
    assert_eq!(table.len(), 1);
    assert_eq!(
        table.insert_rows(vec![row(2, "b@x", "Bob"), row(3, "c@x", "Cy")]),
        Ok(2)
    );
    assert_eq!(table.len(), 3);
}

#[test]
fn test_add_unique_column_with_shared_default_is_rejected() {
    let mut table = people();
    assert_eq!(table.insert(row(1, "a@x", "Ada")), Ok(()));
    assert_eq!(table.insert(row(2, "b@x", "Bob")), Ok(()));
    let badge = ColumnDef::new("badge", "integer")
        .unique()
        .default_value(Value::Int(7));
    assert!(matches!(
        table.add_column(badge),
        Err(EvalErrorKind::UniqueViolation { .. })
    ));
    assert_eq!(table.column_names(), columns(&["id", "email", "score", "name"]));
    assert_eq!(table.row_values(0).len(), 4);
}

#[test]
fn test_unique_index_ignores_null_parts() {
    let columns = vec![ColumnDef::new("a", "integer"), ColumnDef::new("b", "integer")];
    let Ok(mut table) = Table::new("pairs", columns) else {
        panic!("pairs schema is valid");
    };
    let index = IndexDef {
        name: "pairs_ab".to_string(),
        columns: vec!["a".to_string(), "b".to_string()],
        unique: true,
    };
    assert_eq!(table.create_index(index), Ok(()));

    let pair = |a: Value, b: Value| vec![("a".to_string(), a), ("b".to_string(), b)];
    assert_eq!(table.insert(pair(Value::Int(1), Value::Null)), Ok(()));
    assert_eq!(table.insert(pair(Value::Int(1), Value::Null)), Ok(()));
    assert_eq!(table.insert(pair(Value::Int(1), Value::Int(2))), Ok(()));
    assert_eq!(
        table.insert(pair(Value::Int(1), Value::Int(2))),
        Err(EvalErrorKind::UniqueIndexViolation("pairs_ab".to_string()))
    );
}

#[test]
fn test_schema_errors() {
    let duplicate = vec![ColumnDef::new("a", "integer"), ColumnDef::new("a", "varchar")];
    assert!(matches!(
        Table::new("t", duplicate),
        Err(EvalErrorKind::DuplicateColumn { .. })
    ));
    let two_keys = vec![
        ColumnDef::new("a", "integer").primary_key(),
        ColumnDef::new("b", "integer").primary_key(),
    ];
    assert!(matches!(
        Table::new("t", two_keys),
        Err(EvalErrorKind::MultiplePrimaryKeys(_))
    ));
}

#[test]
fn test_alter_columns() {
    let mut table = people();
    assert_eq!(table.insert(row(1, "a@x", "Ada")), Ok(()));
    let active = ColumnDef::new("active", "boolean").default_value(Value::Bool(true));
    assert_eq!(table.add_column(active), Ok(()));
    assert_eq!(table.row_values(0).last(), Some(&Value::Bool(true)));

    assert_eq!(table.drop_column("email"), Ok(()));
    assert_eq!(
        table.column_names(),
        columns(&["id", "score", "name", "active"])
    );
    assert!(matches!(
        table.drop_column("email"),
        Err(EvalErrorKind::UnknownColumn { .. })
    ));
}

#[test]
fn test_delete_rows_by_mask() {
    let mut table = people();
    for (id, email) in [(1, "a"), (2, "b"), (3, "c")] {
        assert_eq!(table.insert(row(id, email, "x")), Ok(()));
    }
    assert_eq!(table.delete_rows(&[true, false, true]), 2);
    assert_eq!(table.row_values(0)[0], Value::Int(2));
}

#[test]
fn test_hierarchy_levels() {
    // 1 -> 2 -> 4, 1 -> 3, 5 has a dangling parent and becomes a root.
    let rows = int_rows(&[(1, None), (2, Some(1)), (3, Some(1)), (4, Some(2)), (5, Some(99))]);
    let Ok(tree) = HierarchicalTree::build("t", &columns(&["id", "parent"]), &rows, "id", "parent")
    else {
        panic!("tree should build");
    };

    let keys = |ids: Vec<NodeId>| -> Vec<Value> { ids.into_iter().map(|id| tree.key(id).clone()).collect() };
    assert_eq!(tree.roots().len(), 2);
    assert_eq!(
        keys(tree.traverse()),
        vec![Value::Int(1), Value::Int(2), Value::Int(4), Value::Int(3), Value::Int(5)]
    );
    let levels: Vec<usize> = tree.traverse().into_iter().map(|id| tree.level(id)).collect();
    assert_eq!(levels, vec![0, 1, 2, 1, 0]);

    let four = tree.traverse()[2];
    let Some(parent) = tree.parent(four) else {
        panic!("node 4 has a parent");
    };
    assert_eq!(tree.key(parent), &Value::Int(2));
}

#[test]
fn test_hierarchy_cycle_is_error() {
    let rows = int_rows(&[(1, None), (2, Some(3)), (3, Some(2))]);
    let result = HierarchicalTree::build("t", &columns(&["id", "parent"]), &rows, "id", "parent");
    assert!(matches!(result, Err(EvalErrorKind::HierarchyCycle(2))));
}

#[test]
fn test_hierarchy_unknown_column() {
    let rows = int_rows(&[(1, None)]);
    let result = HierarchicalTree::build("t", &columns(&["id", "parent"]), &rows, "id", "boss");
    assert!(matches!(result, Err(EvalErrorKind::UnknownColumn { .. })));
}

fn keys(partition: i64, order: i64) -> WindowKeys {
    WindowKeys {
        partition: vec![Value::Int(partition)],
        order: vec![Value::Int(order)],
    }
}

#[test]
fn test_rank_rows() {
    let rows = vec![keys(1, 10), keys(1, 20), keys(1, 20), keys(1, 30), keys(2, 5)];
    assert_eq!(
        rank_rows(RankingFunction::RowNumber, &rows, &[false]),
        vec![1, 2, 3, 4, 1]
    );
    assert_eq!(
        rank_rows(RankingFunction::Rank, &rows, &[false]),
        vec![1, 2, 2, 4, 1]
    );
    assert_eq!(
        rank_rows(RankingFunction::DenseRank, &rows, &[false]),
        vec![1, 2, 2, 3, 1]
    );
}

#[test]
fn test_rank_rows_descending() {
    let rows = vec![keys(1, 10), keys(1, 30), keys(1, 20)];
    assert_eq!(
        rank_rows(RankingFunction::Rank, &rows, &[true]),
        vec![3, 1, 2]
    );
}

#[test]
fn test_ranking_function_names() {
    assert_eq!(RankingFunction::from_name("ROW_NUMBER"), Some(RankingFunction::RowNumber));
    assert_eq!(RankingFunction::from_name("lag"), None);
}

#[test]
fn test_fixpoint_counts_to_limit() {
    let step = |working: &[Vec<Value>]| -> Result<Vec<Vec<Value>>, ControlFlow> {
        Ok(working
            .iter()
            .filter_map(|row| match row[0] {
                Value::Int(n) if n < 5 => Some(vec![Value::Int(n + 1)]),
                _ => None,
            })
            .collect())
    };
    let Ok(rows) = fixpoint("nums", vec![vec![Value::Int(1)]], false, 1000, Span::DUMMY, step) else {
        panic!("fixpoint should converge");
    };
    assert_eq!(rows.len(), 5);
    assert_eq!(rows.last(), Some(&vec![Value::Int(5)]));
}

#[test]
fn test_fixpoint_union_discards_seen_rows() {
    // Without `all`, re-deriving the seed ends the recursion.
    let step = |_: &[Vec<Value>]| -> Result<Vec<Vec<Value>>, ControlFlow> { Ok(vec![vec![Value::Int(1)]]) };
    let Ok(rows) = fixpoint("same", vec![vec![Value::Int(1)]], false, 10, Span::DUMMY, step) else {
        panic!("fixpoint should converge");
    };
    assert_eq!(rows, vec![vec![Value::Int(1)]]);
}

#[test]
fn test_fixpoint_iteration_cap() {
    let step = |working: &[Vec<Value>]| -> Result<Vec<Vec<Value>>, ControlFlow> {
        Ok(working
            .iter()
            .filter_map(|row| match row[0] {
                Value::Int(n) => Some(vec![Value::Int(n + 1)]),
                _ => None,
            })
            .collect())
    };
    let result = fixpoint("forever", vec![vec![Value::Int(1)]], true, 3, Span::DUMMY, step);
    let Err(ControlFlow::Error(error)) = result else {
        panic!("expected the iteration cap to trip");
    };
    assert_eq!(
        error.kind,
        EvalErrorKind::RecursionLimit {
            name: "forever".to_string(),
            limit: 3,
        }
    );
}
