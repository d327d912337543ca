#![allow(clippy::unwrap_used, reason = "tests unwrap parse results")]

use super::*;
use acta_ir::{
    AlterAction, BinaryOp, ExprKind, InsertSource, SelectItem, StmtKind, TypeExprKind, UnaryOp,
};
use pretty_assertions::assert_eq;

fn parse_ok(source: &str) -> Program {
    let output = parse_program(source);
    let errors: Vec<String> = output.diagnostics.iter().map(|d| d.message.clone()).collect();
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
    output.program
}

fn single(source: &str) -> StmtKind {
    let mut program = parse_ok(source);
    assert_eq!(program.statements.len(), 1);
    program.statements.remove(0).kind
}

#[test]
fn test_let_with_type_and_init() {
    let StmtKind::Let { name, ty, init } = single("let a: integer[3] = [1, 2, 3];") else {
        panic!("expected let");
    };
    assert_eq!(name, "a");
    let ty = ty.unwrap();
    assert_eq!(ty.to_string(), "integer[3]");
    assert!(matches!(ty.kind, TypeExprKind::Array { size: Some(3), .. }));
    assert!(matches!(init.unwrap().kind, ExprKind::Array(ref items) if items.len() == 3));
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let StmtKind::Let { init, .. } = single("let a = 5 * 10 + 2;") else {
        panic!("expected let");
    };
    let ExprKind::Binary { op, left, right } = init.unwrap().kind else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    assert_eq!(right.kind, ExprKind::Int(2));
}

#[test]
fn test_subtraction_is_left_associative() {
    let StmtKind::Expr(expr) = single("10 - 3 - 2;") else {
        panic!("expected expression");
    };
    let ExprKind::Binary { left, right, .. } = expr.kind else {
        panic!("expected binary");
    };
    assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
    assert_eq!(right.kind, ExprKind::Int(2));
}

#[test]
fn test_assignment_is_right_associative() {
    let StmtKind::Expr(expr) = single("a = b = 1;") else {
        panic!("expected expression");
    };
    let ExprKind::Assign { value, .. } = expr.kind else {
        panic!("expected assignment");
    };
    assert!(matches!(value.kind, ExprKind::Assign { .. }));
}

#[test]
fn test_logical_operators_and_unary_not() {
    let StmtKind::Expr(expr) = single("not a and b or c;") else {
        panic!("expected expression");
    };
    let ExprKind::Binary { op, left, .. } = expr.kind else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Or);
    let ExprKind::Binary { op, left, .. } = left.kind else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::And);
    assert!(matches!(left.kind, ExprKind::Unary { op: UnaryOp::Not, .. }));
}

#[test]
fn test_function_declaration_and_call() {
    let program = parse_ok(
        "function sommeCarres(limite: integer): integer {
            let total = 0;
            for (let i = 0; i < limite; i = i + 1) {
                total = total + i * i;
            }
            return total;
        }
        start
            return sommeCarres(5);
        stop",
    );
    assert_eq!(program.statements.len(), 2);
    let StmtKind::Function(decl) = &program.statements[0].kind else {
        panic!("expected function");
    };
    assert_eq!(decl.name, "sommeCarres");
    assert_eq!(decl.params.len(), 1);
    assert_eq!(decl.return_type.as_ref().unwrap().to_string(), "integer");
    assert_eq!(decl.body.statements.len(), 3);
    assert!(matches!(
        decl.body.statements[1].kind,
        StmtKind::For { init: Some(_), cond: Some(_), update: Some(_), .. }
    ));
    assert!(matches!(program.statements[1].kind, StmtKind::Return(Some(_))));
}

#[test]
fn test_for_in_with_and_without_parens() {
    assert!(matches!(single("for x in items { print(x); }"), StmtKind::ForIn { .. }));
    assert!(matches!(single("for (x in items) { }"), StmtKind::ForIn { .. }));
}

#[test]
fn test_switch_cases_and_default() {
    let StmtKind::Switch { cases, .. } = single(
        "switch x {
            case 1, 2:
                print(\"low\");
                fallthrough;
            case 3:
                break;
            default:
                print(\"other\");
        }",
    ) else {
        panic!("expected switch");
    };
    assert_eq!(cases.len(), 3);
    assert_eq!(cases[0].values.len(), 2);
    assert_eq!(cases[0].body.len(), 2);
    assert!(matches!(cases[1].body[0].kind, StmtKind::Break));
    assert!(cases[2].is_default());
}

#[test]
fn test_else_if_chain() {
    let StmtKind::If { else_branch, .. } = single("if a { } else if b { } else { }") else {
        panic!("expected if");
    };
    let else_branch = else_branch.unwrap();
    let StmtKind::If { else_branch, .. } = else_branch.kind else {
        panic!("expected nested if");
    };
    assert!(matches!(else_branch.unwrap().kind, StmtKind::Block(_)));
}

#[test]
fn test_struct_declaration_and_field_assignment() {
    let program = parse_ok("struct Point { x: integer, y: integer } let p: Point; p.x = 3;");
    assert_eq!(program.statements.len(), 3);
    let StmtKind::Struct(decl) = &program.statements[0].kind else {
        panic!("expected struct");
    };
    assert_eq!(decl.fields.len(), 2);
    let StmtKind::Expr(expr) = &program.statements[2].kind else {
        panic!("expected expression");
    };
    let ExprKind::Assign { target, .. } = &expr.kind else {
        panic!("expected assignment");
    };
    assert!(matches!(target.kind, ExprKind::Field { .. }));
}

#[test]
fn test_literal_kinds() {
    let StmtKind::Expr(expr) = single("[date'2024-01-02', time'10:30', 90s, 1.5, 'x', null];")
    else {
        panic!("expected expression");
    };
    let ExprKind::Array(items) = expr.kind else {
        panic!("expected array");
    };
    assert_eq!(items[0].kind, ExprKind::Date("2024-01-02".into()));
    assert_eq!(items[1].kind, ExprKind::Time("10:30".into()));
    assert!(matches!(items[2].kind, ExprKind::Duration { value: 90, .. }));
    assert_eq!(items[3].kind, ExprKind::Float(1.5));
    assert_eq!(items[4].kind, ExprKind::Str("x".into()));
    assert_eq!(items[5].kind, ExprKind::Null);
}

#[test]
fn test_is_null_and_is_not_null() {
    let StmtKind::Expr(expr) = single("a is not null;") else {
        panic!("expected expression");
    };
    assert!(matches!(expr.kind, ExprKind::IsNull { negated: true, .. }));
}

#[test]
fn test_create_table_with_constraints() {
    let StmtKind::CreateTable(create) = single(
        "create table emp (
            id integer primary key,
            name string not null,
            email string unique,
            salary float default 0.0
        );",
    ) else {
        panic!("expected create table");
    };
    assert_eq!(create.name, "emp");
    assert_eq!(create.columns.len(), 4);
    assert!(create.columns[0].primary_key);
    assert!(create.columns[1].not_null);
    assert!(create.columns[2].unique);
    assert_eq!(create.columns[3].default.as_ref().unwrap().kind, ExprKind::Float(0.0));
}

#[test]
fn test_create_unique_index() {
    let StmtKind::CreateIndex(index) = single("CREATE UNIQUE INDEX by_name ON emp (name);")
    else {
        panic!("expected create index");
    };
    assert!(index.unique);
    assert_eq!(index.table, "emp");
    assert_eq!(index.columns, vec!["name".to_string()]);
}

#[test]
fn test_alter_table_actions() {
    let StmtKind::AlterTable(alter) = single("alter table emp add column age integer;") else {
        panic!("expected alter");
    };
    assert!(matches!(alter.action, AlterAction::AddColumn(ref c) if c.name == "age"));
    let StmtKind::AlterTable(alter) = single("alter table emp drop age;") else {
        panic!("expected alter");
    };
    assert_eq!(alter.action, AlterAction::DropColumn("age".into()));
}

#[test]
fn test_insert_values_and_select() {
    let StmtKind::Insert(insert) = single("insert into t (a, b) values (1, 'x'), (2, 'y');")
    else {
        panic!("expected insert");
    };
    assert_eq!(insert.columns, vec!["a".to_string(), "b".to_string()]);
    assert!(matches!(insert.source, InsertSource::Values(ref rows) if rows.len() == 2));

    let StmtKind::Insert(insert) = single("insert into t select * from u;") else {
        panic!("expected insert");
    };
    assert!(matches!(insert.source, InsertSource::Query(_)));
}

#[test]
fn test_update_uses_equals_as_comparison_in_where() {
    let StmtKind::Update(update) = single("update t set a = a + 1 where b = 2;") else {
        panic!("expected update");
    };
    assert_eq!(update.assignments.len(), 1);
    assert!(matches!(
        update.filter.unwrap().kind,
        ExprKind::Binary { op: BinaryOp::Eq, .. }
    ));
}

#[test]
fn test_select_with_all_clauses() {
    let StmtKind::Expr(expr) = single(
        "select distinct name, salary * 2 as double_pay from emp e
         where salary > 10 order by name desc, salary limit 5;",
    ) else {
        panic!("expected query");
    };
    let ExprKind::Query(query) = expr.kind else {
        panic!("expected query");
    };
    let select = &query.body.first;
    assert!(select.distinct);
    assert_eq!(select.projection.len(), 2);
    assert_eq!(select.projection[1].output_name(1), "double_pay");
    assert_eq!(select.from.as_ref().unwrap().alias.as_deref(), Some("e"));
    assert!(select.filter.is_some());
    assert_eq!(select.order_by.len(), 2);
    assert!(select.order_by[0].descending);
    assert!(!select.order_by[1].descending);
    assert!(select.limit.is_some());
}

#[test]
fn test_recursive_cte_with_union_all() {
    let StmtKind::Expr(expr) = single(
        "with recursive nums (n) as (
            select 1 union all select n + 1 from nums where n < 5
        ) select n from nums;",
    ) else {
        panic!("expected query");
    };
    let ExprKind::Query(query) = expr.kind else {
        panic!("expected query");
    };
    let with = query.with.unwrap();
    assert!(with.recursive);
    assert_eq!(with.ctes[0].name, "nums");
    assert_eq!(with.ctes[0].columns, vec!["n".to_string()]);
    assert_eq!(with.ctes[0].body.rest.len(), 1);
    assert!(with.ctes[0].body.rest[0].all);
}

#[test]
fn test_hierarchy_and_window_clauses() {
    let StmtKind::Expr(expr) = single(
        "select name, level, row_number() over (partition by dept order by salary desc) as rn
         from emp hierarchy by id parent manager_id start with manager_id is null;",
    ) else {
        panic!("expected query");
    };
    let ExprKind::Query(query) = expr.kind else {
        panic!("expected query");
    };
    let select = &query.body.first;
    let hierarchy = select.hierarchy.as_ref().unwrap();
    assert_eq!(hierarchy.key, "id");
    assert_eq!(hierarchy.parent, "manager_id");
    assert!(hierarchy.start_with.is_some());
    let SelectItem::Window(window) = &select.projection[2] else {
        panic!("expected window item");
    };
    assert_eq!(window.function, "row_number");
    assert_eq!(window.partition_by.len(), 1);
    assert!(window.order_by[0].descending);
    assert_eq!(window.alias.as_deref(), Some("rn"));
}

#[test]
fn test_errors_are_collected_and_parsing_continues() {
    let output = parse_program("let = 1; let ok = 2; let x = (3;");
    assert_eq!(output.diagnostics.error_count(), 2);
    assert!(output
        .program
        .statements
        .iter()
        .any(|s| matches!(&s.kind, StmtKind::Let { name, .. } if name == "ok")));
}

#[test]
fn test_unclosed_start_section_is_reported() {
    let output = parse_program("start let a = 1;");
    assert!(output.has_errors());
    assert_eq!(output.program.statements.len(), 1);
}

#[test]
fn test_invalid_characters_are_reported() {
    let output = parse_program("let a = 1 @ 2;");
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.message == "unrecognized token `@`"));
}

#[test]
fn test_standalone_expression_compares_with_equals() {
    let output = parse_expression("e.salary = 10 and name != 'bob'");
    assert!(output.diagnostics.is_empty());
    let expr = output.expr.unwrap();
    let ExprKind::Binary { op, left, .. } = expr.kind else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::And);
    assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Eq, .. }));
}

#[test]
fn test_standalone_expression_rejects_trailing_tokens() {
    let output = parse_expression("a b");
    assert!(output.expr.is_none());
    assert!(output.diagnostics.has_errors());
}
