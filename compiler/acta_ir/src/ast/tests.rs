use super::*;
use crate::Span;
use pretty_assertions::assert_eq;

#[test]
fn test_binary_span_covers_both_operands() {
    let left = Expr::new(ExprKind::Int(1), Span::new(0, 1));
    let right = Expr::new(ExprKind::Int(2), Span::new(4, 5));
    let expr = Expr::binary(BinaryOp::Add, left, right);
    assert_eq!(expr.span, Span::new(0, 5));
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    assert!(BinaryOp::Mul.precedence() < BinaryOp::Add.precedence());
    assert!(BinaryOp::Add.precedence() < BinaryOp::Lt.precedence());
    assert!(BinaryOp::And.precedence() < BinaryOp::Or.precedence());
}

#[test]
fn test_duration_units_convert_to_millis() {
    assert_eq!(DurationUnit::Minutes.to_millis(2), Some(120_000));
    assert_eq!(DurationUnit::Days.to_millis(1), Some(86_400_000));
    assert_eq!(DurationUnit::Days.to_millis(i64::MAX), None);
}

#[test]
fn test_select_item_output_names() {
    let aliased = SelectItem::Expr {
        expr: Expr::int(1),
        alias: Some("one".to_string()),
    };
    let column = SelectItem::Expr {
        expr: Expr::ident("salary"),
        alias: None,
    };
    let computed = SelectItem::Expr {
        expr: Expr::binary(BinaryOp::Add, Expr::int(1), Expr::int(2)),
        alias: None,
    };
    assert_eq!(aliased.output_name(0), "one");
    assert_eq!(column.output_name(1), "salary");
    assert_eq!(computed.output_name(2), "column3");
}

#[test]
fn test_type_expr_display() {
    let ty = TypeExpr::array(TypeExpr::named("integer"), Some(3));
    assert_eq!(ty.to_string(), "integer[3]");
    assert_eq!(TypeExpr::array(TypeExpr::named("string"), None).to_string(), "string[]");
}

#[test]
fn test_column_types_accept_sql_spellings() {
    use crate::builtins::ColumnType;
    assert_eq!(ColumnType::from_name("VARCHAR"), ColumnType::String);
    assert_eq!(ColumnType::from_name("int"), ColumnType::Integer);
    assert_eq!(ColumnType::from_name("real"), ColumnType::Float);
    assert_eq!(ColumnType::from_name("blob"), ColumnType::Any);
}
