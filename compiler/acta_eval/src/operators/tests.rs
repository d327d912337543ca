use super::*;
use chrono::NaiveDate;
use crate::ValueKind;
use pretty_assertions::assert_eq;

fn date(y: i32, m: u32, d: u32) -> Value {
    let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
        panic!("invalid test date {y}-{m}-{d}");
    };
    Value::Date(date)
}

#[test]
fn test_integer_arithmetic() {
    assert_eq!(
        evaluate_binary(BinaryOp::Add, &Value::Int(2), &Value::Int(3)),
        Ok(Value::Int(5))
    );
    assert_eq!(
        evaluate_binary(BinaryOp::Div, &Value::Int(7), &Value::Int(2)),
        Ok(Value::Int(3))
    );
    assert_eq!(
        evaluate_binary(BinaryOp::Mod, &Value::Int(7), &Value::Int(2)),
        Ok(Value::Int(1))
    );
}

#[test]
fn test_mixed_arithmetic_widens() {
    assert_eq!(
        evaluate_binary(BinaryOp::Mul, &Value::Int(2), &Value::Float(1.5)),
        Ok(Value::Float(3.0))
    );
}

#[test]
fn test_division_by_zero() {
    assert_eq!(
        evaluate_binary(BinaryOp::Div, &Value::Int(1), &Value::Int(0)),
        Err(EvalErrorKind::DivisionByZero)
    );
    assert_eq!(
        evaluate_binary(BinaryOp::Mod, &Value::Float(1.0), &Value::Int(0)),
        Err(EvalErrorKind::DivisionByZero)
    );
}

#[test]
fn test_integer_overflow() {
    assert_eq!(
        evaluate_binary(BinaryOp::Add, &Value::Int(i64::MAX), &Value::Int(1)),
        Err(EvalErrorKind::IntegerOverflow("+"))
    );
    assert_eq!(
        evaluate_unary(UnaryOp::Neg, &Value::Int(i64::MIN)),
        Err(EvalErrorKind::IntegerOverflow("-"))
    );
}

#[test]
fn test_string_concatenation() {
    assert_eq!(
        evaluate_binary(BinaryOp::Add, &Value::string("n = "), &Value::Int(4)),
        Ok(Value::string("n = 4"))
    );
    assert_eq!(
        evaluate_binary(BinaryOp::Sub, &Value::string("a"), &Value::string("b")),
        Err(EvalErrorKind::InvalidOperands {
            op: "-",
            left: ValueKind::Str,
            right: ValueKind::Str,
        })
    );
}

#[test]
fn test_null_propagation() {
    assert_eq!(
        evaluate_binary(BinaryOp::Add, &Value::Null, &Value::Int(1)),
        Ok(Value::Null)
    );
    assert_eq!(
        evaluate_binary(BinaryOp::Lt, &Value::Null, &Value::Int(1)),
        Ok(Value::Bool(false))
    );
    assert_eq!(
        evaluate_binary(BinaryOp::Eq, &Value::Null, &Value::Null),
        Ok(Value::Bool(true))
    );
    assert_eq!(evaluate_unary(UnaryOp::Not, &Value::Null), Ok(Value::Null));
}

#[test]
fn test_equality_widens_numbers() {
    assert!(loose_eq(&Value::Int(1), &Value::Float(1.0)));
    assert!(!loose_eq(&Value::Int(1), &Value::string("1")));
    assert_ne!(Value::Int(1), Value::Float(1.0));
}

#[test]
fn test_membership() {
    let array = Value::array(vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(
        evaluate_binary(BinaryOp::In, &Value::Float(2.0), &array),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        evaluate_binary(BinaryOp::In, &Value::string("ell"), &Value::string("hello")),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        evaluate_binary(BinaryOp::In, &Value::Int(3), &array),
        Ok(Value::Bool(false))
    );
}

#[test]
fn test_date_arithmetic() {
    let week = Value::Duration(TimeDelta::days(7));
    assert_eq!(
        evaluate_binary(BinaryOp::Add, &date(2024, 2, 26), &week),
        Ok(date(2024, 3, 4))
    );
    assert_eq!(
        evaluate_binary(BinaryOp::Sub, &date(2024, 3, 4), &date(2024, 2, 26)),
        Ok(week)
    );
}

#[test]
fn test_time_wraps_around_midnight() {
    let Some(late) = parse_time("23:30") else {
        panic!("time literal should parse");
    };
    let Some(early) = parse_time("00:30") else {
        panic!("time literal should parse");
    };
    assert_eq!(
        evaluate_binary(
            BinaryOp::Add,
            &Value::Time(late),
            &Value::Duration(TimeDelta::hours(1))
        ),
        Ok(Value::Time(early))
    );
}

#[test]
fn test_duration_scaling() {
    let hour = Value::Duration(TimeDelta::hours(1));
    assert_eq!(
        evaluate_binary(BinaryOp::Mul, &hour, &Value::Int(2)),
        Ok(Value::Duration(TimeDelta::hours(2)))
    );
    assert_eq!(
        evaluate_binary(BinaryOp::Div, &hour, &Value::Duration(TimeDelta::minutes(30))),
        Ok(Value::Float(2.0))
    );
}

#[test]
fn test_compare_dates_with_strings() {
    assert_eq!(
        compare(&date(2024, 1, 2), &Value::string("2024-01-01")),
        Some(Ordering::Greater)
    );
    assert_eq!(compare(&date(2024, 1, 2), &Value::string("not a date")), None);
}

#[test]
fn test_sort_order_puts_null_first() {
    assert_eq!(sort_order(&Value::Null, &Value::Int(0)), Ordering::Less);
    assert_eq!(sort_order(&Value::Int(0), &Value::Null), Ordering::Greater);
    assert_eq!(
        sort_order(&Value::string("a"), &Value::Int(1)),
        Ordering::Equal
    );
}

#[test]
fn test_ordering_incomparable_is_error() {
    assert_eq!(
        evaluate_binary(BinaryOp::Lt, &Value::Bool(true), &Value::Int(1)),
        Err(EvalErrorKind::InvalidOperands {
            op: "<",
            left: ValueKind::Bool,
            right: ValueKind::Int,
        })
    );
}
