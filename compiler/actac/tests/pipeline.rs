//! End-to-end tests for the host pipeline: parse, analyze, optimize, run.

use acta_eval::relational::{ColumnDef, Table};
use acta_eval::{buffer_handler, LocalScope, NoRowFilter, Value};
use acta_sema::{AllowAll, Operation, TableSchema, Visibility};
use actac::{compile_expression, run_program, RunConfig, RunError, Session, Stage};
use pretty_assertions::assert_eq;

fn quiet() -> RunConfig {
    RunConfig::default().print_handler(buffer_handler())
}

fn staff() -> Value {
    let columns = vec![
        ColumnDef::new("id", "integer").primary_key(),
        ColumnDef::new("name", "varchar").not_null(),
        ColumnDef::new("salary", "float"),
    ];
    let Ok(mut table) = Table::new("staff", columns) else {
        panic!("staff schema is valid");
    };
    for (id, name, salary) in [(1, "Ada", 120.0), (2, "Bob", 80.0), (3, "Cy", 95.5)] {
        let row = vec![
            ("id".to_string(), Value::Int(id)),
            ("name".to_string(), Value::string(name)),
            ("salary".to_string(), Value::Float(salary)),
        ];
        assert_eq!(table.insert(row), Ok(()));
    }
    Value::Table(LocalScope::new(table))
}

#[test]
fn test_sum_of_squares_with_parameter() {
    let output = run_program(
        "function sommeCarres(limite: integer): integer {
            let total = 0;
            for (let i = 0; i < limite; i = i + 1) {
                total = total + i * i;
            }
            return total;
        }
        start
            return sommeCarres(n);
        stop",
        &AllowAll,
        &NoRowFilter,
        &[("n", Value::Int(5))],
    );
    assert_eq!(output.errors, Vec::<String>::new());
    assert_eq!(output.value, Value::Int(30));
}

#[test]
fn test_constant_expression_is_folded() {
    let output = Session::new(quiet()).run("let a = 5 * 10 + 2; a;");
    assert!(output.is_ok());
    assert_eq!(output.value, Value::Int(52));
    assert!(output.stats.constant_folds >= 1);
    assert!(output.stats.rounds <= acta_opt::MAX_PASSES);
}

#[test]
fn test_optimizer_can_be_disabled() {
    let output = Session::new(quiet().without_optimizer()).run("let a = 5 * 10 + 2; a;");
    assert_eq!(output.value, Value::Int(52));
    assert_eq!(output.stats.total(), 0);
}

#[test]
fn test_optimizer_keeps_failing_statements() {
    for source in [
        "let x = 1; 9223372036854775807 + 1; x;",
        "let x = 1; date'2024-99-99'; x;",
    ] {
        let optimized = Session::new(quiet()).run(source);
        let plain = Session::new(quiet().without_optimizer()).run(source);
        assert_eq!(optimized.failed, Some(Stage::Evaluation), "{source}");
        assert_eq!(optimized.errors, plain.errors, "{source}");
    }
}

#[test]
fn test_parse_errors_stop_the_run() {
    let output = Session::new(quiet()).run("let = 3;");
    assert_eq!(output.failed, Some(Stage::Parse));
    assert!(!output.errors.is_empty());
    assert!(output.errors[0].starts_with("1:"), "{:?}", output.errors);
    assert_eq!(output.value, Value::Null);
}

#[test]
fn test_semantic_errors_stop_the_run_before_printing() {
    let handler = buffer_handler();
    let config = RunConfig::default().print_handler(handler.clone());
    let output = Session::new(config).run("print('hi');\nlet x = y;");
    assert_eq!(output.failed, Some(Stage::Analysis));
    assert_eq!(output.errors.len(), 1);
    assert!(output.errors[0].starts_with("2:"), "{:?}", output.errors);
    assert!(output.errors[0].ends_with("undefined variable `y`"));
    assert_eq!(handler.output(), "");
}

#[test]
fn test_evaluation_error_is_located() {
    let output = Session::new(quiet()).run("let a = 1;\nlet b = a / 0;");
    assert_eq!(output.failed, Some(Stage::Evaluation));
    assert_eq!(output.errors.len(), 1);
    assert!(output.errors[0].starts_with("2:"), "{:?}", output.errors);
    assert!(output.errors[0].ends_with("division by zero"));
}

#[test]
fn test_warnings_do_not_block_evaluation() {
    let output = Session::new(quiet()).run("let d = 5m; d > 3;");
    assert!(output.is_ok(), "{:?}", output.errors);
    assert_eq!(output.warnings.len(), 1);
}

#[test]
fn test_print_output_is_captured() {
    let handler = buffer_handler();
    let config = RunConfig::default().print_handler(handler.clone());
    let output = Session::new(config).run("for (let i = 0; i < 3; i = i + 1) { print(i); }");
    assert!(output.is_ok(), "{:?}", output.errors);
    assert_eq!(handler.output(), "0\n1\n2\n");
}

#[test]
fn test_host_table_parameter() {
    let output = Session::new(quiet())
        .parameter("staff", staff())
        .parameter("floor", Value::Float(90.0))
        .run("select name from staff where salary > floor order by name;");
    assert!(output.is_ok(), "{:?}", output.errors);
    let Value::SqlResult(result) = output.value else {
        panic!("expected a result set");
    };
    assert_eq!(
        result.rows,
        vec![vec![Value::string("Ada")], vec![Value::string("Cy")]]
    );
}

#[test]
fn test_visibility_policy_rejects_hidden_column() {
    let policy = |table: &str, field: &str, operation: Operation| {
        if table == "staff" && field == "salary" && operation == Operation::Select {
            Visibility::Denied("payroll only".to_string())
        } else {
            Visibility::Allowed
        }
    };
    let output = run_program(
        "select name, salary from staff;",
        &policy,
        &NoRowFilter,
        &[("staff", staff())],
    );
    assert_eq!(output.failed, Some(Stage::Analysis));
    assert!(
        output.errors[0].ends_with("select access to `staff.salary` is not allowed: payroll only"),
        "{:?}",
        output.errors
    );
}

#[test]
fn test_recursive_query_limit_is_configurable() {
    let source = "with recursive nums (n) as (
        select 1 union all select n + 1 from nums where n < 10
    ) select n from nums;";

    let Value::SqlResult(result) = Session::new(quiet()).run(source).value else {
        panic!("expected a result set");
    };
    assert_eq!(result.len(), 10);

    let limited = Session::new(quiet().max_recursive_iterations(5)).run(source);
    let Err(error) = limited.into_result() else {
        panic!("expected the iteration cap to trip");
    };
    assert_eq!(error.stage(), Stage::Evaluation);
    assert!(error
        .to_string()
        .ends_with("recursive query `nums` exceeded 5 iterations"));
}

#[test]
fn test_into_result_keeps_stage_errors() {
    let output = Session::new(quiet()).run("let a = 1; let a = 2;");
    let Err(RunError::Analysis(messages)) = output.into_result() else {
        panic!("expected semantic errors");
    };
    assert_eq!(messages.len(), 1);
    assert!(messages[0].ends_with("`a` is already declared"));
}

#[test]
fn test_check_does_not_run() {
    let handler = buffer_handler();
    let config = RunConfig::default().print_handler(handler.clone());
    let output = Session::new(config).check("print('never');");
    assert!(output.is_ok());
    assert_eq!(handler.output(), "");
}

#[test]
fn test_compile_row_expression() {
    let schema = TableSchema::new("orders")
        .column("amount", "float")
        .column("placed", "date");

    let (expr, errors) = compile_expression("o.amount > 100 and placed <= today()", &schema, Some("o"), &AllowAll);
    assert_eq!(errors, Vec::<String>::new());
    assert!(expr.is_some());

    let (expr, errors) = compile_expression("missing + 1", &schema, None, &AllowAll);
    assert!(expr.is_none());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("1:1:"), "{errors:?}");
}

#[test]
fn test_compile_expression_checks_visibility() {
    let schema = TableSchema::new("orders").column("amount", "float");
    let policy = |_: &str, _: &str, _: Operation| Visibility::Denied(String::new());
    let (expr, errors) = compile_expression("amount > 1", &schema, None, &policy);
    assert!(expr.is_none());
    assert_eq!(
        errors,
        vec!["1:1: select access to `orders.amount` is not allowed".to_string()]
    );
}

#[test]
fn test_compile_expression_reports_parse_errors() {
    let schema = TableSchema::new("orders").column("amount", "float");
    let (expr, errors) = compile_expression("amount >", &schema, None, &AllowAll);
    assert!(expr.is_none());
    assert!(!errors.is_empty());
}
