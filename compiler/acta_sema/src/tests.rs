#![allow(clippy::unwrap_used, reason = "tests unwrap parse results")]

use super::*;
use acta_diagnostic::Diagnostic;
use acta_parse::{parse_expression, parse_program};
use pretty_assertions::assert_eq;

fn analyze_with(
    source: &str,
    policy: &dyn VisibilityPolicy,
) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
    let output = parse_program(source);
    assert!(!output.has_errors(), "parse errors in test source");
    let builtins = BuiltinTypes::new();
    let mut analyzer = Analyzer::new(&builtins, policy);
    let errors = analyzer.analyze(&output.program);
    (errors, analyzer.warnings().to_vec())
}

fn errors(source: &str) -> Vec<String> {
    analyze_with(source, &AllowAll)
        .0
        .into_iter()
        .map(|d| d.message)
        .collect()
}

fn assert_clean(source: &str) {
    let found = errors(source);
    assert!(found.is_empty(), "unexpected errors: {found:?}");
}

#[test]
fn test_well_typed_program_has_no_errors() {
    assert_clean(
        "function sommeCarres(limite: integer): integer {
            let total = 0;
            for (let i = 1; i <= limite; i = i + 1) {
                total = total + i * i;
            }
            return total;
        }
        let r = sommeCarres(4);",
    );
}

#[test]
fn test_redeclaration_in_same_scope() {
    assert_eq!(
        errors("let a = 1; let a = 2;"),
        vec!["`a` is already declared".to_string()]
    );
}

#[test]
fn test_shadowing_outer_name_is_rejected() {
    assert_eq!(
        errors("let a = 1; if (true) { let a = 2; }"),
        vec!["`a` is already declared".to_string()]
    );
}

#[test]
fn test_sibling_blocks_may_reuse_names() {
    assert_clean("if (true) { let a = 1; } else { let a = 2; }");
}

#[test]
fn test_undefined_variable() {
    assert_eq!(
        errors("let a = b + 1;"),
        vec!["undefined variable `b`".to_string()]
    );
}

#[test]
fn test_declared_type_mismatch() {
    assert_eq!(
        errors("let a: integer = \"text\";"),
        vec!["cannot initialize `a` of type integer with a value of type string".to_string()]
    );
}

#[test]
fn test_integer_widens_to_float() {
    assert_clean("let f: float = 3; let g = f + 1;");
}

#[test]
fn test_unknown_type_name() {
    assert_eq!(errors("let a: money = 1;"), vec!["unknown type `money`".to_string()]);
}

#[test]
fn test_struct_fields_resolve() {
    assert_clean(
        "struct Point { x: integer, y: integer }
        function norm(p: Point): integer { return p.x * p.x + p.y * p.y; }",
    );
    assert_eq!(
        errors(
            "struct Point { x: integer }
            function get(p: Point): integer { return p.z; }"
        ),
        vec!["`Point` has no field `z`".to_string()]
    );
}

#[test]
fn test_break_outside_loop() {
    assert_eq!(
        errors("break;"),
        vec!["`break` outside of a loop or switch".to_string()]
    );
}

#[test]
fn test_break_inside_switch_is_allowed() {
    assert_clean(
        "let x = 2;
        switch (x) {
            case 1: print(\"one\"); break;
            case 2, 3: print(\"small\");
            default: print(\"other\");
        }",
    );
}

#[test]
fn test_break_does_not_cross_function_boundary() {
    assert_eq!(
        errors("while (true) { function f() { break; } }"),
        vec!["`break` outside of a loop or switch".to_string()]
    );
}

#[test]
fn test_continue_needs_a_loop() {
    assert_eq!(
        errors("let x = 1; switch (x) { case 1: continue; }"),
        vec!["`continue` outside of a loop".to_string()]
    );
    assert_clean(
        "for (let i = 0; i < 3; i = i + 1) {
            switch (i) { case 1: continue; default: print(i); }
        }",
    );
}

#[test]
fn test_fallthrough_outside_case() {
    assert_eq!(
        errors("while (true) { fallthrough; }"),
        vec!["`fallthrough` outside of a switch case".to_string()]
    );
}

#[test]
fn test_non_boolean_condition() {
    assert_eq!(
        errors("if (1) { print(1); }"),
        vec!["if condition must be boolean, found integer".to_string()]
    );
}

#[test]
fn test_function_arity_and_argument_types() {
    let found = errors(
        "function f(a: integer, b: string): integer { return a; }
        let x = f(1);
        let y = f(1, 2);",
    );
    assert_eq!(
        found,
        vec![
            "function `f` expects 2 argument(s), found 1".to_string(),
            "argument 2 of `f` expects string, found integer".to_string(),
        ]
    );
}

#[test]
fn test_recursive_function_resolves_itself() {
    assert_clean(
        "function fact(n: integer): integer {
            if (n <= 1) { return 1; }
            return n * fact(n - 1);
        }",
    );
}

#[test]
fn test_builtin_arity() {
    assert_eq!(
        errors("let n = len();"),
        vec!["builtin `len` expects 1 argument(s), found 0".to_string()]
    );
}

#[test]
fn test_multiple_errors_are_collected() {
    let found = errors("let a = b; let c: integer = true; break;");
    assert_eq!(found.len(), 3, "{found:?}");
}

#[test]
fn test_duration_compared_with_number_warns() {
    let (errors, warnings) = analyze_with("let ok = 5m > 60;", &AllowAll);
    assert!(errors.is_empty());
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0]
        .message
        .contains("comparing a duration with a number"));
}

#[test]
fn test_date_compared_with_string_warns() {
    let (errors, warnings) = analyze_with("let ok = today() > \"2024-01-01\";", &AllowAll);
    assert!(errors.is_empty());
    assert_eq!(warnings.len(), 1);
}

// ===== Relational =====

const EMPLOYEES: &str = "create table employees (
    id integer primary key,
    name varchar(40) not null,
    manager integer,
    salary float
);";

#[test]
fn test_query_over_declared_table() {
    assert_clean(&format!(
        "{EMPLOYEES}
        let rows = select name, salary * 2 as double from employees where salary > 10 order by double desc limit 3;"
    ));
}

#[test]
fn test_unknown_table_and_column() {
    let found = errors(&format!(
        "{EMPLOYEES}
        let a = select * from staff;
        let b = select bonus from employees;"
    ));
    assert_eq!(
        found,
        vec![
            "unknown table `staff`".to_string(),
            "undefined variable `bonus`".to_string(),
        ]
    );
}

#[test]
fn test_insert_checks_arity_and_types() {
    let found = errors(&format!(
        "{EMPLOYEES}
        insert into employees (id, name) values (1, 'Ann'), (2);
        insert into employees (id, name) values ('x', 'Bob');
        insert into employees (id, title) values (3, 'Cy');"
    ));
    assert_eq!(
        found,
        vec![
            "insert into `employees` has 1 value(s) for 2 column(s)".to_string(),
            "value for column `id` has type string, expected integer".to_string(),
            "table `employees` has no column `title`".to_string(),
        ]
    );
}

#[test]
fn test_update_and_delete_resolve_columns() {
    assert_clean(&format!(
        "{EMPLOYEES}
        update employees set salary = salary * 1.1 where manager is not null;
        delete from employees where id = 4;"
    ));
    assert_eq!(
        errors(&format!("{EMPLOYEES} update employees set bonus = 1;")),
        vec!["table `employees` has no column `bonus`".to_string()]
    );
}

#[test]
fn test_alter_table_changes_known_columns() {
    assert_clean(&format!(
        "{EMPLOYEES}
        alter table employees add column title string;
        let t = select title from employees;"
    ));
    assert_eq!(
        errors(&format!(
            "{EMPLOYEES}
            alter table employees drop column salary;
            let s = select salary from employees;"
        )),
        vec!["undefined variable `salary`".to_string()]
    );
}

#[test]
fn test_duplicate_column_in_create_table() {
    assert_eq!(
        errors("create table t (a integer, a string);"),
        vec!["duplicate column `a` in table `t`".to_string()]
    );
}

#[test]
fn test_union_arms_must_agree() {
    assert_eq!(
        errors(&format!(
            "{EMPLOYEES}
            let u = select id from employees union select id, name from employees;"
        )),
        vec!["union arms produce different column counts (1 and 2)".to_string()]
    );
}

#[test]
fn test_recursive_cte_sees_itself() {
    assert_clean(
        "let counted = with recursive counter(n) as (
            select 1
            union all
            select n + 1 from counter where n < 5
        ) select n from counter order by n;",
    );
    assert_eq!(
        errors("let c = with t(a, b) as (select 1) select a from t;"),
        vec!["`t` names 2 column(s) but its query produces 1".to_string()]
    );
}

#[test]
fn test_hierarchy_clause_defines_level() {
    assert_clean(&format!(
        "{EMPLOYEES}
        let tree = select name, level from employees hierarchy by id parent manager start with manager is null;"
    ));
    assert_eq!(
        errors(&format!(
            "{EMPLOYEES}
            let tree = select name from employees hierarchy by id parent boss;"
        )),
        vec!["table `employees` has no column `boss`".to_string()]
    );
}

#[test]
fn test_window_function_projection() {
    assert_clean(&format!(
        "{EMPLOYEES}
        let ranked = select name, rank() over (partition by manager order by salary desc) as r from employees;"
    ));
}

#[test]
fn test_visibility_policy_denies_field() {
    let policy = |table: &str, field: &str, operation: Operation| {
        if table == "employees" && field == "salary" && operation == Operation::Select {
            Visibility::Denied("confidential".to_string())
        } else {
            Visibility::Allowed
        }
    };
    let (found, _) = analyze_with(
        &format!("{EMPLOYEES} let s = select name, salary from employees;"),
        &policy,
    );
    let messages: Vec<String> = found.into_iter().map(|d| d.message).collect();
    assert_eq!(
        messages,
        vec!["select access to `employees.salary` is not allowed: confidential".to_string()]
    );
}

#[test]
fn test_visibility_policy_denies_delete() {
    let policy = |_: &str, field: &str, operation: Operation| {
        if operation == Operation::Delete && field == "*" {
            Visibility::Denied(String::new())
        } else {
            Visibility::Allowed
        }
    };
    let (found, _) = analyze_with(&format!("{EMPLOYEES} delete from employees;"), &policy);
    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0].message,
        "delete access to `employees.*` is not allowed"
    );
}

#[test]
fn test_host_tables_and_parameters() {
    let output = parse_program("let big = select name from staff where salary > threshold;");
    let builtins = BuiltinTypes::new();
    let mut analyzer = Analyzer::new(&builtins, &AllowAll);
    analyzer.declare_table(
        &TableSchema::new("staff")
            .column("name", "text")
            .column("salary", "real"),
    );
    analyzer.declare_parameter("threshold", TypeInfo::Float);
    assert!(analyzer.analyze(&output.program).is_empty());
}

#[test]
fn test_row_expression_against_schema() {
    let schema = TableSchema::new("orders")
        .column("amount", "float")
        .column("placed", "date");
    let builtins = BuiltinTypes::new();

    let expr = parse_expression("o.amount > 100 and placed = today()").expr.unwrap();
    let mut analyzer = Analyzer::new(&builtins, &AllowAll);
    assert_eq!(
        analyzer.analyze_row_expression(&expr, &schema, Some("o")),
        TypeInfo::Boolean
    );
    assert!(analyzer.errors().is_empty());

    let expr = parse_expression("missing + 1").expr.unwrap();
    let mut analyzer = Analyzer::new(&builtins, &AllowAll);
    analyzer.analyze_row_expression(&expr, &schema, None);
    assert_eq!(analyzer.errors().len(), 1);
}
