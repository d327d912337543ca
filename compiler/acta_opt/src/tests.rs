#![allow(clippy::unwrap_used, reason = "tests unwrap parse results")]

use super::*;
use acta_ir::{BinaryOp, Expr, ExprKind, Stmt, StmtKind};
use acta_parse::parse_program;
use pretty_assertions::assert_eq;

fn parse(source: &str) -> Program {
    let output = parse_program(source);
    assert!(!output.has_errors(), "parse errors in test source");
    output.program
}

fn let_init(program: &Program, index: usize) -> &ExprKind {
    let StmtKind::Let {
        init: Some(init), ..
    } = &program.statements[index].kind
    else {
        panic!("expected let with initializer at {index}");
    };
    &init.kind
}

fn single_expr_program(expr: Expr) -> Program {
    Program::new(vec![Stmt::expr(expr)])
}

#[test]
fn test_folds_arithmetic_to_literal() {
    let mut optimizer = Optimizer::default();
    let program = optimizer.optimize(&parse("let a = 5 * 10 + 2;"));
    assert_eq!(let_init(&program, 0), &ExprKind::Int(52));
    assert!(optimizer.stats().constant_folds >= 1);
}

#[test]
fn test_integer_division_is_left_intact() {
    let source = parse("let a = 10 / 2;");
    let mut optimizer = Optimizer::default();
    let program = optimizer.optimize(&source);
    assert_eq!(program, source);
    assert_eq!(optimizer.stats().constant_folds, 0);
}

#[test]
fn test_folds_unary_operators() {
    let mut optimizer = Optimizer::default();
    let program = optimizer.optimize(&parse("let b = !true; let n = -5; let f = -2.5;"));
    assert_eq!(let_init(&program, 0), &ExprKind::Bool(false));
    assert_eq!(let_init(&program, 1), &ExprKind::Int(-5));
    assert_eq!(let_init(&program, 2), &ExprKind::Float(-2.5));
}

#[test]
fn test_float_folding_is_partial() {
    let mut optimizer = Optimizer::default();
    let program =
        optimizer.optimize(&parse("let a = 1.5 * 2.0; let b = 1.5 - 0.5; let c = 1 + 0.5;"));
    assert_eq!(let_init(&program, 0), &ExprKind::Float(3.0));
    assert!(matches!(
        let_init(&program, 1),
        ExprKind::Binary {
            op: BinaryOp::Sub,
            ..
        }
    ));
    assert_eq!(let_init(&program, 2), &ExprKind::Float(1.5));
}

#[test]
fn test_overflow_is_not_folded() {
    let program = single_expr_program(Expr::binary(
        BinaryOp::Add,
        Expr::int(i64::MAX),
        Expr::int(1),
    ));
    let result = ConstantFolding.apply(&program);
    assert_eq!(result.transformed, 0);
    assert_eq!(result.program, program);
}

#[test]
fn test_folding_is_idempotent() {
    let program = parse(
        "let a = (1 + 2) * (3 + 4);
        for (let i = 0; i < 2 * 5; i = i + 1) { print(i * (2 + 2)); }",
    );
    let once = ConstantFolding.apply(&program);
    assert!(once.transformed > 0);
    let twice = ConstantFolding.apply(&once.program);
    assert_eq!(twice.transformed, 0);
    assert_eq!(twice.program, once.program);
}

#[test]
fn test_folds_inside_loops_and_switch() {
    let mut optimizer = Optimizer::default();
    let program = optimizer.optimize(&parse(
        "let x = 1;
        switch (x) { case 1 + 0: print(2 * 3); }",
    ));
    let StmtKind::Switch { cases, .. } = &program.statements[1].kind else {
        panic!("expected switch");
    };
    assert_eq!(cases[0].values[0].kind, ExprKind::Int(1));
    assert_eq!(optimizer.stats().constant_folds, 2);
}

#[test]
fn test_dead_code_drops_pure_statements_but_keeps_last() {
    let mut optimizer = Optimizer::default();
    let program = optimizer.optimize(&parse("1 + 2; \"unused\"; let y = 1; print(y); 7;"));
    assert_eq!(program.statements.len(), 3);
    assert!(matches!(program.statements[0].kind, StmtKind::Let { .. }));
    assert!(matches!(
        &program.statements[2].kind,
        StmtKind::Expr(Expr {
            kind: ExprKind::Int(7),
            ..
        })
    ));
    assert_eq!(optimizer.stats().dead_code_removals, 2);
}

#[test]
fn test_dead_code_keeps_failing_division() {
    let source = parse("1 / 0; 2;");
    let mut optimizer = Optimizer::default();
    let program = optimizer.optimize(&source);
    assert_eq!(program.statements.len(), 2);
    assert_eq!(optimizer.stats().dead_code_removals, 0);
}

#[test]
fn test_dead_code_keeps_statements_that_fail_at_run_time() {
    for source in [
        "9223372036854775807 + 1; 2;",
        "date'2024-99-99'; 2;",
        "time'25:61'; 2;",
        "true + 1; 2;",
        "1.5 % 0; 2;",
        "(3 - 3) / (1 - 1); 2;",
    ] {
        let mut optimizer = Optimizer::default();
        let program = optimizer.optimize(&parse(source));
        assert_eq!(program.statements.len(), 2, "{source}");
        assert_eq!(optimizer.stats().dead_code_removals, 0, "{source}");
    }
}

#[test]
fn test_dead_code_drops_valid_temporal_literals() {
    let mut optimizer = Optimizer::default();
    let program = optimizer.optimize(&parse("date'2024-02-29'; time'08:30'; 5m; null + 1; 2;"));
    assert_eq!(program.statements.len(), 1);
    assert_eq!(optimizer.stats().dead_code_removals, 4);
}

#[test]
fn test_unreferenced_small_function_is_elided() {
    let mut optimizer = Optimizer::default();
    let program = optimizer.optimize(&parse(
        "function unused(): integer { return 1; }
        function square(n: integer): integer { return n * n; }
        let x = square(3);",
    ));
    assert_eq!(program.statements.len(), 2);
    let StmtKind::Function(decl) = &program.statements[0].kind else {
        panic!("expected function");
    };
    assert_eq!(decl.name, "square");
    assert_eq!(optimizer.stats().inline_expansions, 1);
}

#[test]
fn test_large_function_is_kept() {
    let source = parse(
        "function big(n: integer): integer {
            let a = n;
            let b = a;
            let c = b;
            let d = c;
            let e = d;
            return e;
        }
        let x = 1;",
    );
    assert_eq!(inline::block_weight(&function_body(&source)), 6);
    let mut optimizer = Optimizer::default();
    assert_eq!(optimizer.optimize(&source), source);
}

fn function_body(program: &Program) -> acta_ir::Block {
    let StmtKind::Function(decl) = &program.statements[0].kind else {
        panic!("expected function");
    };
    decl.body.clone()
}

#[test]
fn test_loop_optimization_preserves_body() {
    let source = parse("let t = 0; for (let i = 0; i < 3; i = i + 1) { t = t + i; }");
    let result = LoopOptimization.apply(&source);
    assert_eq!(result.transformed, 0);
    assert_eq!(result.program, source);
}

#[test]
fn test_pass_loop_terminates_within_cap() {
    let mut optimizer = Optimizer::default();
    optimizer.optimize(&parse(
        "function f(): integer { return 1; }
        let a = ((1 + 2) * (3 + 4)) + -(5 * 6);
        for (let i = 0; i < 1 + 1; i = i + 1) {
            for (let j = 0; j < 2 * 2; j = j + 1) { print(i * j + (1 + 1)); }
        }
        3 + 4;
        let z = f();",
    ));
    let stats = optimizer.stats();
    assert!(stats.rounds >= 1 && stats.rounds <= MAX_PASSES);
}

#[test]
fn test_round_cap_is_respected() {
    let mut optimizer = Optimizer::new(OptimizerConfig::default().with_max_passes(1));
    optimizer.optimize(&parse("let a = 1 + 2;"));
    assert_eq!(optimizer.stats().rounds, 1);
}

#[test]
fn test_disabled_optimizer_returns_input() {
    let source = parse("let a = 1 + 2; 3;");
    let mut optimizer = Optimizer::new(OptimizerConfig::disabled());
    assert_eq!(optimizer.optimize(&source), source);
    assert_eq!(optimizer.stats(), OptimizerStats::default());
}

#[test]
fn test_stats_are_cumulative() {
    let mut optimizer = Optimizer::default();
    optimizer.optimize(&parse("let a = 1 + 2;"));
    optimizer.optimize(&parse("let b = 3 * 4;"));
    assert_eq!(optimizer.stats().constant_folds, 2);
}

#[allow(
    clippy::disallowed_types,
    reason = "proptest macros internally use Arc"
)]
mod proptest_fold {
    use super::*;
    use proptest::prelude::*;

    fn fold(op: BinaryOp, a: i64, b: i64) -> ExprKind {
        let program = single_expr_program(Expr::binary(op, Expr::int(a), Expr::int(b)));
        let result = ConstantFolding.apply(&program);
        let StmtKind::Expr(expr) = &result.program.statements[0].kind else {
            panic!("expected expression statement");
        };
        expr.kind.clone()
    }

    proptest! {
        #[test]
        fn test_add_folds_to_sum(a in any::<i64>(), b in any::<i64>()) {
            let folded = fold(BinaryOp::Add, a, b);
            match a.checked_add(b) {
                Some(sum) => {
                    prop_assert_eq!(folded, ExprKind::Int(sum));
                }
                None => {
                    let is_binary = matches!(folded, ExprKind::Binary { .. });
                    prop_assert!(is_binary);
                }
            }
        }

        #[test]
        fn test_sub_folds_to_difference(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
            prop_assert_eq!(fold(BinaryOp::Sub, a, b), ExprKind::Int(a - b));
        }

        #[test]
        fn test_mul_folds_to_product(a in -100_000i64..100_000, b in -100_000i64..100_000) {
            prop_assert_eq!(fold(BinaryOp::Mul, a, b), ExprKind::Int(a * b));
        }

        #[test]
        fn test_div_is_never_folded(a in any::<i64>(), b in any::<i64>()) {
            let folded = fold(BinaryOp::Div, a, b);
            let is_div = matches!(folded, ExprKind::Binary { op: BinaryOp::Div, .. });
            prop_assert!(is_div);
        }
    }
}
