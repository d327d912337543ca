//! Host sessions: parse, analyze, optimize, then evaluate.

use acta_diagnostic::{Diagnostic, LineOffsetTable};
use acta_eval::relational::Table;
use acta_eval::{
    stdout_handler, EvalConfig, EvalError, InterpreterBuilder, NoRowFilter, RowFilter,
    SharedPrintHandler, Value,
};
use acta_ir::{Expr, Program};
use acta_opt::{Optimizer, OptimizerConfig, OptimizerStats};
use acta_parse::{parse_expression, parse_program};
use acta_sema::{AllowAll, Analyzer, BuiltinTypes, TableSchema, TypeInfo, VisibilityPolicy};
use thiserror::Error;
use tracing::debug;

/// Settings for one [`Session`].
///
/// Defaults match the fixed limits: optimizer on with ten rounds, a
/// thousand recursive CTE iterations, `print` to stdout.
#[derive(Clone, Default)]
pub struct RunConfig {
    pub optimizer: OptimizerConfig,
    pub eval: EvalConfig,
    /// `None` writes to stdout.
    pub print_handler: Option<SharedPrintHandler>,
}

impl RunConfig {
    #[must_use]
    pub fn without_optimizer(mut self) -> Self {
        self.optimizer = OptimizerConfig::disabled();
        self
    }

    #[must_use]
    pub fn max_passes(mut self, passes: usize) -> Self {
        self.optimizer = self.optimizer.with_max_passes(passes);
        self
    }

    #[must_use]
    pub fn max_recursive_iterations(mut self, limit: usize) -> Self {
        self.eval.max_recursive_iterations = limit;
        self
    }

    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }
}

/// Pipeline stage a run stopped in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Analysis,
    Evaluation,
}

/// Why a run produced no value.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("{} parse error(s)", .0.len())]
    Parse(Vec<String>),
    #[error("{} semantic error(s)", .0.len())]
    Analysis(Vec<String>),
    #[error("{0}")]
    Evaluation(String),
}

impl RunError {
    pub fn stage(&self) -> Stage {
        match self {
            RunError::Parse(_) => Stage::Parse,
            RunError::Analysis(_) => Stage::Analysis,
            RunError::Evaluation(_) => Stage::Evaluation,
        }
    }

    /// Rendered `line:col: message` diagnostics.
    pub fn messages(&self) -> Vec<String> {
        match self {
            RunError::Parse(messages) | RunError::Analysis(messages) => messages.clone(),
            RunError::Evaluation(message) => vec![message.clone()],
        }
    }
}

/// Everything a run reports back to the host.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutput {
    /// Program result; null when the run failed.
    pub value: Value,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: OptimizerStats,
    /// Stage that produced `errors`, if any.
    pub failed: Option<Stage>,
}

impl RunOutput {
    fn failure(stage: Stage, errors: Vec<String>, warnings: Vec<String>) -> Self {
        RunOutput {
            value: Value::Null,
            errors,
            warnings,
            stats: OptimizerStats::default(),
            failed: Some(stage),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failed.is_none()
    }

    pub fn into_result(self) -> Result<Value, RunError> {
        match self.failed {
            None => Ok(self.value),
            Some(Stage::Parse) => Err(RunError::Parse(self.errors)),
            Some(Stage::Analysis) => Err(RunError::Analysis(self.errors)),
            Some(Stage::Evaluation) => Err(RunError::Evaluation(
                self.errors.into_iter().next().unwrap_or_default(),
            )),
        }
    }
}

/// A configured pipeline that hosts run programs through.
///
/// Parameters are seeded into both the analyzer (as typed symbols) and the
/// evaluator's global scope. Table-valued parameters are declared as tables
/// under the parameter's name.
pub struct Session<'a> {
    config: RunConfig,
    builtins: BuiltinTypes,
    policy: &'a dyn VisibilityPolicy,
    row_filter: &'a dyn RowFilter,
    parameters: Vec<(String, Value)>,
}

impl<'a> Session<'a> {
    pub fn new(config: RunConfig) -> Self {
        Session {
            config,
            builtins: BuiltinTypes::new(),
            policy: &AllowAll,
            row_filter: &NoRowFilter,
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn policy(mut self, policy: &'a dyn VisibilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn row_filter(mut self, row_filter: &'a dyn RowFilter) -> Self {
        self.row_filter = row_filter;
        self
    }

    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.push((name.into(), value));
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run `source` to completion.
    ///
    /// Parse and semantic errors stop the run before anything executes.
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
    pub fn run(&self, source: &str) -> RunOutput {
        let lines = LineOffsetTable::build(source);
        let (program, warnings) = match self.front_end(source, &lines) {
            Ok(checked) => checked,
            Err((stage, errors, warnings)) => return RunOutput::failure(stage, errors, warnings),
        };

        let mut optimizer = Optimizer::new(self.config.optimizer.clone());
        let program = optimizer.optimize(&program);
        let stats = optimizer.stats();
        debug!(rewrites = stats.total(), rounds = stats.rounds, "optimized");

        let mut builder = InterpreterBuilder::new()
            .config(self.config.eval)
            .row_filter(self.row_filter)
            .print_handler(
                self.config
                    .print_handler
                    .clone()
                    .unwrap_or_else(stdout_handler),
            );
        for (name, value) in &self.parameters {
            builder = builder.parameter(name.clone(), value.clone());
        }
        let mut interpreter = builder.build();

        match interpreter.eval_program(&program) {
            Ok(value) => RunOutput {
                value,
                errors: Vec::new(),
                warnings,
                stats,
                failed: None,
            },
            Err(error) => {
                let mut output = RunOutput::failure(
                    Stage::Evaluation,
                    vec![render_eval_error(&error, source, &lines)],
                    warnings,
                );
                output.stats = stats;
                output
            }
        }
    }

    /// Parse and analyze `source` without running it.
    pub fn check(&self, source: &str) -> RunOutput {
        let lines = LineOffsetTable::build(source);
        match self.front_end(source, &lines) {
            Ok((_, warnings)) => RunOutput {
                value: Value::Null,
                errors: Vec::new(),
                warnings,
                stats: OptimizerStats::default(),
                failed: None,
            },
            Err((stage, errors, warnings)) => RunOutput::failure(stage, errors, warnings),
        }
    }

    /// Parse and analyze. Yields the program and rendered warnings, or the
    /// failing stage with its errors and warnings.
    fn front_end(
        &self,
        source: &str,
        lines: &LineOffsetTable,
    ) -> Result<(Program, Vec<String>), (Stage, Vec<String>, Vec<String>)> {
        let render = |diagnostic: &Diagnostic| diagnostic.render(source, lines);

        let parsed = parse_program(source);
        if parsed.has_errors() {
            let errors = parsed.diagnostics.errors().map(render).collect();
            return Err((Stage::Parse, errors, Vec::new()));
        }

        let mut analyzer = Analyzer::new(&self.builtins, self.policy);
        self.declare_parameters(&mut analyzer);
        let errors = analyzer.analyze(&parsed.program);
        let warnings = analyzer.warnings().iter().map(render).collect();
        if errors.is_empty() {
            Ok((parsed.program, warnings))
        } else {
            let errors = errors.iter().map(render).collect();
            Err((Stage::Analysis, errors, warnings))
        }
    }

    /// Parse one expression and validate it against the columns of
    /// `schema`, read bare or through `alias`.
    ///
    /// Returns the expression only when there are no errors.
    pub fn compile_expression(
        &self,
        source: &str,
        schema: &TableSchema,
        alias: Option<&str>,
    ) -> (Option<Expr>, Vec<String>) {
        let lines = LineOffsetTable::build(source);
        let render = |diagnostic: &Diagnostic| diagnostic.render(source, &lines);

        let parsed = parse_expression(source);
        let mut errors: Vec<String> = parsed.diagnostics.errors().map(render).collect();
        let Some(expr) = parsed.expr else {
            return (None, errors);
        };
        if !errors.is_empty() {
            return (None, errors);
        }

        let mut analyzer = Analyzer::new(&self.builtins, self.policy);
        self.declare_parameters(&mut analyzer);
        analyzer.analyze_row_expression(&expr, schema, alias);
        errors.extend(analyzer.errors().iter().map(render));
        debug!(table = %schema.name, errors = errors.len(), "compiled row expression");
        if errors.is_empty() {
            (Some(expr), errors)
        } else {
            (None, errors)
        }
    }

    fn declare_parameters(&self, analyzer: &mut Analyzer<'_>) {
        for (name, value) in &self.parameters {
            match value {
                Value::Table(table) => analyzer.declare_table(&table_schema(name, &table.borrow())),
                _ => analyzer.declare_parameter(name, type_of(value)),
            }
        }
    }
}

impl Default for Session<'_> {
    fn default() -> Self {
        Session::new(RunConfig::default())
    }
}

fn render_eval_error(error: &EvalError, source: &str, lines: &LineOffsetTable) -> String {
    let (line, col) = lines.offset_to_line_col(source, error.span.start);
    format!("{line}:{col}: {error}")
}

fn table_schema(name: &str, table: &Table) -> TableSchema {
    table
        .columns()
        .iter()
        .fold(TableSchema::new(name), |schema, column| {
            schema.column(column.name.clone(), &column.type_name)
        })
}

/// Static type of a host-supplied value.
pub fn type_of(value: &Value) -> TypeInfo {
    match value {
        Value::Int(_) => TypeInfo::Integer,
        Value::Float(_) => TypeInfo::Float,
        Value::Str(_) => TypeInfo::String,
        Value::Bool(_) => TypeInfo::Boolean,
        Value::Date(_) => TypeInfo::Date,
        Value::Time(_) => TypeInfo::Time,
        Value::Duration(_) => TypeInfo::Duration,
        Value::Null => TypeInfo::Null,
        Value::Array(array) => TypeInfo::Array {
            element: Box::new(array.elements.first().map_or(TypeInfo::Any, type_of)),
            size: array.size,
        },
        Value::Struct(record) => TypeInfo::Struct {
            name: record.name.clone(),
            fields: record
                .fields
                .iter()
                .map(|(name, value)| (name.clone(), type_of(value)))
                .collect(),
        },
        Value::Function(function) => TypeInfo::Function {
            params: vec![TypeInfo::Any; function.decl.params.len()],
            ret: Box::new(TypeInfo::Any),
        },
        Value::Builtin(_) => TypeInfo::Any,
        Value::Table(table) => table_schema(table.borrow().name(), &table.borrow()).type_info(),
        Value::SqlResult(_) => TypeInfo::SqlResult,
        Value::Tree(_) => TypeInfo::Tree,
        Value::Node(_) => TypeInfo::Node,
    }
}
