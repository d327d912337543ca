//! Query execution: `select`, `union`, common table expressions,
//! hierarchical traversal and ranking windows.
//!
//! A select runs in stages. The source rows are gathered (walked in tree
//! order for `hierarchy by`), each row is bound into a fresh scope and
//! filtered, projections and window keys are evaluated per row, window
//! ranks are filled in over the whole set, and finally `distinct`,
//! `order by` and `limit` shape the output.

use std::cmp::Ordering;
use std::rc::Rc;

use acta_ir::builtins::LEVEL_COLUMN;
use acta_ir::{Cte, ExprKind, OrderItem, Query, Select, SelectItem, SetExpr, Span, TableRef};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use super::cte::fixpoint;
use super::hierarchy::HierarchicalTree;
use super::window::{rank_rows, RankingFunction, WindowKeys};
use crate::errors::{fail, ControlFlow, EvalErrorKind, WithSpan};
use crate::interpreter::Interpreter;
use crate::operators::sort_order;
use crate::value::{hash_key, StructValue};
use crate::{ResultSet, Value};

fn count(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

/// Rows a select reads from.
struct Source {
    /// Table or result name, for error messages.
    label: String,
    /// Name the row struct is bound under: the alias, else the table name.
    row_name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// A source row selected for evaluation, with its hierarchy level.
struct Candidate {
    values: Vec<Value>,
    level: Option<usize>,
}

/// Where an `order by` key comes from.
enum OrderSource<'q> {
    /// An output column, by name or 1-based position.
    Column(usize),
    Expr(&'q acta_ir::Expr),
}

/// One projected row before windows and ordering are applied.
struct OutputRow {
    values: Vec<Value>,
    /// One entry per `order by` item; `None` for output-column keys.
    order: Vec<Option<Value>>,
    windows: Vec<WindowKeys>,
}

struct Window {
    column: usize,
    function: RankingFunction,
    descending: Vec<bool>,
}

/// Remove repeated rows, keeping the first occurrence.
fn dedupe(rows: &mut Vec<Vec<Value>>) {
    let mut seen = FxHashSet::default();
    rows.retain(|row| seen.insert(hash_key(row)));
}

fn reads_from(select: &Select, name: &str) -> bool {
    select.from.as_ref().is_some_and(|from| from.name == name)
}

impl Interpreter<'_> {
    /// Run a query in its own scope. CTEs are bound in that scope, so they
    /// are visible to the body and to later CTEs only.
    pub(crate) fn eval_query(&mut self, query: &Query) -> Result<ResultSet, ControlFlow> {
        let result = self.with_env_scope(|this| {
            if let Some(with) = &query.with {
                for cte in &with.ctes {
                    let result = this.eval_cte(cte, with.recursive)?;
                    trace!(cte = %cte.name, rows = result.len(), "materialized cte");
                    this.env.define(cte.name.clone(), Value::SqlResult(Rc::new(result)));
                }
            }
            this.execute_set_expr(&query.body)
        })?;
        debug!(rows = result.len(), columns = result.columns.len(), "query finished");
        Ok(result)
    }

    /// Bind one row into the current scope: each column by name, the row
    /// as a struct under `row_name`, and `level` for hierarchy rows.
    pub(crate) fn bind_row(
        &mut self,
        columns: &[String],
        values: &[Value],
        row_name: &str,
        level: Option<usize>,
    ) {
        let mut fields: Vec<(String, Value)> =
            columns.iter().cloned().zip(values.iter().cloned()).collect();
        if let Some(level) = level {
            fields.push((LEVEL_COLUMN.to_string(), count(level)));
        }
        self.env.define(
            row_name,
            Value::Struct(StructValue::new(row_name, fields.clone())),
        );
        for (name, value) in fields {
            self.env.define(name, value);
        }
    }

    fn eval_cte(&mut self, cte: &Cte, recursive: bool) -> Result<ResultSet, ControlFlow> {
        let self_referencing =
            recursive && cte.body.rest.iter().any(|arm| reads_from(&arm.select, &cte.name));
        if !self_referencing {
            let result = self.execute_set_expr(&cte.body)?;
            return rename_columns(cte, result);
        }

        // Arms that do not read the CTE form the anchor; the rest are
        // iterated against the working set.
        let mut anchor = self.execute_select(&cte.body.first)?;
        for arm in cte.body.rest.iter().filter(|arm| !reads_from(&arm.select, &cte.name)) {
            let rows = self.execute_select(&arm.select)?;
            append_arm(&mut anchor, rows, arm.all, arm.select.span)?;
        }
        let anchor = rename_columns(cte, anchor)?;

        let recursive_arms: Vec<_> = cte
            .body
            .rest
            .iter()
            .filter(|arm| reads_from(&arm.select, &cte.name))
            .collect();
        let union_all = recursive_arms.iter().all(|arm| arm.all);
        let columns = anchor.columns;
        let limit = self.config.max_recursive_iterations;

        let rows = fixpoint(&cte.name, anchor.rows, union_all, limit, cte.span, |working| {
            self.with_env_scope(|this| {
                let working = ResultSet::new(columns.clone(), working.to_vec());
                this.env.define(cte.name.clone(), Value::SqlResult(Rc::new(working)));
                let mut produced = Vec::new();
                for arm in &recursive_arms {
                    let result = this.execute_select(&arm.select)?;
                    if result.columns.len() != columns.len() {
                        return fail(
                            EvalErrorKind::UnionArity {
                                left: columns.len(),
                                right: result.columns.len(),
                            },
                            arm.select.span,
                        );
                    }
                    produced.extend(result.rows);
                }
                Ok(produced)
            })
        })?;
        Ok(ResultSet::new(columns, rows))
    }

    fn execute_set_expr(&mut self, set: &SetExpr) -> Result<ResultSet, ControlFlow> {
        let mut result = self.execute_select(&set.first)?;
        for arm in &set.rest {
            let rows = self.execute_select(&arm.select)?;
            append_arm(&mut result, rows, arm.all, arm.select.span)?;
        }
        Ok(result)
    }

    fn source(&self, from: &TableRef) -> Result<Source, ControlFlow> {
        let row_name = from.alias.clone().unwrap_or_else(|| from.name.clone());
        if self.row_filter.has_row_filter(&from.name) {
            let predicate = self.row_filter.row_filter(&from.name, &row_name);
            debug!(
                table = %from.name,
                alias = %row_name,
                has_predicate = predicate.is_some(),
                "row filter registered but not applied"
            );
        }
        match self.env.lookup_relation(&from.name) {
            Some(Value::Table(table)) => {
                let table = table.borrow();
                let result = table.to_result_set();
                Ok(Source {
                    label: table.name().to_string(),
                    row_name,
                    columns: result.columns,
                    rows: result.rows,
                })
            }
            Some(Value::SqlResult(result)) => Ok(Source {
                label: from.name.clone(),
                row_name,
                columns: result.columns.clone(),
                rows: result.rows.clone(),
            }),
            _ => match self.env.lookup(&from.name) {
                Some(Value::Null) | None => fail(EvalErrorKind::UnknownTable(from.name.clone()), from.span),
                Some(_) => fail(EvalErrorKind::NotATable(from.name.clone()), from.span),
            },
        }
    }

    /// Source rows in evaluation order. Hierarchy queries walk the tree
    /// depth-first from its roots, or from the `start with` rows, whose
    /// level counts from zero.
    fn candidates(&mut self, select: &Select, source: &Source) -> Result<Vec<Candidate>, ControlFlow> {
        let Some(clause) = &select.hierarchy else {
            return Ok(source
                .rows
                .iter()
                .map(|values| Candidate {
                    values: values.clone(),
                    level: None,
                })
                .collect());
        };

        let tree = HierarchicalTree::build(
            &source.label,
            &source.columns,
            &source.rows,
            &clause.key,
            &clause.parent,
        )
        .at(clause.span)?;

        let starts = match &clause.start_with {
            Some(condition) => {
                let mut starts = Vec::new();
                for id in tree.ids() {
                    let matched = self.with_env_scope(|this| {
                        this.bind_row(&source.columns, tree.values(id), &source.row_name, Some(tree.level(id)));
                        this.condition(condition, "start with condition")
                    })?;
                    if matched {
                        starts.push(id);
                    }
                }
                starts
            }
            None => tree.roots().to_vec(),
        };

        let mut candidates = Vec::new();
        for start in starts {
            let base = tree.level(start);
            for id in tree.preorder(start) {
                candidates.push(Candidate {
                    values: tree.values(id).to_vec(),
                    level: Some(tree.level(id) - base),
                });
            }
        }
        Ok(candidates)
    }

    fn execute_select(&mut self, select: &Select) -> Result<ResultSet, ControlFlow> {
        let source = match &select.from {
            Some(from) => Some(self.source(from)?),
            None => {
                if let Some(clause) = &select.hierarchy {
                    return fail(EvalErrorKind::MissingFrom("hierarchy by"), clause.span);
                }
                if select.projection.iter().any(|item| matches!(item, SelectItem::Wildcard)) {
                    return fail(EvalErrorKind::MissingFrom("*"), select.span);
                }
                None
            }
        };
        let with_level = select.hierarchy.is_some();

        let mut columns = Vec::new();
        let mut windows = Vec::new();
        for (position, item) in select.projection.iter().enumerate() {
            match item {
                SelectItem::Wildcard => {
                    if let Some(source) = &source {
                        columns.extend(source.columns.iter().cloned());
                    }
                    if with_level {
                        columns.push(LEVEL_COLUMN.to_string());
                    }
                }
                SelectItem::Expr { .. } => columns.push(item.output_name(position)),
                SelectItem::Window(call) => {
                    let Some(function) = RankingFunction::from_name(&call.function) else {
                        return fail(
                            EvalErrorKind::UnsupportedWindowFunction(call.function.clone()),
                            call.span,
                        );
                    };
                    windows.push(Window {
                        column: columns.len(),
                        function,
                        descending: call.order_by.iter().map(|item| item.descending).collect(),
                    });
                    columns.push(item.output_name(position));
                }
            }
        }

        let order_sources: Vec<OrderSource<'_>> = select
            .order_by
            .iter()
            .map(|item| order_source(item, &columns))
            .collect();

        let candidates = match &source {
            Some(source) => self.candidates(select, source)?,
            None => vec![Candidate {
                values: Vec::new(),
                level: None,
            }],
        };
        let (row_columns, row_name) = match &source {
            Some(source) => (source.columns.as_slice(), source.row_name.as_str()),
            None => (&[][..], ""),
        };

        let mut output = Vec::new();
        for candidate in &candidates {
            let row = self.with_env_scope(|this| {
                if source.is_some() {
                    this.bind_row(row_columns, &candidate.values, row_name, candidate.level);
                }
                if let Some(filter) = &select.filter {
                    if !this.condition(filter, "where condition")? {
                        return Ok(None);
                    }
                }
                this.project_row(select, candidate, &order_sources).map(Some)
            })?;
            output.extend(row);
        }

        for (index, window) in windows.iter().enumerate() {
            let keys: Vec<WindowKeys> = output
                .iter()
                .map(|row| row.windows.get(index).cloned().unwrap_or_default())
                .collect();
            let ranks = rank_rows(window.function, &keys, &window.descending);
            for (row, rank) in output.iter_mut().zip(ranks) {
                if let Some(slot) = row.values.get_mut(window.column) {
                    *slot = Value::Int(rank);
                }
            }
        }

        if select.distinct {
            let mut seen = FxHashSet::default();
            output.retain(|row| seen.insert(hash_key(&row.values)));
        }

        if !select.order_by.is_empty() {
            let key = |row: &OutputRow, i: usize| -> Value {
                match &order_sources[i] {
                    OrderSource::Column(column) => row.values.get(*column).cloned().unwrap_or(Value::Null),
                    OrderSource::Expr(_) => row.order[i].clone().unwrap_or(Value::Null),
                }
            };
            output.sort_by(|a, b| {
                for (i, item) in select.order_by.iter().enumerate() {
                    let ordering = sort_order(&key(a, i), &key(b, i));
                    let ordering = if item.descending { ordering.reverse() } else { ordering };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        let mut rows: Vec<Vec<Value>> = output.into_iter().map(|row| row.values).collect();
        if let Some(limit) = &select.limit {
            let value = self.eval(limit)?;
            let limit = match &value {
                Value::Int(n) => usize::try_from(*n).ok(),
                _ => None,
            };
            let Some(limit) = limit else {
                return fail(EvalErrorKind::InvalidLimit(value.to_string()), limit_span(select));
            };
            rows.truncate(limit);
        }
        Ok(ResultSet::new(columns, rows))
    }

    /// Evaluate the projection, window keys and `order by` expressions for
    /// one row already bound in the current scope.
    fn project_row(
        &mut self,
        select: &Select,
        candidate: &Candidate,
        order_sources: &[OrderSource<'_>],
    ) -> Result<OutputRow, ControlFlow> {
        let mut values = Vec::new();
        let mut windows = Vec::new();
        for item in &select.projection {
            match item {
                SelectItem::Wildcard => {
                    values.extend(candidate.values.iter().cloned());
                    if let Some(level) = candidate.level {
                        values.push(count(level));
                    }
                }
                SelectItem::Expr { expr, .. } => values.push(self.eval(expr)?),
                SelectItem::Window(call) => {
                    let partition = call
                        .partition_by
                        .iter()
                        .map(|expr| self.eval(expr))
                        .collect::<Result<Vec<_>, _>>()?;
                    let order = call
                        .order_by
                        .iter()
                        .map(|item| self.eval(&item.expr))
                        .collect::<Result<Vec<_>, _>>()?;
                    windows.push(WindowKeys { partition, order });
                    // Filled in once every row is known.
                    values.push(Value::Null);
                }
            }
        }

        // Aliases are visible to `order by` expressions.
        for (position, item) in select.projection.iter().enumerate() {
            if let SelectItem::Expr {
                alias: Some(alias), ..
            } = item
            {
                if let Some(value) = output_value(select, &values, position) {
                    self.env.define(alias.clone(), value);
                }
            }
        }

        let mut order = Vec::with_capacity(order_sources.len());
        for source in order_sources {
            order.push(match source {
                OrderSource::Column(_) => None,
                OrderSource::Expr(expr) => Some(self.eval(expr)?),
            });
        }
        Ok(OutputRow {
            values,
            order,
            windows,
        })
    }
}

/// Value of projection item `position` within an output row. Only items
/// before the first wildcard have a fixed offset.
fn output_value(select: &Select, values: &[Value], position: usize) -> Option<Value> {
    let before = &select.projection[..position];
    if before.iter().any(|item| matches!(item, SelectItem::Wildcard)) {
        return None;
    }
    values.get(position).cloned()
}

fn order_source<'q>(item: &'q OrderItem, columns: &[String]) -> OrderSource<'q> {
    match &item.expr.kind {
        ExprKind::Ident(name) => match columns.iter().position(|column| column == name) {
            Some(column) => OrderSource::Column(column),
            None => OrderSource::Expr(&item.expr),
        },
        ExprKind::Int(n) => match usize::try_from(*n) {
            Ok(n) if (1..=columns.len()).contains(&n) => OrderSource::Column(n - 1),
            _ => OrderSource::Expr(&item.expr),
        },
        _ => OrderSource::Expr(&item.expr),
    }
}

fn limit_span(select: &Select) -> Span {
    select.limit.as_ref().map_or(select.span, |limit| limit.span)
}

/// Append a union arm's rows, removing duplicates unless it is `union all`.
fn append_arm(result: &mut ResultSet, arm: ResultSet, all: bool, span: Span) -> Result<(), ControlFlow> {
    if arm.columns.len() != result.columns.len() {
        return fail(
            EvalErrorKind::UnionArity {
                left: result.columns.len(),
                right: arm.columns.len(),
            },
            span,
        );
    }
    result.rows.extend(arm.rows);
    if !all {
        dedupe(&mut result.rows);
    }
    Ok(())
}

/// Apply a CTE's explicit column list.
fn rename_columns(cte: &Cte, mut result: ResultSet) -> Result<ResultSet, ControlFlow> {
    if cte.columns.is_empty() {
        return Ok(result);
    }
    if cte.columns.len() != result.columns.len() {
        return fail(
            EvalErrorKind::CteArity {
                name: cte.name.clone(),
                named: cte.columns.len(),
                produced: result.columns.len(),
            },
            cte.span,
        );
    }
    result.columns.clone_from(&cte.columns);
    Ok(result)
}
