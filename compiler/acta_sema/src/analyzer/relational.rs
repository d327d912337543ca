//! Checks for tables, data manipulation and queries.

use super::Analyzer;
use crate::scope::{ScopeKind, Symbol, SymbolKind};
use crate::types::TypeInfo;
use crate::visibility::Operation;
use acta_ir::builtins::{ColumnType, LEVEL_COLUMN};
use acta_ir::{
    AlterAction, AlterTable, CreateIndex, CreateTable, Cte, Delete, Insert, InsertSource, Query,
    Select, SelectItem, SetExpr, Span, Update,
};

/// Output columns of a query, `None` when they cannot be known statically.
type Columns = Option<Vec<(String, TypeInfo)>>;

fn column_names(ty: &TypeInfo) -> Option<&[(String, TypeInfo)]> {
    match ty {
        TypeInfo::Table { columns, .. } => Some(columns),
        _ => None,
    }
}

impl Analyzer<'_> {
    /// Resolve `name` as a table. Unknown shapes resolve to `any`.
    pub(super) fn table_type(&mut self, name: &str, span: Span) -> Option<TypeInfo> {
        match self.scopes.lookup(name).map(|symbol| symbol.ty.clone()) {
            Some(ty @ TypeInfo::Table { .. }) => Some(ty),
            Some(TypeInfo::Any) => Some(TypeInfo::Any),
            Some(other) => {
                self.error(format!("`{name}` is not a table (found {other})"), span);
                None
            }
            None => {
                self.error(format!("unknown table `{name}`"), span);
                None
            }
        }
    }

    /// Enter a row scope where the columns of `ty` are plain names and the
    /// row itself is reachable as `alias` (or the table name).
    pub(super) fn push_row(
        &mut self,
        table: &str,
        alias: Option<&str>,
        ty: &TypeInfo,
        operation: Operation,
    ) {
        let columns = column_names(ty);
        self.scopes.push(ScopeKind::Row {
            table: table.to_string(),
            operation,
            open: columns.is_none(),
        });
        let row_ty = match columns {
            Some(columns) => {
                for (name, column_ty) in columns {
                    self.scopes.define(Symbol::new(
                        name.clone(),
                        SymbolKind::Column {
                            table: table.to_string(),
                        },
                        column_ty.clone(),
                        Span::DUMMY,
                    ));
                }
                TypeInfo::Struct {
                    name: table.to_string(),
                    fields: columns.to_vec(),
                }
            }
            None => TypeInfo::Any,
        };
        self.scopes.define(Symbol::new(
            alias.unwrap_or(table),
            SymbolKind::RowAlias {
                table: table.to_string(),
            },
            row_ty,
            Span::DUMMY,
        ));
    }

    fn require_column(
        &mut self,
        table: &str,
        columns: &[(String, TypeInfo)],
        column: &str,
        span: Span,
    ) -> Option<TypeInfo> {
        let found = columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, ty)| ty.clone());
        if found.is_none() {
            self.error(format!("table `{table}` has no column `{column}`"), span);
        }
        found
    }

    pub(super) fn check_create_table(&mut self, create: &CreateTable, span: Span) {
        if let Some(existing) = self.scopes.lookup(&create.name) {
            if existing.kind != SymbolKind::Table {
                self.error(format!("`{}` is already declared", create.name), span);
            }
        }

        let mut columns: Vec<(String, TypeInfo)> = Vec::with_capacity(create.columns.len());
        for column in &create.columns {
            if columns.iter().any(|(name, _)| *name == column.name) {
                self.error(
                    format!("duplicate column `{}` in table `{}`", column.name, create.name),
                    column.span,
                );
                continue;
            }
            let ty = TypeInfo::from_column(ColumnType::from_name(&column.type_name));
            if let Some(default) = &column.default {
                let default_ty = self.infer(default);
                if !ty.is_compatible(&default_ty) {
                    self.error(
                        format!(
                            "default for column `{}` has type {default_ty}, expected {ty}",
                            column.name
                        ),
                        default.span,
                    );
                }
            }
            columns.push((column.name.clone(), ty));
        }
        if create.columns.iter().filter(|c| c.primary_key).count() > 1 {
            self.error(
                format!("table `{}` declares more than one primary key", create.name),
                span,
            );
        }

        let ty = TypeInfo::Table {
            name: create.name.clone(),
            columns,
        };
        self.scopes
            .define(Symbol::new(create.name.clone(), SymbolKind::Table, ty, span));
    }

    pub(super) fn check_create_index(&mut self, index: &CreateIndex, span: Span) {
        let Some(ty) = self.table_type(&index.table, span) else {
            return;
        };
        if let Some(columns) = column_names(&ty) {
            for column in &index.columns {
                self.require_column(&index.table, columns, column, span);
            }
        }
    }

    pub(super) fn check_alter_table(&mut self, alter: &AlterTable, span: Span) {
        let Some(ty) = self.table_type(&alter.table, span) else {
            return;
        };
        let Some(columns) = column_names(&ty) else {
            return;
        };
        let mut columns = columns.to_vec();
        match &alter.action {
            AlterAction::AddColumn(spec) => {
                if columns.iter().any(|(name, _)| *name == spec.name) {
                    self.error(
                        format!("column `{}` already exists in `{}`", spec.name, alter.table),
                        spec.span,
                    );
                    return;
                }
                let column_ty = TypeInfo::from_column(ColumnType::from_name(&spec.type_name));
                if let Some(default) = &spec.default {
                    let default_ty = self.infer(default);
                    if !column_ty.is_compatible(&default_ty) {
                        self.error(
                            format!(
                                "default for column `{}` has type {default_ty}, expected {column_ty}",
                                spec.name
                            ),
                            default.span,
                        );
                    }
                }
                columns.push((spec.name.clone(), column_ty));
            }
            AlterAction::DropColumn(name) => {
                if self.require_column(&alter.table, &columns, name, span).is_none() {
                    return;
                }
                columns.retain(|(column, _)| column != name);
            }
        }
        if let Some(symbol) = self.scopes.lookup_mut(&alter.table) {
            symbol.ty = TypeInfo::Table {
                name: alter.table.clone(),
                columns,
            };
        }
    }

    pub(super) fn check_insert(&mut self, insert: &Insert, span: Span) {
        let ty = self.table_type(&insert.table, span);
        let columns = ty.as_ref().and_then(column_names).map(<[_]>::to_vec);

        // Target columns with their types, when the table shape is known.
        let targets: Option<Vec<(String, TypeInfo)>> = columns.map(|columns| {
            if insert.columns.is_empty() {
                columns
            } else {
                insert
                    .columns
                    .iter()
                    .map(|name| {
                        let ty = self
                            .require_column(&insert.table, &columns, name, span)
                            .unwrap_or(TypeInfo::Any);
                        (name.clone(), ty)
                    })
                    .collect()
            }
        });
        if let Some(targets) = &targets {
            for (name, _) in targets {
                self.check_visibility(&insert.table, name, Operation::Insert, span);
            }
        }

        match &insert.source {
            InsertSource::Values(rows) => {
                for row in rows {
                    let value_types: Vec<TypeInfo> = row.iter().map(|v| self.infer(v)).collect();
                    let Some(targets) = &targets else { continue };
                    if row.len() != targets.len() {
                        self.error(
                            format!(
                                "insert into `{}` has {} value(s) for {} column(s)",
                                insert.table,
                                row.len(),
                                targets.len()
                            ),
                            span,
                        );
                        continue;
                    }
                    for ((value, value_ty), (name, column_ty)) in
                        row.iter().zip(&value_types).zip(targets)
                    {
                        if !column_ty.is_compatible(value_ty) {
                            self.error(
                                format!(
                                    "value for column `{name}` has type {value_ty}, expected {column_ty}"
                                ),
                                value.span,
                            );
                        }
                    }
                }
            }
            InsertSource::Query(query) => {
                let produced = self.check_query(query);
                if let (Some(targets), Some(produced)) = (&targets, produced) {
                    if targets.len() != produced.len() {
                        self.error(
                            format!(
                                "insert into `{}` selects {} column(s) for {} column(s)",
                                insert.table,
                                produced.len(),
                                targets.len()
                            ),
                            query.span,
                        );
                    }
                }
            }
        }
    }

    pub(super) fn check_update(&mut self, update: &Update, span: Span) {
        let ty = self.table_type(&update.table, span).unwrap_or(TypeInfo::Any);
        let columns = column_names(&ty).map(<[_]>::to_vec);
        self.push_row(&update.table, None, &ty, Operation::Update);
        for assignment in &update.assignments {
            let column_ty = match &columns {
                Some(columns) => self
                    .require_column(&update.table, columns, &assignment.column, assignment.span)
                    .unwrap_or(TypeInfo::Any),
                None => TypeInfo::Any,
            };
            self.check_visibility(
                &update.table,
                &assignment.column,
                Operation::Update,
                assignment.span,
            );
            let value_ty = self.infer(&assignment.value);
            if !column_ty.is_compatible(&value_ty) {
                self.error(
                    format!(
                        "value for column `{}` has type {value_ty}, expected {column_ty}",
                        assignment.column
                    ),
                    assignment.value.span,
                );
            }
        }
        if let Some(filter) = &update.filter {
            self.check_condition(filter, "where");
        }
        self.scopes.pop();
    }

    pub(super) fn check_delete(&mut self, delete: &Delete, span: Span) {
        let ty = self.table_type(&delete.table, span).unwrap_or(TypeInfo::Any);
        self.check_visibility(&delete.table, "*", Operation::Delete, span);
        self.push_row(&delete.table, None, &ty, Operation::Delete);
        if let Some(filter) = &delete.filter {
            self.check_condition(filter, "where");
        }
        self.scopes.pop();
    }

    // ===== Queries =====

    /// Check a query; returns its output columns when known.
    pub(super) fn check_query(&mut self, query: &Query) -> Columns {
        self.scopes.push(ScopeKind::Block);
        if let Some(with) = &query.with {
            for cte in &with.ctes {
                self.check_cte(cte, with.recursive);
            }
        }
        let columns = self.check_set_expr(&query.body);
        self.scopes.pop();
        columns
    }

    fn check_cte(&mut self, cte: &Cte, recursive: bool) {
        let anchor = self.check_select(&cte.body.first);
        let columns = match anchor {
            Some(produced) if !cte.columns.is_empty() => {
                if produced.len() != cte.columns.len() {
                    self.error(
                        format!(
                            "`{}` names {} column(s) but its query produces {}",
                            cte.name,
                            cte.columns.len(),
                            produced.len()
                        ),
                        cte.span,
                    );
                }
                let types = produced
                    .into_iter()
                    .map(|(_, ty)| ty)
                    .chain(std::iter::repeat(TypeInfo::Any));
                Some(cte.columns.iter().cloned().zip(types).collect())
            }
            Some(produced) => Some(produced),
            None if !cte.columns.is_empty() => Some(
                cte.columns
                    .iter()
                    .map(|name| (name.clone(), TypeInfo::Any))
                    .collect(),
            ),
            None => None,
        };
        let ty = match columns {
            Some(columns) => TypeInfo::Table {
                name: cte.name.clone(),
                columns,
            },
            None => TypeInfo::Any,
        };
        let symbol = Symbol::new(cte.name.clone(), SymbolKind::Table, ty, cte.span);

        // Recursive members see the table being defined.
        if recursive {
            self.scopes.define(symbol);
            for arm in &cte.body.rest {
                self.check_select(&arm.select);
            }
        } else {
            for arm in &cte.body.rest {
                self.check_select(&arm.select);
            }
            self.scopes.define(symbol);
        }
    }

    fn check_set_expr(&mut self, set: &SetExpr) -> Columns {
        let first = self.check_select(&set.first);
        for arm in &set.rest {
            let columns = self.check_select(&arm.select);
            if let (Some(first), Some(columns)) = (&first, &columns) {
                if first.len() != columns.len() {
                    self.error(
                        format!(
                            "union arms produce different column counts ({} and {})",
                            first.len(),
                            columns.len()
                        ),
                        arm.select.span,
                    );
                }
            }
        }
        first
    }

    fn check_select(&mut self, select: &Select) -> Columns {
        let source = match &select.from {
            Some(from) => {
                let ty = self.table_type(&from.name, from.span).unwrap_or(TypeInfo::Any);
                self.push_row(&from.name, from.alias.as_deref(), &ty, Operation::Select);
                Some(ty)
            }
            None => {
                self.scopes.push(ScopeKind::Block);
                None
            }
        };
        let source_columns = source.as_ref().and_then(column_names).map(<[_]>::to_vec);

        if let Some(hierarchy) = &select.hierarchy {
            match (&select.from, &source_columns) {
                (None, _) => self.error("`hierarchy by` requires a `from` table", hierarchy.span),
                (Some(from), Some(columns)) => {
                    self.require_column(&from.name, columns, &hierarchy.key, hierarchy.span);
                    self.require_column(&from.name, columns, &hierarchy.parent, hierarchy.span);
                }
                (Some(_), None) => {}
            }
            self.scopes.define(Symbol::new(
                LEVEL_COLUMN,
                SymbolKind::Variable,
                TypeInfo::Integer,
                hierarchy.span,
            ));
            if let Some(start_with) = &hierarchy.start_with {
                self.check_condition(start_with, "start with");
            }
        }

        if let Some(filter) = &select.filter {
            self.check_condition(filter, "where");
        }

        let mut outputs: Vec<(String, TypeInfo)> = Vec::new();
        let mut known = true;
        let mut aliases: Vec<(String, TypeInfo)> = Vec::new();
        for (position, item) in select.projection.iter().enumerate() {
            match item {
                SelectItem::Wildcard => match (&select.from, &source_columns) {
                    (Some(from), Some(columns)) => {
                        for (name, ty) in columns {
                            self.check_visibility(&from.name, name, Operation::Select, select.span);
                            outputs.push((name.clone(), ty.clone()));
                        }
                        if select.hierarchy.is_some() {
                            outputs.push((LEVEL_COLUMN.to_string(), TypeInfo::Integer));
                        }
                    }
                    (Some(_), None) => known = false,
                    (None, _) => self.error("`*` requires a `from` table", select.span),
                },
                SelectItem::Expr { expr, alias } => {
                    let ty = self.infer(expr);
                    if let Some(alias) = alias {
                        aliases.push((alias.clone(), ty.clone()));
                    }
                    outputs.push((item.output_name(position), ty));
                }
                SelectItem::Window(window) => {
                    for expr in window.args.iter().chain(&window.partition_by) {
                        self.infer(expr);
                    }
                    for order in &window.order_by {
                        self.infer(&order.expr);
                    }
                    if let Some(alias) = &window.alias {
                        aliases.push((alias.clone(), TypeInfo::Integer));
                    }
                    outputs.push((item.output_name(position), TypeInfo::Integer));
                }
            }
        }

        // `order by` may name projection aliases.
        for (alias, ty) in aliases {
            self.scopes
                .define(Symbol::new(alias, SymbolKind::Variable, ty, select.span));
        }
        for order in &select.order_by {
            self.infer(&order.expr);
        }
        if let Some(limit) = &select.limit {
            let ty = self.infer(limit);
            if !matches!(ty, TypeInfo::Integer | TypeInfo::Any | TypeInfo::Null) {
                self.error(format!("limit must be an integer, found {ty}"), limit.span);
            }
        }

        self.scopes.pop();
        known.then_some(outputs)
    }
}
