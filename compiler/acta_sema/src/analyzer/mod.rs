//! The analyzer: statements and declarations.

mod expr;
mod relational;

use crate::schema::TableSchema;
use crate::scope::{ScopeKind, Scopes, Symbol, SymbolKind};
use crate::types::{BuiltinTypes, TypeInfo};
use crate::visibility::{Operation, Visibility, VisibilityPolicy};
use acta_diagnostic::Diagnostic;
use acta_ir::{Block, Expr, FunctionDecl, Program, Span, Stmt, StmtKind, StructDecl, TypeExpr,
    TypeExprKind};
use acta_stack::ensure_sufficient_stack;
use tracing::debug;

/// Single-use semantic analyzer.
pub struct Analyzer<'a> {
    builtins: &'a BuiltinTypes,
    policy: &'a dyn VisibilityPolicy,
    scopes: Scopes,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl<'a> Analyzer<'a> {
    pub fn new(builtins: &'a BuiltinTypes, policy: &'a dyn VisibilityPolicy) -> Self {
        Analyzer {
            builtins,
            policy,
            scopes: Scopes::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Seed a host parameter into the global scope.
    pub fn declare_parameter(&mut self, name: &str, ty: TypeInfo) {
        self.scopes
            .define(Symbol::new(name, SymbolKind::Parameter, ty, Span::DUMMY));
    }

    /// Make a host table known to the analyzer.
    pub fn declare_table(&mut self, schema: &TableSchema) {
        self.scopes.define(Symbol::new(
            schema.name.clone(),
            SymbolKind::Table,
            schema.type_info(),
            Span::DUMMY,
        ));
    }

    /// Analyze a program and return the errors found.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn analyze(&mut self, program: &Program) -> Vec<Diagnostic> {
        for stmt in &program.statements {
            self.check_stmt(stmt);
        }
        debug!(
            errors = self.errors.len(),
            warnings = self.warnings.len(),
            scopes = self.scopes.len(),
            "analysis finished"
        );
        self.errors.clone()
    }

    /// Analyze an expression as if it appeared in a `where` clause over
    /// `schema`; columns resolve bare or through `alias`.
    pub fn analyze_row_expression(
        &mut self,
        expr: &Expr,
        schema: &TableSchema,
        alias: Option<&str>,
    ) -> TypeInfo {
        self.push_row(&schema.name, alias, &schema.type_info(), Operation::Select);
        let ty = self.infer(expr);
        self.scopes.pop();
        ty
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Informational diagnostics about implicit conversions.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    // ===== Diagnostics helpers =====

    fn error(&mut self, message: impl Into<String>, span: Span) {
        self.errors.push(Diagnostic::error(message, span));
    }

    fn warning(&mut self, message: impl Into<String>, span: Span) {
        self.warnings.push(Diagnostic::warning(message, span));
    }

    fn check_visibility(&mut self, table: &str, field: &str, operation: Operation, span: Span) {
        if let Visibility::Denied(reason) = self.policy.check(table, field, operation) {
            let mut message = format!("{operation} access to `{table}.{field}` is not allowed");
            if !reason.is_empty() {
                message.push_str(": ");
                message.push_str(&reason);
            }
            self.error(message, span);
        }
    }

    // ===== Declarations =====

    /// Define `name` in the current scope, reporting a clash with any
    /// visible declaration.
    fn declare(&mut self, name: &str, kind: SymbolKind, ty: TypeInfo, span: Span) {
        if let Some(existing) = self.scopes.lookup(name) {
            if !matches!(
                existing.kind,
                SymbolKind::Column { .. } | SymbolKind::RowAlias { .. }
            ) {
                self.error(format!("`{name}` is already declared"), span);
            }
        }
        self.scopes.define(Symbol::new(name, kind, ty, span));
    }

    fn resolve_type(&mut self, ty: &TypeExpr) -> TypeInfo {
        match &ty.kind {
            TypeExprKind::Named(name) => {
                if let Some(builtin) = self.builtins.get(name) {
                    return builtin.clone();
                }
                match self.scopes.lookup(name) {
                    Some(symbol) if matches!(symbol.kind, SymbolKind::Struct | SymbolKind::Type) => {
                        symbol.ty.clone()
                    }
                    _ => {
                        self.error(format!("unknown type `{name}`"), ty.span);
                        TypeInfo::Any
                    }
                }
            }
            TypeExprKind::Array { element, size } => TypeInfo::Array {
                element: Box::new(self.resolve_type(element)),
                size: *size,
            },
        }
    }

    // ===== Statements =====

    fn check_stmt(&mut self, stmt: &Stmt) {
        ensure_sufficient_stack(|| self.check_stmt_inner(stmt));
    }

    fn check_stmt_inner(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Let { name, ty, init } => {
                let declared = ty.as_ref().map(|t| self.resolve_type(t));
                let init_ty = init.as_ref().map(|e| (self.infer(e), e.span));
                if let (Some(declared), Some((init_ty, span))) = (&declared, &init_ty) {
                    if !declared.is_compatible(init_ty) {
                        self.error(
                            format!(
                                "cannot initialize `{name}` of type {declared} with a value of type {init_ty}"
                            ),
                            *span,
                        );
                    }
                }
                let ty = match (declared, init_ty) {
                    (Some(declared), _) => declared,
                    (None, Some((TypeInfo::Null | TypeInfo::Void, _))) | (None, None) => {
                        TypeInfo::Any
                    }
                    (None, Some((inferred, _))) => inferred,
                };
                self.declare(name, SymbolKind::Variable, ty, stmt.span);
            }
            StmtKind::Expr(expr) => {
                self.infer(expr);
            }
            StmtKind::Return(value) => {
                let found = value.as_ref().map(|e| self.infer(e));
                let expected = self.scopes.function_return().flatten().cloned();
                if let (Some(expected), Some(found)) = (expected, found) {
                    if !expected.is_compatible(&found) {
                        self.error(
                            format!("function returns {expected}, found a value of type {found}"),
                            stmt.span,
                        );
                    }
                }
            }
            StmtKind::Block(block) => self.check_block(block, ScopeKind::Block),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.check_condition(cond, "if");
                self.check_block(then_branch, ScopeKind::Block);
                if let Some(else_branch) = else_branch {
                    self.check_stmt(else_branch);
                }
            }
            StmtKind::While { cond, body } => {
                self.check_condition(cond, "while");
                self.check_block(body, ScopeKind::Loop);
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => {
                self.scopes.push(ScopeKind::Loop);
                if let Some(init) = init {
                    self.check_stmt(init);
                }
                if let Some(cond) = cond {
                    self.check_condition(cond, "for");
                }
                if let Some(update) = update {
                    self.infer(update);
                }
                for stmt in &body.statements {
                    self.check_stmt(stmt);
                }
                self.scopes.pop();
            }
            StmtKind::ForIn {
                var,
                iterable,
                body,
            } => {
                let iterable_ty = self.infer(iterable);
                let element = match iterable_ty {
                    TypeInfo::Array { element, .. } => *element,
                    TypeInfo::String => TypeInfo::String,
                    TypeInfo::Tree => TypeInfo::Node,
                    TypeInfo::Table { name, columns } => TypeInfo::Struct {
                        name,
                        fields: columns,
                    },
                    TypeInfo::SqlResult | TypeInfo::Any | TypeInfo::Null => TypeInfo::Any,
                    other => {
                        self.error(
                            format!("cannot iterate over a value of type {other}"),
                            iterable.span,
                        );
                        TypeInfo::Any
                    }
                };
                self.scopes.push(ScopeKind::Loop);
                self.declare(var, SymbolKind::Variable, element, stmt.span);
                for stmt in &body.statements {
                    self.check_stmt(stmt);
                }
                self.scopes.pop();
            }
            StmtKind::Switch { subject, cases } => {
                let subject_ty = self.infer(subject);
                self.scopes.push(ScopeKind::Switch);
                for case in cases {
                    for value in &case.values {
                        let value_ty = self.infer(value);
                        if !value_ty.is_compatible(&subject_ty) {
                            self.error(
                                format!(
                                    "case value of type {value_ty} is not compatible with switch subject of type {subject_ty}"
                                ),
                                value.span,
                            );
                        }
                    }
                    self.scopes.push(ScopeKind::Case);
                    for stmt in &case.body {
                        self.check_stmt(stmt);
                    }
                    self.scopes.pop();
                }
                self.scopes.pop();
            }
            StmtKind::Break => {
                if !self.in_breakable() {
                    self.error("`break` outside of a loop or switch", stmt.span);
                }
            }
            StmtKind::Continue => {
                // A switch does not absorb `continue`; only a loop does.
                let in_loop = self
                    .scopes
                    .enclosing()
                    .any(|kind| matches!(kind, ScopeKind::Loop));
                if !in_loop {
                    self.error("`continue` outside of a loop", stmt.span);
                }
            }
            StmtKind::Fallthrough => {
                let in_case = self
                    .scopes
                    .enclosing()
                    .find(|kind| matches!(kind, ScopeKind::Case | ScopeKind::Loop))
                    .is_some_and(|kind| *kind == ScopeKind::Case);
                if !in_case {
                    self.error("`fallthrough` outside of a switch case", stmt.span);
                }
            }
            StmtKind::Function(decl) => self.check_function(decl, stmt.span),
            StmtKind::Struct(decl) => self.check_struct(decl, stmt.span),
            StmtKind::CreateTable(create) => self.check_create_table(create, stmt.span),
            StmtKind::CreateIndex(index) => self.check_create_index(index, stmt.span),
            StmtKind::DropTable { name } => {
                self.table_type(name, stmt.span);
            }
            StmtKind::AlterTable(alter) => self.check_alter_table(alter, stmt.span),
            StmtKind::Insert(insert) => self.check_insert(insert, stmt.span),
            StmtKind::Update(update) => self.check_update(update, stmt.span),
            StmtKind::Delete(delete) => self.check_delete(delete, stmt.span),
        }
    }

    fn in_breakable(&self) -> bool {
        self.scopes
            .enclosing()
            .any(|kind| matches!(kind, ScopeKind::Loop | ScopeKind::Switch))
    }

    fn check_block(&mut self, block: &Block, kind: ScopeKind) {
        self.scopes.push(kind);
        for stmt in &block.statements {
            self.check_stmt(stmt);
        }
        self.scopes.pop();
    }

    /// Conditions must be boolean (or statically unknown).
    fn check_condition(&mut self, cond: &Expr, context: &str) {
        let ty = self.infer(cond);
        if !matches!(ty, TypeInfo::Boolean | TypeInfo::Any | TypeInfo::Null) {
            self.error(
                format!("{context} condition must be boolean, found {ty}"),
                cond.span,
            );
        }
    }

    fn check_function(&mut self, decl: &FunctionDecl, span: Span) {
        let params: Vec<TypeInfo> = decl
            .params
            .iter()
            .map(|p| p.ty.as_ref().map_or(TypeInfo::Any, |t| self.resolve_type(t)))
            .collect();
        let return_type = decl.return_type.as_ref().map(|t| self.resolve_type(t));
        let fn_ty = TypeInfo::Function {
            params: params.clone(),
            ret: Box::new(return_type.clone().unwrap_or(TypeInfo::Any)),
        };
        // Declared before the body so recursive calls resolve.
        self.declare(&decl.name, SymbolKind::Function, fn_ty, span);

        self.scopes.push(ScopeKind::Function { return_type });
        for (param, ty) in decl.params.iter().zip(params) {
            if self.scopes.lookup_local(&param.name).is_some() {
                self.error(format!("duplicate parameter `{}`", param.name), param.span);
            }
            self.scopes.define(Symbol::new(
                param.name.clone(),
                SymbolKind::Parameter,
                ty,
                param.span,
            ));
        }
        for stmt in &decl.body.statements {
            self.check_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn check_struct(&mut self, decl: &StructDecl, span: Span) {
        let mut fields: Vec<(String, TypeInfo)> = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            if fields.iter().any(|(name, _)| *name == field.name) {
                self.error(
                    format!("duplicate field `{}` in struct `{}`", field.name, decl.name),
                    field.span,
                );
                continue;
            }
            let ty = self.resolve_type(&field.ty);
            fields.push((field.name.clone(), ty));
        }
        let ty = TypeInfo::Struct {
            name: decl.name.clone(),
            fields,
        };
        self.declare(&decl.name, SymbolKind::Struct, ty, span);
    }
}
