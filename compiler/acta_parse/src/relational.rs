//! Data definition and manipulation statements.

use crate::{PResult, Parser};
use acta_ir::{
    AlterAction, AlterTable, Assignment, ColumnSpec, CreateIndex, CreateTable, Delete, Insert,
    InsertSource, Stmt, StmtKind, Update,
};
use acta_lexer::TokenKind;

impl Parser {
    /// `create table …` or `create [unique] index …`.
    pub(crate) fn create_statement(&mut self) -> PResult<Stmt> {
        let start = self.bump();
        if self.eat(&TokenKind::Table) {
            let (name, _) = self.ident("table name")?;
            self.expect(&TokenKind::LParen)?;
            let columns = self.comma_list(Parser::column_spec)?;
            self.expect(&TokenKind::RParen)?;
            let span = start.merge(self.prev_span());
            self.end_statement();
            return Ok(Stmt::new(
                StmtKind::CreateTable(CreateTable { name, columns }),
                span,
            ));
        }

        let unique = self.eat(&TokenKind::Unique);
        if !self.eat(&TokenKind::Index) {
            return Err(self.unexpected("`table` or `index`"));
        }
        let (name, _) = self.ident("index name")?;
        self.expect_word("on")?;
        let (table, _) = self.ident("table name")?;
        self.expect(&TokenKind::LParen)?;
        let columns = self.comma_list(|p| p.ident("column name").map(|(n, _)| n))?;
        self.expect(&TokenKind::RParen)?;
        let span = start.merge(self.prev_span());
        self.end_statement();
        Ok(Stmt::new(
            StmtKind::CreateIndex(CreateIndex {
                name,
                table,
                columns,
                unique,
            }),
            span,
        ))
    }

    /// `name type [(n)] [primary key] [not null] [null] [unique] [default e]`
    fn column_spec(&mut self) -> PResult<ColumnSpec> {
        let (name, start) = self.ident("column name")?;
        let (type_name, _) = self.ident("column type")?;
        // Length qualifiers such as `varchar(20)` are accepted and ignored.
        if self.eat(&TokenKind::LParen) {
            if matches!(self.current_kind(), TokenKind::Int(_)) {
                self.bump();
            }
            self.expect(&TokenKind::RParen)?;
        }

        let mut spec = ColumnSpec {
            name,
            type_name: type_name.to_ascii_lowercase(),
            primary_key: false,
            not_null: false,
            unique: false,
            default: None,
            span: start,
        };
        loop {
            match self.current_kind() {
                TokenKind::Primary => {
                    self.bump();
                    self.expect_word("key")?;
                    spec.primary_key = true;
                }
                TokenKind::Not => {
                    self.bump();
                    self.expect(&TokenKind::Null)?;
                    spec.not_null = true;
                }
                TokenKind::Null => {
                    self.bump();
                }
                TokenKind::Unique => {
                    self.bump();
                    spec.unique = true;
                }
                TokenKind::Default => {
                    self.bump();
                    spec.default = Some(self.sql_expression()?);
                }
                _ => break,
            }
        }
        spec.span = start.merge(self.prev_span());
        Ok(spec)
    }

    pub(crate) fn drop_statement(&mut self) -> PResult<Stmt> {
        let start = self.bump();
        self.expect(&TokenKind::Table)?;
        let (name, end) = self.ident("table name")?;
        self.end_statement();
        Ok(Stmt::new(StmtKind::DropTable { name }, start.merge(end)))
    }

    /// `alter table t add [column] spec` or `alter table t drop [column] c`.
    pub(crate) fn alter_statement(&mut self) -> PResult<Stmt> {
        let start = self.bump();
        self.expect(&TokenKind::Table)?;
        let (table, _) = self.ident("table name")?;
        let action = if self.eat_word("add") {
            self.eat_word("column");
            AlterAction::AddColumn(self.column_spec()?)
        } else if self.eat(&TokenKind::Drop) {
            self.eat_word("column");
            AlterAction::DropColumn(self.ident("column name")?.0)
        } else {
            return Err(self.unexpected("`add` or `drop`"));
        };
        let span = start.merge(self.prev_span());
        self.end_statement();
        Ok(Stmt::new(
            StmtKind::AlterTable(AlterTable { table, action }),
            span,
        ))
    }

    pub(crate) fn insert_statement(&mut self) -> PResult<Stmt> {
        let start = self.bump();
        self.expect(&TokenKind::Into)?;
        let (table, _) = self.ident("table name")?;
        let columns = if self.check(&TokenKind::LParen)
            && matches!(self.peek(1), TokenKind::Ident(_))
        {
            self.bump();
            let columns = self.comma_list(|p| p.ident("column name").map(|(n, _)| n))?;
            self.expect(&TokenKind::RParen)?;
            columns
        } else {
            Vec::new()
        };

        let source = if self.eat(&TokenKind::Values) {
            let rows = self.comma_list(|p| {
                p.expect(&TokenKind::LParen)?;
                let row = p.comma_list(Parser::sql_expression)?;
                p.expect(&TokenKind::RParen)?;
                Ok(row)
            })?;
            InsertSource::Values(rows)
        } else if self.check(&TokenKind::Select) || self.check(&TokenKind::With) {
            InsertSource::Query(Box::new(self.query()?))
        } else {
            return Err(self.unexpected("`values` or `select`"));
        };

        let span = start.merge(self.prev_span());
        self.end_statement();
        Ok(Stmt::new(
            StmtKind::Insert(Insert {
                table,
                columns,
                source,
            }),
            span,
        ))
    }

    /// `update t set c = e, … [where cond]`
    pub(crate) fn update_statement(&mut self) -> PResult<Stmt> {
        let start = self.bump();
        let (table, _) = self.ident("table name")?;
        self.expect(&TokenKind::Set)?;
        let assignments = self.comma_list(|p| {
            let (column, span) = p.ident("column name")?;
            p.expect(&TokenKind::Eq)?;
            let value = p.sql_expression()?;
            let span = span.merge(value.span);
            Ok(Assignment {
                column,
                value,
                span,
            })
        })?;
        let filter = self.where_clause()?;
        let span = start.merge(self.prev_span());
        self.end_statement();
        Ok(Stmt::new(
            StmtKind::Update(Update {
                table,
                assignments,
                filter,
            }),
            span,
        ))
    }

    /// `delete from t [where cond]`
    pub(crate) fn delete_statement(&mut self) -> PResult<Stmt> {
        let start = self.bump();
        self.expect(&TokenKind::From)?;
        let (table, _) = self.ident("table name")?;
        let filter = self.where_clause()?;
        let span = start.merge(self.prev_span());
        self.end_statement();
        Ok(Stmt::new(StmtKind::Delete(Delete { table, filter }), span))
    }

    fn where_clause(&mut self) -> PResult<Option<acta_ir::Expr>> {
        if self.eat(&TokenKind::Where) {
            Ok(Some(self.sql_expression()?))
        } else {
            Ok(None)
        }
    }
}
