//! Statement and declaration parsing.

use crate::{PResult, Parser};
use acta_ir::{
    Block, FunctionDecl, Param, Program, Stmt, StmtKind, StructDecl, StructField, SwitchCase,
    TypeExpr, TypeExprKind,
};
use acta_lexer::TokenKind;
use acta_stack::ensure_sufficient_stack;

impl Parser {
    pub(crate) fn program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.at_end() {
            if self.check(&TokenKind::Start) {
                self.start_section(&mut statements);
            } else {
                self.statement_or_recover(&mut statements);
            }
        }
        Program::new(statements)
    }

    /// `start … stop`: the action body.
    fn start_section(&mut self, statements: &mut Vec<Stmt>) {
        let start = self.bump();
        while !self.check(&TokenKind::Stop) && !self.at_end() {
            self.statement_or_recover(statements);
        }
        if self.eat(&TokenKind::Stop) {
            self.eat(&TokenKind::Semicolon);
        } else {
            self.diagnostics
                .error("expected `stop` to close the `start` section", start);
        }
    }

    /// Parse one statement, recording the error and resynchronizing on failure.
    pub(crate) fn statement_or_recover(&mut self, out: &mut Vec<Stmt>) {
        let before = self.pos;
        match self.statement() {
            Ok(stmt) => out.push(stmt),
            Err(diag) => {
                self.diagnostics.push(diag);
                self.recover();
                if self.pos == before {
                    self.bump();
                }
            }
        }
    }

    pub(crate) fn statement(&mut self) -> PResult<Stmt> {
        ensure_sufficient_stack(|| self.statement_inner())
    }

    fn statement_inner(&mut self) -> PResult<Stmt> {
        let start = self.current_span();
        match self.current_kind() {
            TokenKind::Let => self.let_statement(),
            TokenKind::Function => self.function_decl(),
            TokenKind::Struct => self.struct_decl(),
            TokenKind::Return => {
                self.bump();
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.end_statement();
                Ok(Stmt::new(StmtKind::Return(value), start.merge(self.prev_span())))
            }
            TokenKind::If => self.if_statement(),
            TokenKind::While => {
                self.bump();
                let cond = self.expression()?;
                let body = self.block()?;
                let span = start.merge(body.span);
                Ok(Stmt::new(StmtKind::While { cond, body }, span))
            }
            TokenKind::For => self.for_statement(),
            TokenKind::Switch => self.switch_statement(),
            TokenKind::Break => self.keyword_statement(StmtKind::Break),
            TokenKind::Continue => self.keyword_statement(StmtKind::Continue),
            TokenKind::Fallthrough => self.keyword_statement(StmtKind::Fallthrough),
            TokenKind::LBrace => {
                let block = self.block()?;
                let span = block.span;
                Ok(Stmt::new(StmtKind::Block(block), span))
            }
            TokenKind::Create => self.create_statement(),
            TokenKind::Drop => self.drop_statement(),
            TokenKind::Alter => self.alter_statement(),
            TokenKind::Insert => self.insert_statement(),
            TokenKind::Update => self.update_statement(),
            TokenKind::Delete => self.delete_statement(),
            _ => {
                let expr = self.expression()?;
                self.end_statement();
                Ok(Stmt::expr(expr))
            }
        }
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Stop | TokenKind::Eof
        )
    }

    /// Statement terminators are optional.
    pub(crate) fn end_statement(&mut self) {
        self.eat(&TokenKind::Semicolon);
    }

    fn keyword_statement(&mut self, kind: StmtKind) -> PResult<Stmt> {
        let span = self.bump();
        self.end_statement();
        Ok(Stmt::new(kind, span))
    }

    fn let_statement(&mut self) -> PResult<Stmt> {
        let start = self.bump();
        let (name, _) = self.ident("variable name")?;
        let ty = if self.eat(&TokenKind::Colon) {
            Some(self.type_expr()?)
        } else {
            None
        };
        let init = if self.eat(&TokenKind::Eq) {
            Some(self.expression()?)
        } else {
            None
        };
        let span = start.merge(self.prev_span());
        self.end_statement();
        Ok(Stmt::new(StmtKind::Let { name, ty, init }, span))
    }

    /// `integer`, `string[]`, `float[3]`, `Point`.
    pub(crate) fn type_expr(&mut self) -> PResult<TypeExpr> {
        let (name, span) = self.ident("type name")?;
        let mut ty = TypeExpr {
            kind: TypeExprKind::Named(name),
            span,
        };
        while self.check(&TokenKind::LBracket) {
            self.bump();
            let size = match *self.current_kind() {
                TokenKind::Int(n) => {
                    self.bump();
                    match usize::try_from(n) {
                        Ok(size) => Some(size),
                        Err(_) => {
                            return Err(acta_diagnostic::Diagnostic::error(
                                format!("invalid array size `{n}`"),
                                self.prev_span(),
                            ))
                        }
                    }
                }
                _ => None,
            };
            let end = self.expect(&TokenKind::RBracket)?;
            ty = TypeExpr {
                kind: TypeExprKind::Array {
                    element: Box::new(ty),
                    size,
                },
                span: span.merge(end),
            };
        }
        Ok(ty)
    }

    fn function_decl(&mut self) -> PResult<Stmt> {
        let start = self.bump();
        let (name, _) = self.ident("function name")?;
        self.expect(&TokenKind::LParen)?;
        let params = if self.check(&TokenKind::RParen) {
            Vec::new()
        } else {
            self.comma_list(|p| {
                let (name, span) = p.ident("parameter name")?;
                let ty = if p.eat(&TokenKind::Colon) {
                    Some(p.type_expr()?)
                } else {
                    None
                };
                Ok(Param {
                    name,
                    ty,
                    span: span.merge(p.prev_span()),
                })
            })?
        };
        self.expect(&TokenKind::RParen)?;
        let return_type = if self.eat(&TokenKind::Colon) {
            Some(self.type_expr()?)
        } else {
            None
        };
        let body = self.block()?;
        let span = start.merge(body.span);
        Ok(Stmt::new(
            StmtKind::Function(FunctionDecl {
                name,
                params,
                return_type,
                body,
            }),
            span,
        ))
    }

    fn struct_decl(&mut self) -> PResult<Stmt> {
        let start = self.bump();
        let (name, _) = self.ident("struct name")?;
        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let (field, span) = self.ident("field name")?;
            self.expect(&TokenKind::Colon)?;
            let ty = self.type_expr()?;
            fields.push(StructField {
                name: field,
                ty,
                span: span.merge(self.prev_span()),
            });
            if !self.eat(&TokenKind::Comma) {
                self.eat(&TokenKind::Semicolon);
            }
        }
        let end = self.expect(&TokenKind::RBrace)?;
        self.end_statement();
        Ok(Stmt::new(
            StmtKind::Struct(StructDecl { name, fields }),
            start.merge(end),
        ))
    }

    pub(crate) fn block(&mut self) -> PResult<Block> {
        let start = self.expect(&TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            self.statement_or_recover(&mut statements);
        }
        let end = self.expect(&TokenKind::RBrace)?;
        Ok(Block::new(statements, start.merge(end)))
    }

    fn if_statement(&mut self) -> PResult<Stmt> {
        let start = self.bump();
        let cond = self.expression()?;
        let then_branch = self.block()?;
        let else_branch = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(Box::new(self.if_statement()?))
            } else {
                let block = self.block()?;
                let span = block.span;
                Some(Box::new(Stmt::new(StmtKind::Block(block), span)))
            }
        } else {
            None
        };
        let span = start.merge(self.prev_span());
        Ok(Stmt::new(
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    /// `for x in items { … }`, `for (x in items) { … }` or
    /// `for (init; cond; update) { … }`.
    fn for_statement(&mut self) -> PResult<Stmt> {
        let start = self.bump();
        let parens = self.check(&TokenKind::LParen);
        let offset = usize::from(parens);
        let is_for_in = matches!(self.peek(offset), TokenKind::Ident(_))
            && matches!(self.peek(offset + 1), TokenKind::In);

        if is_for_in {
            if parens {
                self.bump();
            }
            let (var, _) = self.ident("loop variable")?;
            self.expect(&TokenKind::In)?;
            let iterable = self.expression()?;
            if parens {
                self.expect(&TokenKind::RParen)?;
            }
            let body = self.block()?;
            let span = start.merge(body.span);
            return Ok(Stmt::new(
                StmtKind::ForIn {
                    var,
                    iterable,
                    body,
                },
                span,
            ));
        }

        self.expect(&TokenKind::LParen)?;
        let init = if self.eat(&TokenKind::Semicolon) {
            None
        } else if self.check(&TokenKind::Let) {
            // `let` consumes its own terminator.
            Some(Box::new(self.let_statement()?))
        } else {
            let expr = self.expression()?;
            self.expect(&TokenKind::Semicolon)?;
            Some(Box::new(Stmt::expr(expr)))
        };
        let cond = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(&TokenKind::Semicolon)?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(&TokenKind::RParen)?;
        let body = self.block()?;
        let span = start.merge(body.span);
        Ok(Stmt::new(
            StmtKind::For {
                init,
                cond,
                update,
                body,
            },
            span,
        ))
    }

    fn switch_statement(&mut self) -> PResult<Stmt> {
        let start = self.bump();
        let subject = self.expression()?;
        self.expect(&TokenKind::LBrace)?;
        let mut cases = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let case_start = self.current_span();
            let values = match self.current_kind() {
                TokenKind::Case => {
                    self.bump();
                    self.comma_list(Parser::expression)?
                }
                TokenKind::Default => {
                    self.bump();
                    Vec::new()
                }
                _ => return Err(self.unexpected("`case` or `default`")),
            };
            self.expect(&TokenKind::Colon)?;
            let mut body = Vec::new();
            while !matches!(
                self.current_kind(),
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
            ) {
                self.statement_or_recover(&mut body);
            }
            cases.push(SwitchCase {
                values,
                body,
                span: case_start.merge(self.prev_span()),
            });
        }
        let end = self.expect(&TokenKind::RBrace)?;
        Ok(Stmt::new(
            StmtKind::Switch { subject, cases },
            start.merge(end),
        ))
    }
}
