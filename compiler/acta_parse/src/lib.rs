//! Parser for Acta.
//!
//! A recursive descent parser over the token list produced by `acta_lexer`.
//! It builds the owned syntax tree from `acta_ir` and collects diagnostics
//! instead of stopping at the first error: after a failed statement it skips
//! to the next `;`, `}` or statement keyword and carries on.
//!
//! Programs are a list of declarations and statements; a `start … stop`
//! section contributes its statements to the top level in order.

mod expr;
mod query;
mod relational;
mod stmt;

use acta_diagnostic::{Diagnostic, DiagnosticBag};
use acta_ir::{Expr, Program, Span};
use acta_lexer::{Token, TokenKind};
use tracing::debug;

type PResult<T> = Result<T, Diagnostic>;

/// Result of parsing a whole program.
#[derive(Debug)]
pub struct ParseOutput {
    pub program: Program,
    pub diagnostics: DiagnosticBag,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Result of parsing a standalone expression.
#[derive(Debug)]
pub struct ExprParseOutput {
    /// `None` when the expression could not be parsed at all.
    pub expr: Option<Expr>,
    pub diagnostics: DiagnosticBag,
}

/// Parse a complete program.
pub fn parse_program(source: &str) -> ParseOutput {
    let mut parser = Parser::new(source);
    let program = parser.program();
    debug!(
        statements = program.statements.len(),
        errors = parser.diagnostics.error_count(),
        "parsed program"
    );
    ParseOutput {
        program,
        diagnostics: parser.diagnostics,
    }
}

/// Parse a single expression, such as a host-supplied filter.
///
/// The expression is read in relational context, so `=` compares instead of
/// assigning.
pub fn parse_expression(source: &str) -> ExprParseOutput {
    let mut parser = Parser::new(source);
    parser.sql_depth = 1;
    let expr = match parser.expression() {
        Ok(expr) => {
            if parser.at_end() {
                Some(expr)
            } else {
                let found = parser.current_kind().describe();
                parser.error_here(format!("unexpected {found} after expression"));
                None
            }
        }
        Err(diag) => {
            parser.diagnostics.push(diag);
            None
        }
    };
    ExprParseOutput {
        expr,
        diagnostics: parser.diagnostics,
    }
}

/// Parser state.
pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: DiagnosticBag,
    /// Nesting depth of relational clauses; inside them `=` is equality.
    sql_depth: u32,
}

impl Parser {
    fn new(source: &str) -> Self {
        let mut diagnostics = DiagnosticBag::new();
        let mut tokens = Vec::new();
        for token in acta_lexer::lex(source).as_slice() {
            if token.kind == TokenKind::Error {
                let text = source
                    .get(token.span.start as usize..token.span.end as usize)
                    .unwrap_or("");
                diagnostics.error(format!("unrecognized token `{text}`"), token.span);
            } else {
                tokens.push(token.clone());
            }
        }
        Parser {
            tokens,
            pos: 0,
            diagnostics,
            sql_depth: 0,
        }
    }

    // ===== Token access =====

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token.
    fn prev_span(&self) -> Span {
        match self.pos.checked_sub(1) {
            Some(prev) => self.tokens[prev.min(self.tokens.len() - 1)].span,
            None => self.current_span(),
        }
    }

    fn peek(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn at_end(&self) -> bool {
        self.current_kind().is_eof()
    }

    /// Consume the current token and return its span.
    fn bump(&mut self) -> Span {
        let span = self.current_span();
        if !self.at_end() {
            self.pos += 1;
        }
        span
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<Span> {
        if self.check(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&format!("`{kind}`")))
        }
    }

    /// Whether the current token is the identifier `word` (any case).
    fn check_word(&self, word: &str) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(name) if name.eq_ignore_ascii_case(word))
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_word(&mut self, word: &str) -> PResult<Span> {
        if self.check_word(word) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&format!("`{word}`")))
        }
    }

    fn ident(&mut self, what: &str) -> PResult<(String, Span)> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                Ok((name, self.bump()))
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Parse `a, b, c` with `item` until it no longer sees a comma.
    fn comma_list<T>(&mut self, mut item: impl FnMut(&mut Self) -> PResult<T>) -> PResult<Vec<T>> {
        let mut items = vec![item(self)?];
        while self.eat(&TokenKind::Comma) {
            items.push(item(self)?);
        }
        Ok(items)
    }

    // ===== Diagnostics =====

    fn unexpected(&self, expected: &str) -> Diagnostic {
        Diagnostic::error(
            format!("expected {expected}, found {}", self.current_kind().describe()),
            self.current_span(),
        )
    }

    fn error_here(&mut self, message: String) {
        let span = self.current_span();
        self.diagnostics.error(message, span);
    }

    /// Skip to a plausible statement boundary after an error.
    fn recover(&mut self) {
        let start = self.pos;
        while !self.at_end() {
            match self.current_kind() {
                TokenKind::Semicolon => {
                    self.bump();
                    return;
                }
                TokenKind::RBrace | TokenKind::Stop | TokenKind::Case | TokenKind::Default => {
                    return
                }
                TokenKind::Let
                | TokenKind::Function
                | TokenKind::Struct
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Switch
                | TokenKind::Start
                    if self.pos > start =>
                {
                    return
                }
                _ => {
                    self.bump();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
