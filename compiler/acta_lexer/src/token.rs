//! Cooked tokens handed to the parser.

use acta_ir::{DurationUnit, Span};
use std::fmt;

/// A token with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// Token kinds.
///
/// Keywords are matched case-insensitively so that relational statements can
/// be written in upper case (`SELECT * FROM t`). Words such as `key`,
/// `parent` or `over` stay identifiers and are recognized by the parser in
/// context.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    /// Body of a `date'…'` literal, unparsed.
    Date(String),
    /// Body of a `time'…'` literal, unparsed.
    Time(String),
    Duration(i64, DurationUnit),
    Ident(String),

    // Statement keywords
    Let,
    Function,
    Struct,
    Return,
    If,
    Else,
    While,
    For,
    In,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Fallthrough,
    Start,
    Stop,

    // Value keywords
    True,
    False,
    Null,
    And,
    Or,
    Not,
    Is,

    // Relational keywords
    Select,
    Distinct,
    From,
    As,
    Where,
    Order,
    By,
    Limit,
    Union,
    With,
    Create,
    Table,
    Index,
    Unique,
    Primary,
    Drop,
    Alter,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Hierarchy,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,

    // Operators
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AmpAmp,
    PipePipe,

    /// Unrecognized input; the parser reports it.
    Error,
    Eof,
}

impl TokenKind {
    /// Short human description used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Int(n) => format!("integer `{n}`"),
            TokenKind::Float(f) => format!("float `{f}`"),
            TokenKind::Str(s) => format!("string \"{s}\""),
            TokenKind::Date(s) => format!("date literal '{s}'"),
            TokenKind::Time(s) => format!("time literal '{s}'"),
            TokenKind::Duration(v, u) => format!("duration `{v}{}`", u.suffix()),
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Error => "invalid token".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("`{other}`"),
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, TokenKind::Eof)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Int(n) => return write!(f, "{n}"),
            TokenKind::Float(v) => return write!(f, "{v}"),
            TokenKind::Str(s) => return write!(f, "\"{s}\""),
            TokenKind::Date(s) => return write!(f, "date'{s}'"),
            TokenKind::Time(s) => return write!(f, "time'{s}'"),
            TokenKind::Duration(v, u) => return write!(f, "{v}{}", u.suffix()),
            TokenKind::Ident(name) => return write!(f, "{name}"),
            TokenKind::Let => "let",
            TokenKind::Function => "function",
            TokenKind::Struct => "struct",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::In => "in",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::Default => "default",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Fallthrough => "fallthrough",
            TokenKind::Start => "start",
            TokenKind::Stop => "stop",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::Is => "is",
            TokenKind::Select => "select",
            TokenKind::Distinct => "distinct",
            TokenKind::From => "from",
            TokenKind::As => "as",
            TokenKind::Where => "where",
            TokenKind::Order => "order",
            TokenKind::By => "by",
            TokenKind::Limit => "limit",
            TokenKind::Union => "union",
            TokenKind::With => "with",
            TokenKind::Create => "create",
            TokenKind::Table => "table",
            TokenKind::Index => "index",
            TokenKind::Unique => "unique",
            TokenKind::Primary => "primary",
            TokenKind::Drop => "drop",
            TokenKind::Alter => "alter",
            TokenKind::Insert => "insert",
            TokenKind::Into => "into",
            TokenKind::Values => "values",
            TokenKind::Update => "update",
            TokenKind::Set => "set",
            TokenKind::Delete => "delete",
            TokenKind::Hierarchy => "hierarchy",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Bang => "!",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Error => "<error>",
            TokenKind::Eof => "<eof>",
        };
        f.write_str(text)
    }
}

/// Token sequence terminated by exactly one `Eof`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn kinds(&self) -> impl Iterator<Item = &TokenKind> {
        self.tokens.iter().map(|t| &t.kind)
    }
}

impl std::ops::Index<usize> for TokenList {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}
