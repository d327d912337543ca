//! Lexer for Acta using logos.
//!
//! Turns source text into a [`TokenList`]. Comments and whitespace are
//! dropped; unrecognized input becomes a [`TokenKind::Error`] token so the
//! parser can report it with a span.

mod escape;
mod token;

use acta_ir::{DurationUnit, Span};
use logos::Logos;

pub use token::{Token, TokenKind, TokenList};

/// Raw token from logos, before literal bodies are cooked.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r"//[^\n]*")]
    #[regex(r"--[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[token("let", ignore(ascii_case))]
    Let,
    #[token("function", ignore(ascii_case))]
    Function,
    #[token("struct", ignore(ascii_case))]
    Struct,
    #[token("return", ignore(ascii_case))]
    Return,
    #[token("if", ignore(ascii_case))]
    If,
    #[token("else", ignore(ascii_case))]
    Else,
    #[token("while", ignore(ascii_case))]
    While,
    #[token("for", ignore(ascii_case))]
    For,
    #[token("in", ignore(ascii_case))]
    In,
    #[token("switch", ignore(ascii_case))]
    Switch,
    #[token("case", ignore(ascii_case))]
    Case,
    #[token("default", ignore(ascii_case))]
    Default,
    #[token("break", ignore(ascii_case))]
    Break,
    #[token("continue", ignore(ascii_case))]
    Continue,
    #[token("fallthrough", ignore(ascii_case))]
    Fallthrough,
    #[token("start", ignore(ascii_case))]
    Start,
    #[token("stop", ignore(ascii_case))]
    Stop,

    #[token("true", ignore(ascii_case))]
    True,
    #[token("false", ignore(ascii_case))]
    False,
    #[token("null", ignore(ascii_case))]
    Null,
    #[token("and", ignore(ascii_case))]
    And,
    #[token("or", ignore(ascii_case))]
    Or,
    #[token("not", ignore(ascii_case))]
    Not,
    #[token("is", ignore(ascii_case))]
    Is,

    #[token("select", ignore(ascii_case))]
    Select,
    #[token("distinct", ignore(ascii_case))]
    Distinct,
    #[token("from", ignore(ascii_case))]
    From,
    #[token("as", ignore(ascii_case))]
    As,
    #[token("where", ignore(ascii_case))]
    Where,
    #[token("order", ignore(ascii_case))]
    Order,
    #[token("by", ignore(ascii_case))]
    By,
    #[token("limit", ignore(ascii_case))]
    Limit,
    #[token("union", ignore(ascii_case))]
    Union,
    #[token("with", ignore(ascii_case))]
    With,
    #[token("create", ignore(ascii_case))]
    Create,
    #[token("table", ignore(ascii_case))]
    Table,
    #[token("index", ignore(ascii_case))]
    Index,
    #[token("unique", ignore(ascii_case))]
    Unique,
    #[token("primary", ignore(ascii_case))]
    Primary,
    #[token("drop", ignore(ascii_case))]
    Drop,
    #[token("alter", ignore(ascii_case))]
    Alter,
    #[token("insert", ignore(ascii_case))]
    Insert,
    #[token("into", ignore(ascii_case))]
    Into,
    #[token("values", ignore(ascii_case))]
    Values,
    #[token("update", ignore(ascii_case))]
    Update,
    #[token("set", ignore(ascii_case))]
    Set,
    #[token("delete", ignore(ascii_case))]
    Delete,
    #[token("hierarchy", ignore(ascii_case))]
    Hierarchy,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    #[token("<>")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r"[0-9]+(ms|s|m|h|d)", duration)]
    Duration((i64, DurationUnit)),

    #[regex(r#""([^"\\\n]|\\.|"")*""#)]
    DoubleQuoted,

    #[regex(r"'([^'\\\n]|\\.|'')*'")]
    SingleQuoted,

    #[regex(r"date'[^'\n]*'")]
    Date,

    #[regex(r"time'[^'\n]*'")]
    Time,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

fn duration(lex: &mut logos::Lexer<'_, RawToken>) -> Option<(i64, DurationUnit)> {
    let s = lex.slice();
    let digits = s.find(|c: char| !c.is_ascii_digit())?;
    let (amount, suffix) = s.split_at(digits);
    let unit = match suffix {
        "ms" => DurationUnit::Milliseconds,
        "s" => DurationUnit::Seconds,
        "m" => DurationUnit::Minutes,
        "h" => DurationUnit::Hours,
        "d" => DurationUnit::Days,
        _ => return None,
    };
    amount.parse::<i64>().ok().map(|v| (v, unit))
}

/// Lex source code into a `TokenList`.
///
/// The list always ends with a single `Eof` token positioned at the end of
/// the source.
pub fn lex(source: &str) -> TokenList {
    let mut result = TokenList::new();
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();

        let kind = match token_result {
            Ok(RawToken::LineComment | RawToken::BlockComment) => continue,
            Ok(raw) => convert_token(raw, slice),
            Err(()) => TokenKind::Error,
        };
        result.push(Token::new(kind, span));
    }

    let eof_pos = u32::try_from(source.len()).unwrap_or(u32::MAX);
    result.push(Token::new(TokenKind::Eof, Span::point(eof_pos)));

    result
}

/// Strip the `prefix'` and trailing quote from a quoted literal.
fn quoted_body(slice: &str, prefix_len: usize) -> &str {
    slice
        .get(prefix_len + 1..slice.len().saturating_sub(1))
        .unwrap_or("")
}

fn convert_token(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        RawToken::Int(n) => TokenKind::Int(n),
        RawToken::Float(f) => TokenKind::Float(f),
        RawToken::Duration((v, u)) => TokenKind::Duration(v, u),
        RawToken::DoubleQuoted => TokenKind::Str(escape::unescape(quoted_body(slice, 0), '"')),
        RawToken::SingleQuoted => TokenKind::Str(escape::unescape(quoted_body(slice, 0), '\'')),
        RawToken::Date => TokenKind::Date(quoted_body(slice, 4).to_string()),
        RawToken::Time => TokenKind::Time(quoted_body(slice, 4).to_string()),
        RawToken::Ident => TokenKind::Ident(slice.to_string()),

        RawToken::Let => TokenKind::Let,
        RawToken::Function => TokenKind::Function,
        RawToken::Struct => TokenKind::Struct,
        RawToken::Return => TokenKind::Return,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::For => TokenKind::For,
        RawToken::In => TokenKind::In,
        RawToken::Switch => TokenKind::Switch,
        RawToken::Case => TokenKind::Case,
        RawToken::Default => TokenKind::Default,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Fallthrough => TokenKind::Fallthrough,
        RawToken::Start => TokenKind::Start,
        RawToken::Stop => TokenKind::Stop,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,
        RawToken::And => TokenKind::And,
        RawToken::Or => TokenKind::Or,
        RawToken::Not => TokenKind::Not,
        RawToken::Is => TokenKind::Is,

        RawToken::Select => TokenKind::Select,
        RawToken::Distinct => TokenKind::Distinct,
        RawToken::From => TokenKind::From,
        RawToken::As => TokenKind::As,
        RawToken::Where => TokenKind::Where,
        RawToken::Order => TokenKind::Order,
        RawToken::By => TokenKind::By,
        RawToken::Limit => TokenKind::Limit,
        RawToken::Union => TokenKind::Union,
        RawToken::With => TokenKind::With,
        RawToken::Create => TokenKind::Create,
        RawToken::Table => TokenKind::Table,
        RawToken::Index => TokenKind::Index,
        RawToken::Unique => TokenKind::Unique,
        RawToken::Primary => TokenKind::Primary,
        RawToken::Drop => TokenKind::Drop,
        RawToken::Alter => TokenKind::Alter,
        RawToken::Insert => TokenKind::Insert,
        RawToken::Into => TokenKind::Into,
        RawToken::Values => TokenKind::Values,
        RawToken::Update => TokenKind::Update,
        RawToken::Set => TokenKind::Set,
        RawToken::Delete => TokenKind::Delete,
        RawToken::Hierarchy => TokenKind::Hierarchy,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Dot => TokenKind::Dot,

        RawToken::Eq => TokenKind::Eq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Bang => TokenKind::Bang,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,

        // Filtered out by `lex`.
        RawToken::LineComment | RawToken::BlockComment => TokenKind::Error,
    }
}

#[cfg(test)]
mod tests;
