use super::*;
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).kinds().cloned().collect()
}

#[test]
fn test_lexes_let_statement() {
    assert_eq!(
        kinds("let x = 42;"),
        vec![
            TokenKind::Let,
            TokenKind::Ident("x".into()),
            TokenKind::Eq,
            TokenKind::Int(42),
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_keywords_ignore_case() {
    assert_eq!(
        kinds("SELECT Distinct FROM"),
        vec![
            TokenKind::Select,
            TokenKind::Distinct,
            TokenKind::From,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_contextual_words_stay_identifiers() {
    assert_eq!(
        kinds("key parent over"),
        vec![
            TokenKind::Ident("key".into()),
            TokenKind::Ident("parent".into()),
            TokenKind::Ident("over".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lexes_durations() {
    assert_eq!(
        kinds("250ms 90s 5m 2h 3d"),
        vec![
            TokenKind::Duration(250, DurationUnit::Milliseconds),
            TokenKind::Duration(90, DurationUnit::Seconds),
            TokenKind::Duration(5, DurationUnit::Minutes),
            TokenKind::Duration(2, DurationUnit::Hours),
            TokenKind::Duration(3, DurationUnit::Days),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lexes_date_and_time_literals() {
    assert_eq!(
        kinds("date'2024-03-01' time'12:30'"),
        vec![
            TokenKind::Date("2024-03-01".into()),
            TokenKind::Time("12:30".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_date_word_alone_is_an_identifier() {
    assert_eq!(
        kinds("d: date"),
        vec![
            TokenKind::Ident("d".into()),
            TokenKind::Colon,
            TokenKind::Ident("date".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lexes_strings_with_escapes() {
    assert_eq!(
        kinds(r#""a\nb" 'it''s'"#),
        vec![
            TokenKind::Str("a\nb".into()),
            TokenKind::Str("it's".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_skips_comments() {
    assert_eq!(
        kinds("1 // one\n/* two\n */ 2 -- three\n"),
        vec![TokenKind::Int(1), TokenKind::Int(2), TokenKind::Eof]
    );
}

#[test]
fn test_operators_prefer_longest_match() {
    assert_eq!(
        kinds("<= <> == != >="),
        vec![
            TokenKind::LtEq,
            TokenKind::NotEq,
            TokenKind::EqEq,
            TokenKind::NotEq,
            TokenKind::GtEq,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_floats_and_ints() {
    assert_eq!(
        kinds("1.5 10"),
        vec![TokenKind::Float(1.5), TokenKind::Int(10), TokenKind::Eof]
    );
}

#[test]
fn test_unknown_characters_become_error_tokens() {
    let tokens = lex("a @ b");
    assert_eq!(tokens[1].kind, TokenKind::Error);
    assert_eq!(tokens[1].span, Span::new(2, 3));
}

#[test]
fn test_eof_sits_at_source_end() {
    let tokens = lex("x ");
    assert_eq!(tokens[tokens.len() - 1].span, Span::point(2));
}
