//! Escape processing for quoted string literals.

/// Resolve backslash escapes inside a string body.
///
/// A doubled quote (`''` inside single quotes, `""` inside double quotes)
/// stands for one quote character, as in SQL.
pub(crate) fn unescape(body: &str, quote: char) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('0') => out.push('\0'),
                Some('\\') | None => out.push('\\'),
                Some(q @ ('"' | '\'')) => out.push(q),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
            },
            c if c == quote && chars.peek() == Some(&quote) => {
                chars.next();
                out.push(quote);
            }
            c => out.push(c),
        }
    }

    out
}
