//! INSERT values lists: depth-aware splitting and literal requoting.

use std::borrow::Cow;
use thiserror::Error;

/// Why a values list could not be split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("unbalanced parentheses in values list")]
    UnbalancedParens,

    #[error("unterminated string literal in values list")]
    UnterminatedString,

    #[error("unexpected text after values list")]
    TrailingText,
}

/// Classification of a single literal token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// Exactly `NULL`.
    Null,
    /// Already wrapped in single quotes.
    Quoted,
    /// `-?\d+(\.\d+)?`
    Numeric,
    /// Anything else; must be quoted before import.
    Bare,
}

/// A parenthesised values tuple split into its top-level tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple<'a> {
    /// Raw, untrimmed tokens.
    pub values: Vec<&'a str>,
    /// Byte offset just past the closing `)`.
    pub end: usize,
}

/// Classify an already-trimmed token.
pub fn classify(token: &str) -> Value {
    if token == "NULL" {
        Value::Null
    } else if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
        Value::Quoted
    } else if is_numeric(token) {
        Value::Numeric
    } else {
        Value::Bare
    }
}

/// Trim a token and quote it if it is not `NULL`, quoted or numeric.
///
/// ```
/// use d1_sync::repair::requote;
///
/// assert_eq!(requote(" O'Brien "), "'O''Brien'");
/// assert_eq!(requote("-12.5"), "-12.5");
/// ```
pub fn requote(token: &str) -> Cow<'_, str> {
    let token = token.trim();
    match classify(token) {
        Value::Null | Value::Quoted | Value::Numeric => Cow::Borrowed(token),
        Value::Bare => Cow::Owned(format!("'{}'", token.replace('\'', "''"))),
    }
}

/// Split a bare values list (without the surrounding parentheses) on
/// top-level commas.
///
/// Commas inside string literals or nested parentheses do not split. A quote
/// directly after a word character is part of a bare word (`O'Brien`, `5"`).
pub fn split_values(list: &str) -> Result<Vec<&str>, SplitError> {
    split_top_level(list, false).map(|(values, _)| values)
}

/// Split a tuple starting at `(` and return its tokens and end offset.
pub fn split_tuple(text: &str) -> Result<Tuple<'_>, SplitError> {
    let inner = text.strip_prefix('(').ok_or(SplitError::TrailingText)?;
    let (values, close) = split_top_level(inner, true)?;
    Ok(Tuple {
        values,
        end: 1 + close + 1,
    })
}

/// Walk `text` splitting on depth-zero commas outside quotes.
///
/// With `closing` set, a depth-zero `)` ends the list and its offset is
/// returned; otherwise such a `)` is an error and the list runs to the end.
fn split_top_level(text: &str, closing: bool) -> Result<(Vec<&str>, usize), SplitError> {
    let bytes = text.as_bytes();
    let mut values = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }

        match b {
            b'\'' | b'"' if i > 0 && continues_word(bytes[i - 1]) => {}
            b'\'' | b'"' | b'`' => quote = Some(b),
            b'(' => depth += 1,
            b')' if depth > 0 => depth -= 1,
            b')' if closing => {
                values.push(&text[start..i]);
                return Ok((values, i));
            }
            b')' => return Err(SplitError::UnbalancedParens),
            b',' if depth == 0 => {
                values.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return Err(SplitError::UnterminatedString);
    }
    if depth > 0 || closing {
        return Err(SplitError::UnbalancedParens);
    }

    values.push(&text[start..]);
    Ok((values, bytes.len()))
}

/// Whether a quote after `b` stays inside a bare word.
///
/// Any non-ASCII byte counts, so `Zoë's` is one word.
pub(super) fn continues_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || !b.is_ascii()
}

fn is_numeric(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    all_digits(whole) && fraction.is_none_or(all_digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("NULL"), Value::Null);
        assert_eq!(classify("null"), Value::Bare);
        assert_eq!(classify("'hello'"), Value::Quoted);
        assert_eq!(classify("'it''s'"), Value::Quoted);
        assert_eq!(classify("42"), Value::Numeric);
        assert_eq!(classify("-3.14"), Value::Numeric);
        assert_eq!(classify("1."), Value::Bare);
        assert_eq!(classify(".5"), Value::Bare);
        assert_eq!(classify("1e5"), Value::Bare);
        assert_eq!(classify("+1"), Value::Bare);
        assert_eq!(classify("-"), Value::Bare);
        assert_eq!(classify("'"), Value::Bare);
        assert_eq!(classify("true"), Value::Bare);
    }

    #[test]
    fn test_requote_passthrough() {
        assert_eq!(requote("NULL"), "NULL");
        assert_eq!(requote("'x'"), "'x'");
        assert_eq!(requote("  7  "), "7");
        assert!(matches!(requote("7"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_requote_bare() {
        assert_eq!(requote("John"), "'John'");
        assert_eq!(requote("O'Brien"), "'O''Brien'");
        assert_eq!(requote("2024-01-01"), "'2024-01-01'");
        assert_eq!(requote(""), "''");
    }

    #[test]
    fn test_split_values_depth_and_quotes() {
        let values = split_values("1,'a,b',(1,2),NULL").unwrap();
        assert_eq!(values, vec!["1", "'a,b'", "(1,2)", "NULL"]);
    }

    #[test]
    fn test_split_values_nested_calls() {
        let values = split_values("replace('a,b', ',', ';'), coalesce(NULL, (1))").unwrap();
        assert_eq!(
            values,
            vec!["replace('a,b', ',', ';')", " coalesce(NULL, (1))"]
        );
    }

    #[test]
    fn test_split_values_parens_inside_string() {
        let values = split_values("'(', ')'").unwrap();
        assert_eq!(values, vec!["'('", " ')'"]);
    }

    #[test]
    fn test_split_values_multiline() {
        let values = split_values("1,\n'line one\nline two',\n3").unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[1], "\n'line one\nline two'");
    }

    #[test]
    fn test_split_values_apostrophe_in_bare_word() {
        let values = split_values("1,O'Brien,'it''s'").unwrap();
        assert_eq!(values, vec!["1", "O'Brien", "'it''s'"]);
    }

    #[test]
    fn test_split_values_apostrophe_after_non_ascii_letter() {
        let values = split_values("1,Zoë's,'x'").unwrap();
        assert_eq!(values, vec!["1", "Zoë's", "'x'"]);
    }

    #[test]
    fn test_split_values_double_quote_in_bare_word() {
        let values = split_values("1,5\" screen,\"id\"").unwrap();
        assert_eq!(values, vec!["1", "5\" screen", "\"id\""]);
    }

    #[test]
    fn test_split_values_unbalanced() {
        assert_eq!(split_values("1,(2"), Err(SplitError::UnbalancedParens));
        assert_eq!(split_values("1,2)"), Err(SplitError::UnbalancedParens));
        assert_eq!(split_values("1,'oops"), Err(SplitError::UnterminatedString));
    }

    #[test]
    fn test_split_tuple_reports_end() {
        let tuple = split_tuple("(1,(2,3),'x')  ;").unwrap();
        assert_eq!(tuple.values, vec!["1", "(2,3)", "'x'"]);
        assert_eq!(tuple.end, 13);
    }

    #[test]
    fn test_split_tuple_never_closed() {
        assert_eq!(split_tuple("(1,2"), Err(SplitError::UnbalancedParens));
        assert_eq!(split_tuple("(1,(2);"), Err(SplitError::UnbalancedParens));
    }
}
