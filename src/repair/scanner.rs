//! Statement-boundary scanner for SQL dumps.
//!
//! Splits a dump into statements without parsing them. The scanner tracks
//! quoted strings, quoted identifiers and comments so that a `;` inside any of
//! them never ends a statement. Concatenating `prefix + body` of every
//! statement reproduces the input byte-for-byte.
//!
//! A single or double quote directly after a word character (`O'Brien`,
//! `Zoë's`, `5"`) belongs to a bare word and opens nothing.

use super::values::continues_word;

/// Lexical state of the scanner while walking the dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    SingleQuote,
    DoubleQuote,
    Backtick,
    Bracket,
    LineComment,
    BlockComment,
}

/// One statement of a dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement<'a> {
    /// Whitespace and comments preceding the statement text.
    pub prefix: &'a str,
    /// Statement text, including the terminating `;` when present.
    pub body: &'a str,
    /// Whether the statement ended with a `;` (false only for trailing text).
    pub terminated: bool,
}

/// Kind of statement, as far as the repair transform cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind<'a> {
    /// `CREATE TABLE [IF NOT EXISTS] <word>`
    CreateTable { table: &'a str },
    /// `INSERT INTO <word> VALUES(`, with the byte offset of the `(` in the body.
    InsertValues { table: &'a str, values_at: usize },
    Other,
}

impl<'a> Statement<'a> {
    fn new(raw: &'a str, terminated: bool) -> Self {
        let split = prefix_len(raw);
        Self {
            prefix: &raw[..split],
            body: &raw[split..],
            terminated,
        }
    }

    /// Classify the statement by its leading keywords.
    pub fn kind(&self) -> StatementKind<'a> {
        let mut cursor = Cursor::new(self.body);

        if cursor.keyword("CREATE") && cursor.keyword("TABLE") {
            let before_clause = cursor.pos;
            if !(cursor.keyword("IF") && cursor.keyword("NOT") && cursor.keyword("EXISTS")) {
                cursor.pos = before_clause;
            }
            return match cursor.identifier() {
                Some(table) => StatementKind::CreateTable { table },
                None => StatementKind::Other,
            };
        }

        let mut cursor = Cursor::new(self.body);
        if cursor.keyword("INSERT") && cursor.keyword("INTO") {
            let Some(table) = cursor.identifier() else {
                return StatementKind::Other;
            };
            if cursor.keyword("VALUES") {
                cursor.skip_whitespace();
                if cursor.peek() == Some(b'(') {
                    return StatementKind::InsertValues {
                        table,
                        values_at: cursor.pos,
                    };
                }
            }
        }

        StatementKind::Other
    }
}

/// Split a dump into statements.
///
/// Every byte of `input` ends up in exactly one statement's prefix or body.
/// Text after the last `;` becomes a final, unterminated statement.
pub fn scan_statements(input: &str) -> Vec<Statement<'_>> {
    let bytes = input.as_bytes();
    let mut statements = Vec::new();
    let mut state = State::Normal;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        let after_word = i > 0 && continues_word(bytes[i - 1]);

        state = match state {
            State::Normal => match b {
                b'\'' if !after_word => State::SingleQuote,
                b'"' if !after_word => State::DoubleQuote,
                b'`' => State::Backtick,
                b'[' => State::Bracket,
                b'-' if next == Some(b'-') => {
                    i += 1;
                    State::LineComment
                }
                b'/' if next == Some(b'*') => {
                    i += 1;
                    State::BlockComment
                }
                b';' => {
                    statements.push(Statement::new(&input[start..=i], true));
                    start = i + 1;
                    State::Normal
                }
                _ => State::Normal,
            },
            // A doubled quote closes and immediately reopens, which keeps the
            // state correct without special casing the escape.
            State::SingleQuote if b == b'\'' => State::Normal,
            State::DoubleQuote if b == b'"' => State::Normal,
            State::Backtick if b == b'`' => State::Normal,
            State::Bracket if b == b']' => State::Normal,
            State::LineComment if b == b'\n' => State::Normal,
            State::BlockComment if b == b'*' && next == Some(b'/') => {
                i += 1;
                State::Normal
            }
            other => other,
        };
        i += 1;
    }

    if start < bytes.len() {
        statements.push(Statement::new(&input[start..], false));
    }

    statements
}

/// Length of the leading whitespace and comments of a raw statement.
fn prefix_len(raw: &str) -> usize {
    let bytes = raw.as_bytes();
    let mut i = 0;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if raw[i..].starts_with("--") {
            i = raw[i..].find('\n').map_or(bytes.len(), |nl| i + nl + 1);
        } else if raw[i..].starts_with("/*") {
            i = raw[i + 2..].find("*/").map_or(bytes.len(), |end| i + 2 + end + 2);
        } else {
            return i;
        }
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Keyword matcher over a statement body.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Consume `word` if it is the next token. Keywords are case-sensitive.
    fn keyword(&mut self, word: &str) -> bool {
        let start = self.pos;
        self.skip_whitespace();
        let rest = &self.text[self.pos..];
        let boundary = rest.as_bytes().get(word.len()).is_none_or(|&b| !is_word_byte(b));
        if rest.starts_with(word) && boundary {
            self.pos += word.len();
            true
        } else {
            self.pos = start;
            false
        }
    }

    /// Consume a bare `[A-Za-z0-9_]+` table name.
    ///
    /// Quoted and schema-qualified names are not recognised.
    fn identifier(&mut self) -> Option<&'a str> {
        let start = self.pos;
        self.skip_whitespace();
        let ident_start = self.pos;
        while self.peek().is_some_and(is_word_byte) {
            self.pos += 1;
        }
        if self.pos == ident_start || self.peek() == Some(b'.') {
            self.pos = start;
            return None;
        }
        Some(&self.text[ident_start..self.pos])
    }
}
