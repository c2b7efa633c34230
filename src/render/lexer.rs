//! Ordered-rule tokenizer for code shown in messages.
//!
//! Rules are tried at each position in a fixed priority order:
//!
//! 1. `//` line comment
//! 2. `/* */` block comment
//! 3. `#` line comment
//! 4. `"..."`, `'...'` and `` `...` `` strings (backslash escapes, may span lines;
//!    a backslash never escapes a line break)
//! 5. number: `\d+(\.\d+)?` on word boundaries
//! 6. identifier: `[A-Za-z_]\w*` on word boundaries, tagged keyword when listed
//!
//! Anything else is plain gap text. An opening quote or `/*` with no closing
//! delimiter is plain text and scanning resumes right after it. Once an
//! opening of some kind is known to find no close before a given offset,
//! later openings of that kind before that offset are not rescanned, which
//! keeps the whole pass linear.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use super::fragment::{Token, TokenKind};

/// Language-agnostic keyword superset.
pub const KEYWORDS: &[&str] = &[
    "const", "let", "var", "function", "return", "if", "else", "for", "while", "class", "async",
    "await", "try", "catch", "finally", "throw", "import", "from", "export", "new", "switch",
    "case", "break", "continue", "def", "lambda", "yield", "with", "as", "elif", "in", "not",
    "and", "or", "public", "private", "protected", "static", "void", "int", "float", "double",
    "boolean", "string",
];

static KEYWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| KEYWORDS.iter().copied().collect());

pub fn is_keyword(word: &str) -> bool {
    KEYWORD_SET.contains(word)
}

/// A token borrowed from the scanned source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawToken<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Streaming lexer over a code body.
///
/// Yields recognised tokens and plain pieces; consecutive plain pieces are not
/// merged here (see [`tokenize`]).
pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Per quote kind: openings before this offset have no close.
    string_blocked: [usize; 3],
    unterminated_block: bool,
}

fn quote_slot(quote: u8) -> usize {
    match quote {
        b'"' => 0,
        b'\'' => 1,
        _ => 2,
    }
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            string_blocked: [0; 3],
            unterminated_block: false,
        }
    }

    fn byte_at(&self, i: usize) -> Option<u8> {
        self.bytes.get(i).copied()
    }

    fn word_at(&self, i: usize) -> bool {
        self.byte_at(i).is_some_and(is_word)
    }

    fn prev_is_word(&self) -> bool {
        self.pos > 0 && is_word(self.bytes[self.pos - 1])
    }

    fn scan_while(&self, from: usize, pred: impl Fn(u8) -> bool) -> usize {
        let mut i = from;
        while self.byte_at(i).is_some_and(&pred) {
            i += 1;
        }
        i
    }

    fn line_end(&self, from: usize) -> usize {
        self.bytes[from..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.bytes.len(), |off| from + off)
    }

    /// End offset (exclusive) of a quoted literal opening at `start`.
    ///
    /// A failed scan stops either at the end of input or at a backslash before
    /// a line break. Any later opening of the same kind before that point
    /// resumes the same scan and fails at the same place, so it is recorded.
    fn scan_string(&mut self, start: usize, quote: u8) -> Option<usize> {
        let slot = quote_slot(quote);
        if start < self.string_blocked[slot] {
            return None;
        }
        let mut i = start + 1;
        while let Some(b) = self.byte_at(i) {
            match b {
                b'\\' if matches!(self.byte_at(i + 1), Some(b'\n' | b'\r')) => break,
                b'\\' => i += 2,
                _ if b == quote => return Some(i + 1),
                _ => i += 1,
            }
        }
        self.string_blocked[slot] = i;
        None
    }

    fn scan_block_comment(&mut self, start: usize) -> Option<usize> {
        if self.unterminated_block {
            return None;
        }
        match self.src[start + 2..].find("*/") {
            Some(off) => Some(start + 2 + off + 2),
            None => {
                self.unterminated_block = true;
                None
            }
        }
    }

    /// Number at `start`, or the whole glued word run as plain text.
    fn scan_number(&self, start: usize) -> (TokenKind, usize) {
        let int_end = self.scan_while(start, |b| b.is_ascii_digit());
        if self.byte_at(int_end) == Some(b'.')
            && self.byte_at(int_end + 1).is_some_and(|b| b.is_ascii_digit())
        {
            let frac_end = self.scan_while(int_end + 1, |b| b.is_ascii_digit());
            if !self.word_at(frac_end) {
                return (TokenKind::Number, frac_end);
            }
        }
        if !self.word_at(int_end) {
            return (TokenKind::Number, int_end);
        }
        (TokenKind::Plain, self.scan_while(start, is_word))
    }

    fn next_span(&mut self) -> Option<(TokenKind, usize)> {
        let start = self.pos;
        let b = self.byte_at(start)?;
        let next = self.byte_at(start + 1);

        if b == b'/' && next == Some(b'/') {
            return Some((TokenKind::Comment, self.line_end(start)));
        }
        if b == b'/'
            && next == Some(b'*')
            && let Some(end) = self.scan_block_comment(start)
        {
            return Some((TokenKind::Comment, end));
        }
        if b == b'#' {
            return Some((TokenKind::Comment, self.line_end(start)));
        }
        if matches!(b, b'"' | b'\'' | b'`')
            && let Some(end) = self.scan_string(start, b)
        {
            return Some((TokenKind::String, end.min(self.bytes.len())));
        }
        if is_word(b) {
            if self.prev_is_word() {
                return Some((TokenKind::Plain, self.scan_while(start, is_word)));
            }
            if b.is_ascii_digit() {
                return Some(self.scan_number(start));
            }
            let end = self.scan_while(start, is_word);
            let kind = if is_keyword(&self.src[start..end]) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            return Some((kind, end));
        }

        // Single plain character (may be multi-byte).
        let width = self.src[start..].chars().next().map_or(1, char::len_utf8);
        Some((TokenKind::Plain, start + width))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = RawToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let (kind, end) = self.next_span()?;
        self.pos = end;
        Some(RawToken {
            kind,
            text: &self.src[start..end],
        })
    }
}

/// Tokenize a code body into owned tokens, merging adjacent plain runs.
pub fn tokenize(code: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    for raw in Lexer::new(code) {
        if raw.kind == TokenKind::Plain
            && let Some(last) = tokens.last_mut()
            && last.kind == TokenKind::Plain
        {
            last.text.push_str(raw.text);
            continue;
        }
        tokens.push(Token::new(raw.kind, raw.text));
    }
    tokens
}
