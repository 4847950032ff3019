//! Token stream shared by every pass.
//!
//! Code tokens are recovered from the source with the literal spans the parser
//! reported; comments come straight from the parser. Both are merged into one
//! sequence ordered by byte offset, and every structural edit goes through
//! [`TokenStream`] so positions on the edited line stay consistent.

use std::ops::{Deref, DerefMut, Range};

use oxc_span::Span;

use crate::position::{LineIndex, Loc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Punctuator,
    Numeric,
    String,
    RegularExpression,
    Template,
    Boolean,
    Null,
    BlockComment,
    LineComment,
    /// An identifier that has already been rewritten to its alias.
    Resolved,
}

/// Stable identity of a token, unaffected by insertions and removals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TokenId(u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub id: TokenId,
    pub kind: TokenKind,
    /// Raw source text; comments exclude their delimiters.
    pub value: String,
    pub span: Span,
    pub loc: Loc,
}

impl Token {
    pub fn is_punctuator(&self, value: &str) -> bool {
        self.kind == TokenKind::Punctuator && self.value == value
    }

    pub fn is_keyword(&self, value: &str) -> bool {
        self.kind == TokenKind::Keyword && self.value == value
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        self.kind == TokenKind::Identifier && self.value == name
    }

    pub fn line(&self) -> u32 {
        self.loc.start.line
    }

    pub fn column(&self) -> u32 {
        self.loc.start.column
    }

    fn is_single_line(&self) -> bool {
        self.loc.start.line == self.loc.end.line
    }
}

#[derive(Clone, Debug, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Merges code tokens and comments into one sequence ordered by start offset.
    pub fn prepare(code: Vec<Token>, comments: Vec<Token>) -> Self {
        let mut tokens = code;
        tokens.extend(comments);
        tokens.sort_by_key(|token| token.span.start);
        Self { tokens }
    }

    pub fn position(&self, id: TokenId) -> Option<usize> {
        self.tokens.iter().position(|token| token.id == id)
    }

    /// Indices of the tokens that start on `line`.
    pub fn line_range(&self, line: u32) -> Range<usize> {
        let start = self.tokens.partition_point(|token| token.line() < line);
        let end = start + self.tokens[start..].iter().take_while(|token| token.line() == line).count();
        start..end
    }

    /// Indices of the tokens following `idx` on the same line.
    pub fn rest_of_line(&self, idx: usize) -> Range<usize> {
        let line = self.tokens[idx].line();
        let end = idx + 1 + self.tokens[idx + 1..].iter().take_while(|token| token.line() == line).count();
        idx + 1..end
    }

    /// Removes `count` tokens starting at `start` and pulls the rest of the
    /// line left by the removed width.
    pub fn excise(&mut self, start: usize, count: usize) {
        let last = start + count - 1;
        let byte_shift = self.tokens[last].span.end - self.tokens[start].span.start;
        let column_shift = self.tokens[last].loc.end.column - self.tokens[start].loc.start.column;
        for idx in self.rest_of_line(last) {
            let token = &mut self.tokens[idx];
            token.span = Span::new(token.span.start - byte_shift, token.span.end - byte_shift);
            token.loc.start.column -= column_shift;
            if token.is_single_line() {
                token.loc.end.column -= column_shift;
            }
        }
        self.tokens.drain(start..=last);
    }

    /// Moves the tokens in `run` so they sit right before the token at `before`.
    pub fn relocate(&mut self, run: Range<usize>, before: usize) {
        debug_assert!(before <= run.start);
        let moved: Vec<Token> = self.tokens.drain(run).collect();
        self.tokens.splice(before..before, moved);
    }

    /// Shifts every token from `idx` to the end of its line left by up to
    /// `unit` columns, never past column 0.
    pub fn dedent_line(&mut self, idx: usize, unit: u32) {
        let shift = self.tokens[idx].column().min(unit);
        if shift == 0 {
            return;
        }
        let rest = self.rest_of_line(idx);
        for idx in idx..rest.end {
            let token = &mut self.tokens[idx];
            token.loc.start.column -= shift;
            if token.is_single_line() {
                token.loc.end.column -= shift;
            }
        }
    }

    pub fn retain(&mut self, keep: impl FnMut(&Token) -> bool) {
        self.tokens.retain(keep);
    }
}

impl Deref for TokenStream {
    type Target = [Token];

    fn deref(&self) -> &[Token] {
        &self.tokens
    }
}

impl DerefMut for TokenStream {
    fn deref_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }
}

const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "finally", "for", "function", "if", "import", "in",
    "instanceof", "new", "return", "super", "switch", "this", "throw", "try", "typeof", "var",
    "void", "while", "with", "yield",
];

// Longest first, so the first prefix match is the longest one.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==", "!=",
    "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=",
    "<<", ">>", "**",
];

fn is_identifier_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_alphanumeric() || c == '\u{200c}' || c == '\u{200d}'
}

fn classify_word(word: &str) -> TokenKind {
    match word {
        "true" | "false" => TokenKind::Boolean,
        "null" => TokenKind::Null,
        _ if KEYWORDS.contains(&word) => TokenKind::Keyword,
        _ => TokenKind::Identifier,
    }
}

/// Splits `source_text` into code tokens.
///
/// `literals` are the spans of literal nodes (strings, numbers, regular
/// expressions, templates) reported by the parser; they are taken verbatim so
/// the scanner never has to decide between division and a regular expression.
/// `comments` are skipped over here and merged later by [`TokenStream::prepare`].
pub(crate) struct Scanner<'s> {
    source_text: &'s str,
    line_index: &'s LineIndex<'s>,
    next_id: u32,
}

impl<'s> Scanner<'s> {
    pub fn new(source_text: &'s str, line_index: &'s LineIndex<'s>) -> Self {
        Self { source_text, line_index, next_id: 0 }
    }

    pub fn token(&mut self, kind: TokenKind, value: String, start: u32, end: u32) -> Token {
        let id = TokenId(self.next_id);
        self.next_id += 1;
        Token { id, kind, value, span: Span::new(start, end), loc: self.line_index.loc(start, end) }
    }

    pub fn comment(&mut self, span: Span) -> Token {
        let text = &self.source_text[span.start as usize..span.end as usize];
        let (kind, value) = match text.strip_prefix("/*") {
            Some(rest) => (TokenKind::BlockComment, rest.strip_suffix("*/").unwrap_or(rest)),
            None => (TokenKind::LineComment, text.strip_prefix("//").unwrap_or(text)),
        };
        self.token(kind, value.to_string(), span.start, span.end)
    }

    pub fn scan(&mut self, literals: &[(Span, TokenKind)], comments: &[Span]) -> Vec<Token> {
        let mut literals = literals.to_vec();
        literals.sort_by_key(|(span, _)| span.start);
        let mut literals = literals.into_iter().peekable();
        let mut comments = comments.iter().copied().peekable();

        let text = self.source_text;
        let mut tokens = Vec::new();
        let mut pos = 0usize;
        while pos < text.len() {
            // Literals nested in an already consumed template are skipped.
            while literals.next_if(|(span, _)| (span.start as usize) < pos).is_some() {}
            while comments.next_if(|span| (span.start as usize) < pos).is_some() {}

            if let Some((span, kind)) = literals.next_if(|(span, _)| span.start as usize == pos) {
                let value = text[span.start as usize..span.end as usize].to_string();
                tokens.push(self.token(kind, value, span.start, span.end));
                pos = span.end as usize;
                continue;
            }
            if let Some(span) = comments.next_if(|span| span.start as usize == pos) {
                pos = span.end as usize;
                continue;
            }

            let rest = &text[pos..];
            let Some(c) = rest.chars().next() else { break };
            if c.is_whitespace() || c == '\u{feff}' {
                pos += c.len_utf8();
                continue;
            }

            let len = if is_identifier_start(c) {
                rest.char_indices().find(|&(_, c)| !is_identifier_part(c)).map_or(rest.len(), |(i, _)| i)
            } else if c.is_ascii_digit() {
                rest.char_indices()
                    .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '.' || c == '_'))
                    .map_or(rest.len(), |(i, _)| i)
            } else {
                PUNCTUATORS.iter().find(|p| rest.starts_with(*p)).map_or(c.len_utf8(), |p| p.len())
            };

            let value = &rest[..len];
            let kind = if is_identifier_start(c) {
                classify_word(value)
            } else if c.is_ascii_digit() {
                TokenKind::Numeric
            } else {
                TokenKind::Punctuator
            };
            let start = pos as u32;
            tokens.push(self.token(kind, value.to_string(), start, start + len as u32));
            pos += len;
        }
        tokens
    }
}
