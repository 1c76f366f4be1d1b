use serde::{Deserialize, Serialize};
use std::fmt;

/// The slice of source text a token was produced from.
///
/// Offsets are whatever unit the upstream lexer counts in; the parser never
/// interprets them beyond copying them into diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    #[serde(alias = "Start")]
    pub start: usize,
    #[serde(alias = "End")]
    pub end: usize,
    #[serde(alias = "Literal", default)]
    pub literal: String,
}

impl TextSpan {
    pub fn new(start: usize, end: usize, literal: impl Into<String>) -> Self {
        Self {
            start,
            end,
            literal: literal.into(),
        }
    }

    /// An empty span positioned at `offset`.
    pub fn empty_at(offset: usize) -> Self {
        Self::new(offset, offset, "")
    }

    pub fn length(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Token classification.
///
/// Integer tokens carry their digits in the span literal rather than in the
/// kind, so every kind is a plain tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum TokenKind {
    // Literals
    Integer,

    // Operators
    Plus,
    Minus,
    Equals,

    // Trivia
    Whitespace,

    // End of input
    #[serde(alias = "EOF", alias = "Eof")]
    EndOfInput,

    // Flagged by the lexer
    Bad,
}

impl TokenKind {
    /// Surface text used when the kind shows up in a diagnostic.
    pub fn symbol(self) -> &'static str {
        match self {
            TokenKind::Integer => "integer",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Equals => "=",
            TokenKind::Whitespace => "whitespace",
            TokenKind::EndOfInput => "end of input",
            TokenKind::Bad => "bad token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A token handed over by the lexer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Token {
    #[serde(alias = "Kind", deserialize_with = "crate::codec::deserialize_kind")]
    pub kind: TokenKind,
    #[serde(alias = "Span")]
    pub span: TextSpan,
}

impl Token {
    pub fn new(kind: TokenKind, span: TextSpan) -> Self {
        Self { kind, span }
    }

    /// The end-of-input marker, positioned at `offset`.
    pub fn end_of_input(offset: usize) -> Self {
        Self::new(TokenKind::EndOfInput, TextSpan::empty_at(offset))
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
