//! ltc Tokens
//!
//! The token model shared by the ltc lexer and parser, plus the decoder for
//! the JSON token documents the lexer hands over.
//!
//! # Example
//!
//! ```
//! use ltc_token::TokenKind;
//!
//! let tokens = ltc_token::decode(r#"[{"kind": "EOF", "span": {"start": 0, "end": 0}}]"#).unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::EndOfInput);
//! ```

pub mod codec;
pub mod token;

pub use codec::decode;
pub use token::{TextSpan, Token, TokenKind};

/// Token document error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Token document error at line {line}, column {column}: {message}")]
pub struct DecodeError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}
