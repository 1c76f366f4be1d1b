//! ltc Parser
//!
//! Turns the token sequence produced by the ltc lexer into an Abstract
//! Syntax Tree. Parsing is total: malformed input shows up as `Bad` nodes in
//! the tree instead of as an error, so callers always get something to
//! display.
//!
//! # Example
//!
//! ```
//! use ltc_parser::Parser;
//! use ltc_token::{TextSpan, Token, TokenKind};
//!
//! let tokens = vec![
//!     Token::new(TokenKind::Integer, TextSpan::new(0, 1, "1")),
//!     Token::new(TokenKind::Plus, TextSpan::new(1, 2, "+")),
//!     Token::new(TokenKind::Integer, TextSpan::new(2, 3, "2")),
//!     Token::end_of_input(3),
//! ];
//! let ast = Parser::parse(&tokens);
//! assert_eq!(ast.to_string(), "(+ 1 2)");
//! ```

pub mod ast;
pub mod document;
pub mod parser;
pub mod stream;

pub use ast::{Ast, BinaryOp, Diagnostic, Node, SyntaxError};
pub use parser::Parser;
pub use stream::TokenStream;

/// Failure to get a token sequence into the parser at all.
///
/// Grammar errors never show up here; they become `Bad` nodes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Decode(#[from] ltc_token::DecodeError),

    #[error("Token limit exceeded: got {count} tokens, limit is {limit}")]
    TooManyTokens { count: usize, limit: usize },
}
