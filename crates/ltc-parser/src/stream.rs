//! Cursor over a borrowed token sequence.
//!
//! The stream behaves as if it were padded with an infinite run of
//! `EndOfInput` tokens, so the parser never has to bounds-check.

use ltc_token::{Token, TokenKind};

pub struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Token,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let end = tokens.last().map_or(0, |t| t.span.end);
        Self {
            tokens,
            pos: 0,
            eof: Token::end_of_input(end),
        }
    }

    /// The token `offset` places past the cursor, without consuming anything.
    pub fn peek(&self, offset: usize) -> &Token {
        self.pos
            .checked_add(offset)
            .and_then(|i| self.tokens.get(i))
            .unwrap_or(&self.eof)
    }

    pub fn peek_kind(&self, offset: usize) -> TokenKind {
        self.peek(offset).kind
    }

    /// Consume and return the current token. Past the end this keeps
    /// returning the end-of-input sentinel.
    pub fn advance(&mut self) -> &Token {
        let i = self.pos;
        if i < self.tokens.len() {
            self.pos += 1;
        }
        self.tokens.get(i).unwrap_or(&self.eof)
    }

    pub fn skip_whitespace(&mut self) {
        while self.peek_kind(0) == TokenKind::Whitespace {
            self.advance();
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.peek_kind(0) == TokenKind::EndOfInput
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Tokens not yet consumed, including any explicit end-of-input marker.
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }
}
