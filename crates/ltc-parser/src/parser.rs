//! Program parser for ltc.
//!
//! Parses a token sequence (from the external lexer) into an `Ast`.
//! Recursive descent over a small grammar:
//!
//! ```text
//! Program    := TopLevel* EndOfInput
//! TopLevel   := Expression ( '=' Expression )?
//! Expression := Term ( ('+' | '-') Term )*
//! Term       := Integer
//! ```
//!
//! Parsing never fails. Wherever a term is required and something else shows
//! up, a `Node::Bad` takes its place and the parser skips ahead to the next
//! integer (or the end of input) before carrying on.

use crate::ast::{Ast, BinaryOp, Node, SyntaxError};
use crate::stream::TokenStream;
use crate::ParseError;
use ltc_token::{Token, TokenKind};

/// ltc program parser.
///
/// Holds nothing but a cursor into the borrowed tokens, so independent
/// parses can run side by side.
pub struct Parser<'a> {
    stream: TokenStream<'a>,
    errors: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            errors: 0,
        }
    }

    /// Parse a token sequence into a program tree.
    pub fn parse(tokens: &[Token]) -> Ast {
        Parser::new(tokens).parse_program()
    }

    /// Decode a JSON token document and parse it.
    pub fn parse_json(document: &str) -> Result<Ast, ParseError> {
        let tokens = ltc_token::decode(document)?;
        Ok(Parser::parse(&tokens))
    }

    /// Like `parse_json`, but refuses token sequences longer than `max_tokens`
    /// before any parsing happens.
    pub fn parse_json_limited(document: &str, max_tokens: usize) -> Result<Ast, ParseError> {
        let tokens = ltc_token::decode(document)?;
        if tokens.len() > max_tokens {
            return Err(ParseError::TooManyTokens {
                count: tokens.len(),
                limit: max_tokens,
            });
        }
        Ok(Parser::parse(&tokens))
    }

    /// Parse top-level constructs up to and including the first end-of-input
    /// token. Consumes the parser: a cursor left at the end has nothing more
    /// to give.
    fn parse_program(mut self) -> Ast {
        let mut children = Vec::new();

        loop {
            self.stream.skip_whitespace();
            if self.stream.is_at_end() {
                self.stream.advance(); // consume end of input
                break;
            }

            let node = self.parse_top_level();
            tracing::trace!(
                node_type = node.node_type(),
                position = self.stream.position(),
                "parsed top-level construct"
            );
            children.push(node);
        }

        let trailing = self.stream.remaining();
        if trailing > 0 {
            tracing::debug!(trailing, "ignoring tokens after end of input");
        }
        tracing::debug!(
            nodes = children.len(),
            errors = self.errors,
            "parsed program"
        );

        Ast::new(children)
    }

    // =========================================================================
    // Grammar rules
    // =========================================================================

    /// `Expression ( '=' Expression )?`
    fn parse_top_level(&mut self) -> Node {
        let target = self.parse_expression();
        if !self.at(TokenKind::Equals) {
            return target;
        }
        self.stream.advance(); // consume =

        let value = self.parse_expression();
        let assignment = Node::assignment(target, value);

        if self.at(TokenKind::Equals) {
            // `a = b = c`: keep `a = b` under the error, drop the rest
            return self.recover(SyntaxError::ExtraEquals, vec![assignment]);
        }

        assignment
    }

    /// `Term ( ('+' | '-') Term )*`, folded onto the left operand so that
    /// `1 + 2 - 3` becomes `(1 + 2) - 3` without growing the call stack.
    fn parse_expression(&mut self) -> Node {
        let mut left = self.parse_term();

        loop {
            self.stream.skip_whitespace();
            let op = match self.stream.peek_kind(0) {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return left,
            };
            self.stream.advance(); // consume operator

            let right = self.parse_term();
            left = Node::binary(op, left, right);
        }
    }

    fn parse_term(&mut self) -> Node {
        self.stream.skip_whitespace();

        let error = match self.stream.peek_kind(0) {
            TokenKind::Integer => {
                let token = self.stream.advance();
                return Node::integer(token.span.literal.clone(), token.span.clone());
            }
            TokenKind::EndOfInput => SyntaxError::UnexpectedEndOfInput,
            TokenKind::Bad => SyntaxError::BadToken,
            found => SyntaxError::UnexpectedToken { found },
        };

        self.recover(error, Vec::new())
    }

    // =========================================================================
    // Error recovery
    // =========================================================================

    /// Replace the current token with a `Bad` node and resynchronize.
    ///
    /// The offending token is consumed unless it is the end of input, so every
    /// call either makes progress or leaves the parser at the end.
    fn recover(&mut self, error: SyntaxError, salvaged: Vec<Node>) -> Node {
        let span = self.stream.peek(0).span.clone();
        if !self.stream.is_at_end() {
            self.stream.advance();
        }
        self.synchronize();

        tracing::debug!(
            %error,
            start = span.start,
            end = span.end,
            resume_at = self.stream.position(),
            "recovered from syntax error"
        );
        self.errors += 1;

        Node::bad(error, span, salvaged)
    }

    /// Skip to the next token that can start a top-level construct.
    fn synchronize(&mut self) {
        while !matches!(
            self.stream.peek_kind(0),
            TokenKind::Integer | TokenKind::EndOfInput
        ) {
            self.stream.advance();
        }
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    /// Check the next significant token without consuming it.
    fn at(&mut self, kind: TokenKind) -> bool {
        self.stream.skip_whitespace();
        self.stream.peek_kind(0) == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use ltc_token::TextSpan;
    use pretty_assertions::assert_eq;

    /// Single-character tokens plus digit runs; anything unknown is `Bad`.
    /// Always terminated by an explicit end-of-input token.
    fn lex(source: &str) -> Vec<Token> {
        let bytes = source.as_bytes();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            let start = i;
            let kind = match bytes[i] {
                b'0'..=b'9' => {
                    while i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit() {
                        i += 1;
                    }
                    TokenKind::Integer
                }
                b'+' => TokenKind::Plus,
                b'-' => TokenKind::Minus,
                b'=' => TokenKind::Equals,
                b' ' => TokenKind::Whitespace,
                _ => TokenKind::Bad,
            };
            i += 1;
            tokens.push(Token::new(kind, TextSpan::new(start, i, &source[start..i])));
        }

        tokens.push(Token::end_of_input(source.len()));
        tokens
    }

    fn parse(source: &str) -> Ast {
        Parser::parse(&lex(source))
    }

    fn render(source: &str) -> String {
        parse(source).to_string()
    }

    fn token(kind: TokenKind, start: usize, literal: &str) -> Token {
        Token::new(kind, TextSpan::new(start, start + literal.len(), literal))
    }

    fn int(value: &str, start: usize) -> Node {
        Node::integer(value, TextSpan::new(start, start + value.len(), value))
    }

    // =========================================================================
    // Empty / simple
    // =========================================================================

    #[test]
    fn test_empty_program() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_no_tokens_at_all() {
        assert!(Parser::parse(&[]).is_empty());
    }

    #[test]
    fn test_whitespace_only() {
        assert!(parse("   ").is_empty());
    }

    #[test]
    fn test_single_literal() {
        let ast = parse("42");
        assert_eq!(ast.children, vec![int("42", 0)]);
    }

    #[test]
    fn test_literal_value_is_verbatim() {
        let tokens = vec![token(TokenKind::Integer, 0, "007"), Token::end_of_input(3)];
        let ast = Parser::parse(&tokens);
        assert_eq!(ast.children[0].value().as_deref(), Some("007"));
    }

    #[test]
    fn test_literal_is_not_revalidated() {
        let tokens = vec![token(TokenKind::Integer, 0, "x1")];
        let ast = Parser::parse(&tokens);
        assert_eq!(ast.children, vec![int("x1", 0)]);
    }

    #[test]
    fn test_adjacent_literals_are_separate_statements() {
        assert_eq!(render("1 2"), "1\n2");
    }

    // =========================================================================
    // Operators
    // =========================================================================

    #[test]
    fn test_addition() {
        let ast = parse("1+2");
        assert_eq!(
            ast.children,
            vec![Node::binary(BinaryOp::Add, int("1", 0), int("2", 2))]
        );
    }

    #[test]
    fn test_left_associativity() {
        let ast = parse("1+2-3");
        assert_eq!(
            ast.children,
            vec![Node::binary(
                BinaryOp::Sub,
                Node::binary(BinaryOp::Add, int("1", 0), int("2", 2)),
                int("3", 4),
            )]
        );
    }

    #[test]
    fn test_long_chain_nests_left() {
        assert_eq!(render("1-2-3-4"), "(- (- (- 1 2) 3) 4)");
    }

    #[test]
    fn test_whitespace_transparency() {
        let spaced = vec![
            token(TokenKind::Integer, 0, "1"),
            token(TokenKind::Whitespace, 1, " "),
            token(TokenKind::Plus, 2, "+"),
            token(TokenKind::Whitespace, 3, " "),
            token(TokenKind::Integer, 4, "2"),
            Token::end_of_input(5),
        ];
        let tight = lex("1+2");

        assert_eq!(
            Parser::parse(&spaced).to_string(),
            Parser::parse(&tight).to_string()
        );
        assert_eq!(Parser::parse(&spaced).to_string(), "(+ 1 2)");
    }

    #[test]
    fn test_whitespace_runs() {
        assert_eq!(render("  1   -    2  "), "(- 1 2)");
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    #[test]
    fn test_assignment_shape() {
        let ast = parse("1=2");
        assert_eq!(ast.children.len(), 1);
        assert_eq!(ast.children[0], Node::assignment(int("1", 0), int("2", 2)));
        assert_eq!(ast.children[0].children().len(), 2);
    }

    #[test]
    fn test_assignment_of_expressions() {
        assert_eq!(render("1 + 2 = 3 - 4"), "(= (+ 1 2) (- 3 4))");
    }

    #[test]
    fn test_statements_after_assignment() {
        assert_eq!(render("1 = 2 3"), "(= 1 2)\n3");
    }

    #[test]
    fn test_extra_equals() {
        let ast = parse("1=2=3");
        assert_eq!(
            ast.children,
            vec![
                Node::bad(
                    SyntaxError::ExtraEquals,
                    TextSpan::new(3, 4, "="),
                    vec![Node::assignment(int("1", 0), int("2", 2))],
                ),
                int("3", 4),
            ]
        );
    }

    #[test]
    fn test_many_equals() {
        let ast = parse("1 = 2 = = = 3");
        assert_eq!(ast.children.len(), 2);
        assert!(ast.children[0].is_bad());
        assert_eq!(ast.children[1].to_string(), "3");
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    #[test]
    fn test_recovery_makes_progress() {
        let ast = parse("+1");
        assert_eq!(
            ast.children,
            vec![
                Node::bad(
                    SyntaxError::UnexpectedToken {
                        found: TokenKind::Plus
                    },
                    TextSpan::new(0, 1, "+"),
                    vec![],
                ),
                int("1", 1),
            ]
        );
    }

    #[test]
    fn test_stray_equals() {
        let ast = parse("= 5");
        assert_eq!(ast.children.len(), 2);
        assert!(matches!(
            &ast.children[0],
            Node::Bad {
                error: SyntaxError::UnexpectedToken {
                    found: TokenKind::Equals
                },
                ..
            }
        ));
        assert_eq!(ast.children[1].to_string(), "5");
    }

    #[test]
    fn test_missing_right_operand() {
        let ast = parse("1+");
        assert_eq!(
            ast.children,
            vec![Node::binary(
                BinaryOp::Add,
                int("1", 0),
                Node::bad(
                    SyntaxError::UnexpectedEndOfInput,
                    TextSpan::empty_at(2),
                    vec![]
                ),
            )]
        );
    }

    #[test]
    fn test_missing_right_operand_without_end_marker() {
        let tokens = vec![token(TokenKind::Integer, 0, "1"), token(TokenKind::Minus, 2, "-")];
        let ast = Parser::parse(&tokens);

        let diagnostics = ast.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].span, TextSpan::empty_at(3));
    }

    #[test]
    fn test_missing_assignment_value() {
        assert_eq!(
            render("7 ="),
            "(= 7 (bad \"unexpected end of input, expected an integer\"))"
        );
    }

    #[test]
    fn test_doubled_operator() {
        let ast = parse("1 + + 2");
        assert_eq!(
            ast.to_string(),
            "(+ 1 (bad \"unexpected `+`, expected an integer\"))\n2"
        );
        assert_eq!(ast.diagnostics()[0].span, TextSpan::new(4, 5, "+"));
    }

    #[test]
    fn test_lexer_bad_token_passes_through() {
        let ast = parse("1?2");
        assert_eq!(
            ast.children,
            vec![
                int("1", 0),
                Node::bad(SyntaxError::BadToken, TextSpan::new(1, 2, "?"), vec![]),
                int("2", 2),
            ]
        );
    }

    #[test]
    fn test_bad_token_as_operand() {
        assert_eq!(render("1 - ?"), "(- 1 (bad \"bad token\"))");
    }

    #[test]
    fn test_bad_right_of_equals() {
        assert_eq!(
            render("1 = = 2"),
            "(= 1 (bad \"unexpected `=`, expected an integer\"))\n2"
        );
    }

    #[test]
    fn test_garbage_collapses_into_one_bad_node() {
        let ast = parse("+-=?");
        assert_eq!(ast.children.len(), 1);
        assert_eq!(ast.children[0].span(), Some(&TextSpan::new(0, 1, "+")));
    }

    #[test]
    fn test_only_bad_tokens() {
        let tokens = vec![
            token(TokenKind::Bad, 0, "a"),
            token(TokenKind::Bad, 1, "b"),
            token(TokenKind::Bad, 2, "c"),
        ];
        let ast = Parser::parse(&tokens);
        assert_eq!(ast.children.len(), 1);
        assert_eq!(ast.diagnostics()[0].message, "bad token");
    }

    // =========================================================================
    // End of input
    // =========================================================================

    #[test]
    fn test_tokens_after_end_are_ignored() {
        let tokens = vec![
            token(TokenKind::Integer, 0, "1"),
            Token::end_of_input(1),
            token(TokenKind::Integer, 2, "2"),
        ];
        assert_eq!(Parser::parse(&tokens).children, vec![int("1", 0)]);
    }

    #[test]
    fn test_recovery_stops_at_end_marker() {
        let tokens = vec![
            token(TokenKind::Plus, 0, "+"),
            Token::end_of_input(1),
            token(TokenKind::Integer, 2, "2"),
        ];
        let ast = Parser::parse(&tokens);
        assert_eq!(ast.children.len(), 1);
        assert!(ast.children[0].is_bad());
    }

    #[test]
    fn test_missing_operand_at_explicit_end() {
        let tokens = vec![
            token(TokenKind::Integer, 0, "1"),
            token(TokenKind::Plus, 1, "+"),
            Token::end_of_input(2),
            token(TokenKind::Integer, 3, "9"),
        ];
        let ast = Parser::parse(&tokens);
        assert_eq!(ast.children.len(), 1);
        assert_eq!(ast.diagnostics()[0].span, TextSpan::empty_at(2));
    }

    #[test]
    fn test_parse_without_end_marker() {
        let tokens = vec![token(TokenKind::Integer, 0, "5")];
        assert_eq!(Parser::parse(&tokens).children, vec![int("5", 0)]);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[test]
    fn test_parser_runs_once() {
        let tokens = lex("1 + 2 3");
        let parser = Parser::new(&tokens);
        assert_eq!(parser.parse_program(), Parser::parse(&tokens));
    }

    #[test]
    fn test_deterministic() {
        let tokens = lex("1 + ? = 2 - 3 = 4 + 5");
        assert_eq!(Parser::parse(&tokens), Parser::parse(&tokens));
    }

    #[test]
    fn test_every_small_input_terminates() {
        // All sequences of up to four tokens over the whole alphabet
        let alphabet = ["1", "+", "-", "=", " ", "?"];
        let mut sources = vec![String::new()];
        for _ in 0..4 {
            let mut next = Vec::new();
            for prefix in &sources {
                for piece in alphabet {
                    next.push(format!("{prefix}{piece}"));
                }
            }
            sources.extend(next);
        }

        for source in &sources {
            let ast = parse(source);
            let has_junk = source.contains(['+', '-', '=', '?']);
            if !has_junk {
                assert!(!ast.has_errors(), "unexpected error for {source:?}");
            }
        }
    }

    #[test]
    fn test_very_long_chain() {
        let mut tokens = Vec::new();
        for i in 0..100_000 {
            if i > 0 {
                tokens.push(token(TokenKind::Plus, 2 * i - 1, "+"));
            }
            tokens.push(token(TokenKind::Integer, 2 * i, "1"));
        }

        let ast = Parser::parse(&tokens);
        assert_eq!(ast.children.len(), 1);
        assert!(!ast.has_errors());

        let mut depth = 0;
        let mut node = &ast.children[0];
        while let Node::BinaryExpression { left, .. } = node {
            depth += 1;
            node = left.as_ref();
        }
        assert_eq!(depth, 99_999);
    }

    // =========================================================================
    // JSON entry points
    // =========================================================================

    #[test]
    fn test_parse_json() {
        let ast = Parser::parse_json(
            r#"[
                {"kind": "Integer", "span": {"start": 0, "end": 1, "literal": "1"}},
                {"kind": "Equals", "span": {"start": 1, "end": 2, "literal": "="}},
                {"kind": "Integer", "span": {"start": 2, "end": 3, "literal": "2"}},
                {"kind": "EndOfInput", "span": {"start": 3, "end": 3, "literal": ""}}
            ]"#,
        )
        .unwrap();
        assert_eq!(ast.to_string(), "(= 1 2)");
    }

    #[test]
    fn test_parse_json_decode_error() {
        let err = Parser::parse_json("[{").unwrap_err();
        assert!(matches!(err, ParseError::Decode(_)));
    }

    #[test]
    fn test_parse_json_limited() {
        let document = r#"[
            {"kind": "Integer", "span": {"start": 0, "end": 1, "literal": "1"}},
            {"kind": "EOF", "span": {"start": 1, "end": 1, "literal": ""}}
        ]"#;

        assert!(Parser::parse_json_limited(document, 2).is_ok());
        assert_eq!(
            Parser::parse_json_limited(document, 1).unwrap_err(),
            ParseError::TooManyTokens { count: 2, limit: 1 }
        );
    }
}
