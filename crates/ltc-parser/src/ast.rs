//! Abstract Syntax Tree for ltc programs.
//!
//! The tree is built bottom-up by the parser and never mutated afterwards.
//! Every variant carries only the fields that make sense for it; the uniform
//! `nodeType`/`value`/`children` JSON view used at the process boundary is
//! written by `document`.

use ltc_token::{TextSpan, TokenKind};
use serde::Serialize;
use std::fmt;

/// A complete parsed program.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    pub children: Vec<Node>,
}

/// A node in the program tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Integer literal: `42`. `value` is the lexer's digit text, verbatim.
    IntegerLiteral { value: String, span: TextSpan },

    /// Binary operation: `a + b`, `a - b`
    BinaryExpression {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// Assignment-shaped construct: `a = b`
    Assignment { target: Box<Node>, value: Box<Node> },

    /// A place where the grammar could not be satisfied. `children` holds
    /// whatever structure was salvaged before the failure.
    Bad {
        error: SyntaxError,
        span: TextSpan,
        children: Vec<Node>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
        }
    }
}

/// Why a `Bad` node was produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("bad token")]
    BadToken,

    #[error("unexpected `{found}`, expected an integer")]
    UnexpectedToken { found: TokenKind },

    #[error("unexpected end of input, expected an integer")]
    UnexpectedEndOfInput,

    #[error("unexpected `=`, only one `=` is allowed per statement")]
    ExtraEquals,
}

/// A located syntax error, as collected from the `Bad` nodes of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub span: TextSpan,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error at {}..{}: {}",
            self.span.start, self.span.end, self.message
        )
    }
}

impl Node {
    pub fn integer(value: impl Into<String>, span: TextSpan) -> Self {
        Node::IntegerLiteral {
            value: value.into(),
            span,
        }
    }

    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Self {
        Node::BinaryExpression {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn assignment(target: Node, value: Node) -> Self {
        Node::Assignment {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn bad(error: SyntaxError, span: TextSpan, children: Vec<Node>) -> Self {
        Node::Bad {
            error,
            span,
            children,
        }
    }

    /// The syntactic category tag, as written in AST documents.
    pub fn node_type(&self) -> &'static str {
        match self {
            Node::IntegerLiteral { .. } => "IntegerLiteral",
            Node::BinaryExpression { .. } => "BinaryExpression",
            Node::Assignment { .. } => "Assignment",
            Node::Bad { .. } => "Bad",
        }
    }

    /// The textual payload: digits, operator symbol, or error message.
    pub fn value(&self) -> Option<String> {
        match self {
            Node::IntegerLiteral { value, .. } => Some(value.clone()),
            Node::BinaryExpression { op, .. } => Some(op.symbol().to_string()),
            Node::Assignment { .. } => Some("=".to_string()),
            Node::Bad { error, .. } => Some(error.to_string()),
        }
    }

    /// Children in left-to-right syntactic order.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::IntegerLiteral { .. } => Vec::new(),
            Node::BinaryExpression { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Node::Assignment { target, value } => vec![target.as_ref(), value.as_ref()],
            Node::Bad { children, .. } => children.iter().collect(),
        }
    }

    /// Source span for nodes that map onto a single token.
    pub fn span(&self) -> Option<&TextSpan> {
        match self {
            Node::IntegerLiteral { span, .. } | Node::Bad { span, .. } => Some(span),
            Node::BinaryExpression { .. } | Node::Assignment { .. } => None,
        }
    }

    pub fn is_bad(&self) -> bool {
        matches!(self, Node::Bad { .. })
    }
}

/// Tears the tree down with an explicit stack. The derived drop glue would
/// recurse once per nesting level, and operator chains nest as deep as the
/// input is long.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);
        while let Some(mut node) = pending.pop() {
            detach_children(&mut node, &mut pending);
        }
    }
}

fn detach_children(node: &mut Node, out: &mut Vec<Node>) {
    // Stand-in for moved-out boxed children; owns no heap memory
    fn hollow() -> Node {
        Node::IntegerLiteral {
            value: String::new(),
            span: TextSpan::default(),
        }
    }

    match node {
        Node::IntegerLiteral { .. } => {}
        Node::BinaryExpression { left, right, .. } => {
            out.push(std::mem::replace(&mut **left, hollow()));
            out.push(std::mem::replace(&mut **right, hollow()));
        }
        Node::Assignment { target, value } => {
            out.push(std::mem::replace(&mut **target, hollow()));
            out.push(std::mem::replace(&mut **value, hollow()));
        }
        Node::Bad { children, .. } => out.append(children),
    }
}

impl Ast {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics().is_empty()
    }

    /// Every `Bad` node in the tree, in pre-order.
    ///
    /// Walks with an explicit stack: left-nested operator chains can be as
    /// deep as the input is long.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut found = Vec::new();
        let mut pending: Vec<&Node> = self.children.iter().rev().collect();

        while let Some(node) = pending.pop() {
            if let Node::Bad { error, span, .. } = node {
                found.push(Diagnostic {
                    span: span.clone(),
                    message: error.to_string(),
                });
            }
            pending.extend(node.children().into_iter().rev());
        }

        found
    }
}

/// Pieces still to be written by `Display for Node`.
enum Piece<'a> {
    Node(&'a Node),
    Text(&'static str),
}

/// Compact s-expression form: `(- (+ 1 2) 3)`. Written from a work-list for
/// the same reason `Drop` is.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![Piece::Node(self)];

        while let Some(piece) = pending.pop() {
            let node = match piece {
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Node(node) => node,
            };

            match node {
                Node::IntegerLiteral { value, .. } => f.write_str(value)?,
                Node::BinaryExpression { op, left, right } => {
                    write!(f, "({} ", op.symbol())?;
                    pending.extend([
                        Piece::Text(")"),
                        Piece::Node(right),
                        Piece::Text(" "),
                        Piece::Node(left),
                    ]);
                }
                Node::Assignment { target, value } => {
                    f.write_str("(= ")?;
                    pending.extend([
                        Piece::Text(")"),
                        Piece::Node(value),
                        Piece::Text(" "),
                        Piece::Node(target),
                    ]);
                }
                Node::Bad {
                    error, children, ..
                } => {
                    write!(f, "(bad {:?}", error.to_string())?;
                    pending.push(Piece::Text(")"));
                    for child in children.iter().rev() {
                        pending.extend([Piece::Node(child), Piece::Text(" ")]);
                    }
                }
            }
        }

        Ok(())
    }
}

/// One top-level construct per line.
impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.children.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}
