//! AST documents: the JSON view of a tree used at the process boundary.
//!
//! ```text
//! {"nodeType": "Program", "children": [
//!   {"nodeType": "BinaryExpression", "value": "+", "children": [...]}
//! ]}
//! ```
//!
//! `value` and `span` are omitted when a node has none. The writer walks the
//! tree with an explicit stack and streams straight into the output, since
//! operator chains nest as deep as the input is long.

use crate::ast::{Ast, Node};
use std::io::{self, Write};

/// Indentation stops growing past this depth so pretty output of long
/// chains stays linear in size.
const MAX_INDENT: usize = 32;

/// One open `children` array.
struct Frame<'a> {
    pending: std::vec::IntoIter<&'a Node>,
    written: usize,
}

impl Ast {
    /// Write the program as an AST document.
    pub fn write_json<W: Write>(&self, mut writer: W, pretty: bool) -> io::Result<()> {
        let w = &mut writer;
        let sep = if pretty { ": " } else { ":" };

        write!(w, "{{\"nodeType\"{sep}\"Program\"")?;
        open_children(w, pretty)?;

        let mut stack = vec![Frame {
            pending: self.children.iter().collect::<Vec<_>>().into_iter(),
            written: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            match frame.pending.next() {
                Some(node) => {
                    if frame.written > 0 {
                        w.write_all(b",")?;
                    }
                    frame.written += 1;

                    let depth = stack.len();
                    newline(w, pretty, depth)?;
                    write_fields(w, node, pretty)?;
                    open_children(w, pretty)?;

                    stack.push(Frame {
                        pending: node.children().into_iter(),
                        written: 0,
                    });
                }
                None => {
                    let written = frame.written;
                    stack.pop();
                    if written > 0 {
                        newline(w, pretty, stack.len())?;
                    }
                    w.write_all(b"]}")?;
                }
            }
        }

        Ok(())
    }

    /// The AST document as a string.
    pub fn to_json(&self, pretty: bool) -> io::Result<String> {
        let mut buf = Vec::new();
        self.write_json(&mut buf, pretty)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// `{"nodeType":..,"value":..,"span":..` with the object left open.
fn write_fields<W: Write>(w: &mut W, node: &Node, pretty: bool) -> io::Result<()> {
    let (sep, comma) = if pretty { (": ", ", ") } else { (":", ",") };

    write!(w, "{{\"nodeType\"{sep}\"{}\"", node.node_type())?;
    if let Some(value) = node.value() {
        write!(w, "{comma}\"value\"{sep}")?;
        serde_json::to_writer(&mut *w, &value)?;
    }
    if let Some(span) = node.span() {
        write!(w, "{comma}\"span\"{sep}")?;
        serde_json::to_writer(&mut *w, span)?;
    }
    Ok(())
}

fn open_children<W: Write>(w: &mut W, pretty: bool) -> io::Result<()> {
    if pretty {
        w.write_all(b", \"children\": [")
    } else {
        w.write_all(b",\"children\":[")
    }
}

fn newline<W: Write>(w: &mut W, pretty: bool, depth: usize) -> io::Result<()> {
    if pretty {
        w.write_all(b"\n")?;
        for _ in 0..depth.min(MAX_INDENT) {
            w.write_all(b"  ")?;
        }
    }
    Ok(())
}
