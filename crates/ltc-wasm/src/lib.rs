//! WASM bindings for the ltc parser.
//!
//! Exposes `parse()` and `check()` to JavaScript via wasm-bindgen. Both take
//! the lexer's JSON token document and throw only when it cannot be decoded;
//! syntax errors come back as `Bad` nodes or diagnostics.

use ltc_parser::{Ast, Diagnostic, Parser};
use wasm_bindgen::prelude::*;

/// Parse a token document into an AST document object
/// (`{ nodeType, value?, span?, children }`).
///
/// The document is handed over as JSON text and rebuilt by the host's
/// `JSON.parse`, so tree depth never turns into Rust recursion.
#[wasm_bindgen]
pub fn parse(tokens_json: &str) -> Result<JsValue, JsError> {
    let json = document_json(tokens_json).map_err(|e| JsError::new(&e))?;
    js_sys::JSON::parse(&json).map_err(|_| JsError::new("failed to load AST document"))
}

/// Parse a token document and return its diagnostics as an array of
/// `{ span, message }` objects. An empty array means the program is well
/// formed.
#[wasm_bindgen]
pub fn check(tokens_json: &str) -> Result<JsValue, JsError> {
    let found = diagnostics(tokens_json).map_err(|e| JsError::new(&e))?;
    serde_wasm_bindgen::to_value(&found).map_err(|e| JsError::new(&e.to_string()))
}

/// Get the parser version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn decode_and_parse(tokens_json: &str) -> Result<Ast, String> {
    Parser::parse_json(tokens_json).map_err(|e| e.to_string())
}

fn document_json(tokens_json: &str) -> Result<String, String> {
    let ast = decode_and_parse(tokens_json)?;
    ast.to_json(false).map_err(|e| e.to_string())
}

fn diagnostics(tokens_json: &str) -> Result<Vec<Diagnostic>, String> {
    Ok(decode_and_parse(tokens_json)?.diagnostics())
}
