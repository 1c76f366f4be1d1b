//! Token-document decoding.
//!
//! The lexer hands tokens over as a JSON array of `{kind, span}` objects.
//! Three spellings of `kind` are accepted:
//!
//! ```text
//! {"kind": "Integer",       "span": {"start": 0, "end": 1, "literal": "7"}}
//! {"kind": {"Integer": 7},  "span": {"start": 0, "end": 1, "literal": "7"}}
//! {"Kind": 0,               "Span": {"Start": 0, "End": 1, "Literal": "7"}}
//! ```
//!
//! The second form is what a lexer with a value-carrying `Integer` kind
//! serializes to. The value is dropped; the span literal stays authoritative.
//! The third is a lexer writing kinds by ordinal, in declaration order.

use crate::token::{Token, TokenKind};
use crate::DecodeError;
use serde::de::{self, IgnoredAny, IntoDeserializer, MapAccess, Unexpected, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Kinds in ordinal order.
const ORDINALS: [TokenKind; 7] = [
    TokenKind::Integer,
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Equals,
    TokenKind::Whitespace,
    TokenKind::EndOfInput,
    TokenKind::Bad,
];

struct KindVisitor;

impl<'de> Visitor<'de> for KindVisitor {
    type Value = TokenKind;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a token kind name, a token kind ordinal (0-6), or {\"Integer\": value}")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TokenKind, E> {
        TokenKind::deserialize(v.into_deserializer())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TokenKind, E> {
        usize::try_from(v)
            .ok()
            .and_then(|i| ORDINALS.get(i).copied())
            .ok_or_else(|| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TokenKind, A::Error> {
        match map.next_key::<String>()? {
            Some(key) if key == "Integer" => {
                map.next_value::<IgnoredAny>()?;
            }
            Some(key) => return Err(de::Error::unknown_variant(&key, &["Integer"])),
            None => return Err(de::Error::invalid_length(0, &self)),
        }

        if map.next_key::<IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(2, &self));
        }
        Ok(TokenKind::Integer)
    }
}

pub(crate) fn deserialize_kind<'de, D>(deserializer: D) -> Result<TokenKind, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(KindVisitor)
}

/// Decode a token document into a token sequence.
pub fn decode(document: &str) -> Result<Vec<Token>, DecodeError> {
    serde_json::from_str(document).map_err(DecodeError::from)
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        // serde_json appends the position to its message; keep it in the fields only
        let full = err.to_string();
        let suffix = format!(" at line {} column {}", err.line(), err.column());
        let message = full.strip_suffix(&suffix).unwrap_or(&full).to_string();

        DecodeError {
            message,
            line: err.line(),
            column: err.column(),
        }
    }
}
