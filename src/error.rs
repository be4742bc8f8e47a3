//! Error types for link de-obfuscation
//!
//! The translator itself never fails on malformed input (the HTML5 recovery
//! algorithm produces a best-effort tree and every pass tolerates missing
//! attributes), so the only fallible operation in the crate is decoding an
//! obfuscated link payload.

use std::fmt;

/// Errors that can occur while decoding an obfuscated link payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload length is odd; the encoding emits two symbols per character
    OddLength(usize),
    /// Payload contains a symbol outside the 16-character alphabet
    UnknownSymbol(char),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::OddLength(len) => {
                write!(f, "obfuscated payload has odd length {}", len)
            }
            DecodeError::UnknownSymbol(ch) => {
                write!(f, "obfuscated payload contains unknown symbol {:?}", ch)
            }
        }
    }
}

impl std::error::Error for DecodeError {}
