//! Runtime errors.
//!
//! Conditions that abort a paraflow program surface here as values so the
//! host decides what to do with them.

use std::io;

use pf_types::{SingleType, TypeError};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RtError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("Popping from an empty array")]
    PopEmpty,

    #[error("Need to supply a comparison function to sort array of complex type")]
    SortNeedsComparator,

    #[error("comparison function must leave an int in slot 0, found {0}")]
    BadComparatorResult(&'static str),

    #[error("index {index} out of range for size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("Negative size ({0}) in string.middle")]
    NegativeSize(i32),

    #[error("Unterminated {0} quote")]
    UnterminatedQuote(char),

    #[error("empty string in string.betweenQuotes")]
    EmptyQuoted,

    #[error("can't convert `{text}` to {target}")]
    BadNumber { text: String, target: &'static str },

    #[error("malformed substitution template: {0}")]
    Template(&'static str),

    #[error("{context} expects {expected}, got {found}")]
    TypeMismatch {
        context: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{context} expects {expected}, got {found}")]
    WrongType {
        context: &'static str,
        expected: String,
        found: String,
    },

    #[error("not enough values in tuple for {target}")]
    TupleTooShort { target: String },

    #[error("{extra} values left over after building {target}")]
    TupleTooLong { target: String, extra: usize },

    #[error("no field `{name}` in {class}")]
    NoSuchField { class: String, name: String },

    #[error("can't {op} a {kind}")]
    Unsupported { op: &'static str, kind: SingleType },

    #[error("cycle reached while printing without an identity table")]
    Cycle,

    #[error("{message} at position {pos}")]
    Scan { pos: usize, message: String },

    #[error("printed text is not valid UTF-8 after byte {0}")]
    NotUtf8(usize),

    #[error("write failed: {0}")]
    Write(io::ErrorKind),
}

impl From<io::Error> for RtError {
    fn from(err: io::Error) -> Self {
        RtError::Write(err.kind())
    }
}
