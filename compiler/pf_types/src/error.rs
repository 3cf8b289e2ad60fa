//! Type table construction and lookup errors.
//!
//! All of these mean the compiler and the runtime disagree about the
//! encoded tables. None of them is expected from a working compiler.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("malformed base type name `{0}`: expected `<scope>:<name>`")]
    BadBaseName(String),

    #[error("base type {0} registered twice")]
    DuplicateBase(u32),

    #[error("unknown base type {0}")]
    UnknownBase(u32),

    #[error("type {0} registered twice")]
    DuplicateType(u32),

    #[error("unknown type id {0}")]
    UnknownType(u32),

    #[error("malformed type code `{code}` at column {column}: {reason}")]
    MalformedCode {
        code: String,
        column: usize,
        reason: &'static str,
    },

    #[error("malformed field list `{list}` for class {class}: {reason}")]
    MalformedFields {
        class: u32,
        list: String,
        reason: &'static str,
    },

    #[error("field list supplied for `{0}`, which is not a class")]
    NotAClass(String),

    #[error("type {id} is a {found}, expected {expected}")]
    WrongKind {
        id: u32,
        expected: &'static str,
        found: &'static str,
    },

    #[error("type table has no `{0}` type")]
    MissingBuiltin(&'static str),

    #[error("a type table is already installed for this process")]
    AlreadyInstalled,
}
