//! Runtime type table for paraflow.
//!
//! The compiler emits three record tables describing every type a program
//! uses; [`TypeTable::build`] turns them into an immutable arena of
//! [`BaseType`]s and [`TypeNode`]s addressed by [`TypeId`]. The object
//! model, tuple construction, printing and scanning all dispatch through
//! this table.
//!
//! # Encodings
//!
//! - Base names are `"<scope>:<name>"`; the name selects a [`SingleType`]
//!   and anything that is not a built-in keyword is a class.
//! - Type trees use paren code, `digits ['(' node (',' node)* ')']`.
//! - Class fields are `"typeId:name"` lists in declaration order.
//!
//! # Thread Safety
//!
//! The table is never mutated after [`TypeTable::build`] returns, so it is
//! `Send + Sync`. [`TypeTable::install`] publishes one table process-wide.

mod code;
mod error;
mod idx;
mod kind;
mod layout;
mod record;
mod table;

pub use code::CodeTree;
pub use error::TypeError;
pub use idx::{BaseId, TypeId};
pub use kind::SingleType;
pub use layout::{align_up, Layout, POINTER_SIZE};
pub use record::{builtin_base_id, builtin_bases, BaseInfo, FieldInfo, TypeInfo, BUILTIN_SCOPE};
pub use table::{BaseType, FieldType, TypeDisplay, TypeNode, TypeTable};
