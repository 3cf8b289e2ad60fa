//! Records emitted by the compiler to describe a program's types.
//!
//! Three flat tables arrive at process start: base types, type trees in
//! paren code, and per-class field lists. [`TypeTable::build`] turns them
//! into the runtime table.
//!
//! [`TypeTable::build`]: crate::TypeTable::build

use crate::kind::SingleType;

/// One primitive or class.
///
/// `name` is `"<scope>:<name>"`: a decimal scope id, a colon, then the
/// type name. Names without a built-in keyword are classes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseInfo {
    pub id: u32,
    pub name: String,
    pub parent: Option<u32>,
    pub needs_cleanup: bool,
    pub size: usize,
}

impl BaseInfo {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        BaseInfo {
            id,
            name: name.into(),
            parent: None,
            needs_cleanup: false,
            size: 0,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: u32) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_cleanup(mut self, needs_cleanup: bool) -> Self {
        self.needs_cleanup = needs_cleanup;
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }
}

/// One declared type tree, e.g. `"9(4)"` for an array of the base with id 4.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeInfo {
    pub id: u32,
    pub code: String,
}

impl TypeInfo {
    pub fn new(id: u32, code: impl Into<String>) -> Self {
        TypeInfo {
            id,
            code: code.into(),
        }
    }
}

/// Field list of one class: `"typeId:name,typeId:name,..."` in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldInfo {
    pub class: u32,
    pub fields: String,
}

impl FieldInfo {
    pub fn new(class: u32, fields: impl Into<String>) -> Self {
        FieldInfo {
            class,
            fields: fields.into(),
        }
    }
}

/// Scope id used for built-in base types.
pub const BUILTIN_SCOPE: u32 = 0;

/// Base records for every built-in keyword, ids `1..=17` in kind order.
///
/// Hosts that embed the runtime without a compiler, and tests, start from
/// these and append their own classes.
pub fn builtin_bases() -> Vec<BaseInfo> {
    SingleType::ALL
        .into_iter()
        .filter(|kind| *kind != SingleType::Class)
        .zip(1u32..)
        .map(|(kind, id)| {
            BaseInfo::new(id, format!("{BUILTIN_SCOPE}:{}", kind.keyword()))
                .with_cleanup(kind.needs_cleanup())
                .with_size(kind.layout().size)
        })
        .collect()
}

/// Id that [`builtin_bases`] assigns to `kind`.
///
/// Returns `None` for [`SingleType::Class`], which has no built-in record.
pub fn builtin_base_id(kind: SingleType) -> Option<u32> {
    SingleType::ALL
        .into_iter()
        .filter(|k| *k != SingleType::Class)
        .position(|k| k == kind)
        .and_then(|pos| u32::try_from(pos + 1).ok())
}
