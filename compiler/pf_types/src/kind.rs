//! Kind tag for kind-driven dispatch.
//!
//! Every base type carries a [`SingleType`]. Printing, scanning, cleanup,
//! tuple construction and comparator selection all match on it
//! exhaustively.

use std::fmt;

use crate::layout::{Layout, POINTER_SIZE};

/// Closed set of runtime value kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SingleType {
    // === Primitives (stored inline) ===
    /// One-bit truth value.
    Bit,
    /// Signed 8-bit integer.
    Byte,
    /// Signed 16-bit integer.
    Short,
    /// Signed 32-bit integer.
    Int,
    /// Signed 64-bit integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Single byte character.
    Char,

    // === Heap kinds (reference counted) ===
    /// Mutable byte string.
    String,
    /// Homogeneous growable array.
    Array,
    /// Linked list. Reserved by the compiler, no runtime representation.
    List,
    /// String-keyed directory.
    Dir,
    /// Tree. Reserved by the compiler, no runtime representation.
    Tree,
    /// User class instance.
    Class,

    // === Dynamic ===
    /// Value paired with its runtime type.
    Var,

    // === Function pointers ===
    /// Plain function (`to`).
    To,
    /// Parallel function (`para`).
    Para,
    /// Side-effect free function (`flow`).
    Flow,
}

impl SingleType {
    /// All kinds, in declaration order.
    pub const ALL: [SingleType; 18] = [
        SingleType::Bit,
        SingleType::Byte,
        SingleType::Short,
        SingleType::Int,
        SingleType::Long,
        SingleType::Float,
        SingleType::Double,
        SingleType::Char,
        SingleType::String,
        SingleType::Array,
        SingleType::List,
        SingleType::Dir,
        SingleType::Tree,
        SingleType::Class,
        SingleType::Var,
        SingleType::To,
        SingleType::Para,
        SingleType::Flow,
    ];

    /// Map a base-type name to its kind.
    ///
    /// Names without a built-in keyword are user classes.
    pub fn from_name(name: &str) -> SingleType {
        match name {
            "bit" => SingleType::Bit,
            "byte" => SingleType::Byte,
            "short" => SingleType::Short,
            "int" => SingleType::Int,
            "long" => SingleType::Long,
            "float" => SingleType::Float,
            "double" => SingleType::Double,
            "char" => SingleType::Char,
            "string" => SingleType::String,
            "array" => SingleType::Array,
            "list" => SingleType::List,
            "dir" => SingleType::Dir,
            "tree" => SingleType::Tree,
            "var" => SingleType::Var,
            "to" => SingleType::To,
            "para" => SingleType::Para,
            "flow" => SingleType::Flow,
            _ => SingleType::Class,
        }
    }

    /// Keyword for this kind (`"class"` for user classes).
    pub const fn keyword(self) -> &'static str {
        match self {
            SingleType::Bit => "bit",
            SingleType::Byte => "byte",
            SingleType::Short => "short",
            SingleType::Int => "int",
            SingleType::Long => "long",
            SingleType::Float => "float",
            SingleType::Double => "double",
            SingleType::Char => "char",
            SingleType::String => "string",
            SingleType::Array => "array",
            SingleType::List => "list",
            SingleType::Dir => "dir",
            SingleType::Tree => "tree",
            SingleType::Class => "class",
            SingleType::Var => "var",
            SingleType::To => "to",
            SingleType::Para => "para",
            SingleType::Flow => "flow",
        }
    }

    /// Physical size and alignment of one slot of this kind.
    pub const fn layout(self) -> Layout {
        match self {
            SingleType::Bit | SingleType::Byte | SingleType::Char => Layout::new(1, 1),
            SingleType::Short => Layout::new(2, 2),
            SingleType::Int | SingleType::Float => Layout::new(4, 4),
            SingleType::Long | SingleType::Double => Layout::new(8, 8),
            SingleType::String
            | SingleType::Array
            | SingleType::List
            | SingleType::Dir
            | SingleType::Tree
            | SingleType::Class
            | SingleType::Var
            | SingleType::To
            | SingleType::Para
            | SingleType::Flow => Layout::new(POINTER_SIZE, POINTER_SIZE),
        }
    }

    /// Inline value kinds.
    pub const fn is_primitive(self) -> bool {
        matches!(
            self,
            SingleType::Bit
                | SingleType::Byte
                | SingleType::Short
                | SingleType::Int
                | SingleType::Long
                | SingleType::Float
                | SingleType::Double
                | SingleType::Char
        )
    }

    /// Integer kinds, `Bit` and `Char` included.
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            SingleType::Bit
                | SingleType::Byte
                | SingleType::Short
                | SingleType::Int
                | SingleType::Long
                | SingleType::Char
        )
    }

    pub const fn is_floating(self) -> bool {
        matches!(self, SingleType::Float | SingleType::Double)
    }

    /// Reference-counted heap kinds.
    pub const fn is_heap(self) -> bool {
        matches!(
            self,
            SingleType::String
                | SingleType::Array
                | SingleType::List
                | SingleType::Dir
                | SingleType::Tree
                | SingleType::Class
        )
    }

    pub const fn is_function(self) -> bool {
        matches!(self, SingleType::To | SingleType::Para | SingleType::Flow)
    }

    /// Whether a slot of this kind can hold a reference that must be released.
    pub const fn needs_cleanup(self) -> bool {
        self.is_heap() || matches!(self, SingleType::Var)
    }
}

impl fmt::Display for SingleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
