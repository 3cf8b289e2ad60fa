//! Type table shared by the integration tests.
//!
//! ```text
//! class shared { string first; string second; }
//! class cell   { int value; cell next; }
//! class link   { int value; link left; link right; }
//! ```

#![allow(
    dead_code,
    clippy::unwrap_used,
    reason = "each test binary uses a subset of the fixture"
)]

use pf_types::{builtin_bases, BaseInfo, FieldInfo, TypeId, TypeInfo, TypeTable};

pub const INT: TypeId = TypeId::from_raw(0);
pub const STRING: TypeId = TypeId::from_raw(1);
pub const ARRAY_OF_INT: TypeId = TypeId::from_raw(2);
pub const ARRAY_OF_STRING: TypeId = TypeId::from_raw(3);
pub const DIR_OF_INT: TypeId = TypeId::from_raw(4);
pub const SHARED: TypeId = TypeId::from_raw(5);
pub const CELL: TypeId = TypeId::from_raw(6);
pub const ARRAY_OF_CELL: TypeId = TypeId::from_raw(7);
pub const DOUBLE: TypeId = TypeId::from_raw(8);
pub const LINK: TypeId = TypeId::from_raw(9);
pub const ARRAY_OF_LINK: TypeId = TypeId::from_raw(10);

pub fn types() -> TypeTable {
    let mut bases = builtin_bases();
    bases.push(BaseInfo::new(18, "1:shared").with_cleanup(true));
    bases.push(BaseInfo::new(19, "1:cell").with_cleanup(true));
    bases.push(BaseInfo::new(20, "1:link").with_cleanup(true));
    let types = [
        TypeInfo::new(0, "4"),
        TypeInfo::new(1, "9"),
        TypeInfo::new(2, "10(4)"),
        TypeInfo::new(3, "10(9)"),
        TypeInfo::new(4, "12(4)"),
        TypeInfo::new(5, "18"),
        TypeInfo::new(6, "19"),
        TypeInfo::new(7, "10(19)"),
        TypeInfo::new(8, "7"),
        TypeInfo::new(9, "20"),
        TypeInfo::new(10, "10(20)"),
    ];
    let fields = [
        FieldInfo::new(18, "1:first,1:second"),
        FieldInfo::new(19, "0:value,6:next"),
        FieldInfo::new(20, "0:value,9:left,9:right"),
    ];
    TypeTable::build(&bases, &types, &fields).unwrap()
}
