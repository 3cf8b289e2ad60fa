//! Shared type table for unit tests.
//!
//! Classes:
//!
//! ```text
//! class point  { int x; int y; }
//! class pair   { string a; string b; }
//! class node   { int value; node next; }
//! class holder { string name; array of int items; dir of int tags; }
//! class line   { point from; point to; }
//! class point3 extends point { int x; int y; int z; }
//! class inner  { int v; }
//! class mid    { inner i; int x; }
//! class outer  { mid m; }
//! ```

#![allow(clippy::unwrap_used)]

use pf_types::{builtin_bases, BaseInfo, FieldInfo, TypeId, TypeInfo, TypeTable};

pub(crate) const INT: TypeId = TypeId::from_raw(0);
pub(crate) const STRING: TypeId = TypeId::from_raw(1);
pub(crate) const ARRAY_OF_INT: TypeId = TypeId::from_raw(2);
pub(crate) const ARRAY_OF_STRING: TypeId = TypeId::from_raw(3);
pub(crate) const DIR_OF_INT: TypeId = TypeId::from_raw(4);
pub(crate) const POINT: TypeId = TypeId::from_raw(5);
pub(crate) const PAIR: TypeId = TypeId::from_raw(6);
pub(crate) const NODE: TypeId = TypeId::from_raw(7);
pub(crate) const ARRAY_OF_ARRAY_OF_INT: TypeId = TypeId::from_raw(8);
pub(crate) const VAR: TypeId = TypeId::from_raw(9);
pub(crate) const ARRAY_OF_VAR: TypeId = TypeId::from_raw(10);
pub(crate) const HOLDER: TypeId = TypeId::from_raw(11);
pub(crate) const DOUBLE: TypeId = TypeId::from_raw(12);
pub(crate) const ARRAY_OF_POINT: TypeId = TypeId::from_raw(13);
pub(crate) const DIR_OF_STRING: TypeId = TypeId::from_raw(14);
pub(crate) const BIT: TypeId = TypeId::from_raw(15);
pub(crate) const CHAR: TypeId = TypeId::from_raw(16);
pub(crate) const ARRAY_OF_DOUBLE: TypeId = TypeId::from_raw(17);
pub(crate) const TO: TypeId = TypeId::from_raw(18);
pub(crate) const LINE: TypeId = TypeId::from_raw(19);
pub(crate) const LONG: TypeId = TypeId::from_raw(20);
pub(crate) const BYTE: TypeId = TypeId::from_raw(21);
pub(crate) const SHORT: TypeId = TypeId::from_raw(22);
pub(crate) const FLOAT: TypeId = TypeId::from_raw(23);
pub(crate) const ARRAY_OF_TO: TypeId = TypeId::from_raw(24);
pub(crate) const ARRAY_OF_NODE: TypeId = TypeId::from_raw(25);
pub(crate) const ARRAY_OF_CHAR: TypeId = TypeId::from_raw(26);
pub(crate) const ARRAY_OF_BIT: TypeId = TypeId::from_raw(27);
pub(crate) const POINT3: TypeId = TypeId::from_raw(28);
pub(crate) const INNER: TypeId = TypeId::from_raw(29);
pub(crate) const MID: TypeId = TypeId::from_raw(30);
pub(crate) const OUTER: TypeId = TypeId::from_raw(31);

/// Build the fixture table.
pub(crate) fn types() -> TypeTable {
    let mut bases = builtin_bases();
    bases.extend([
        BaseInfo::new(18, "1:point").with_cleanup(true),
        BaseInfo::new(19, "1:pair").with_cleanup(true),
        BaseInfo::new(20, "1:node").with_cleanup(true),
        BaseInfo::new(21, "1:holder").with_cleanup(true),
        BaseInfo::new(22, "1:line").with_cleanup(true),
        BaseInfo::new(23, "1:point3").with_parent(18).with_cleanup(true),
        BaseInfo::new(24, "1:inner").with_cleanup(true),
        BaseInfo::new(25, "1:mid").with_cleanup(true),
        BaseInfo::new(26, "1:outer").with_cleanup(true),
    ]);
    let types = [
        "4", "9", "10(4)", "10(9)", "12(4)", "18", "19", "20", "10(10(4))", "14", "10(14)", "21",
        "7", "10(18)", "12(9)", "1", "8", "10(7)", "15", "22", "5", "2", "3", "6", "10(15)",
        "10(20)", "10(8)", "10(1)", "23", "24", "25", "26",
    ]
    .iter()
    .zip(0u32..)
    .map(|(code, id)| TypeInfo::new(id, *code))
    .collect::<Vec<_>>();
    let fields = [
        FieldInfo::new(18, "0:x,0:y"),
        FieldInfo::new(19, "1:a,1:b"),
        FieldInfo::new(20, "0:value,7:next"),
        FieldInfo::new(21, "1:name,2:items,4:tags"),
        FieldInfo::new(22, "5:from,5:to"),
        FieldInfo::new(23, "0:x,0:y,0:z"),
        FieldInfo::new(24, "0:v"),
        FieldInfo::new(25, "29:i,0:x"),
        FieldInfo::new(26, "30:m"),
    ];
    TypeTable::build(&bases, &types, &fields).unwrap()
}
