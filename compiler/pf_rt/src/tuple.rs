//! Building objects, arrays and directories from flat value tuples.
//!
//! Generated code evaluates a tuple expression into a flat run of values
//! and hands it here with the target type. A class slot consumes one value
//! if that value is nil or an object of the slot's class (or a subclass);
//! otherwise the nested class is built in place from the following values,
//! field by field.

use std::iter::Peekable;
use std::vec::IntoIter;

use pf_stack::ensure_sufficient_stack;
use pf_types::{SingleType, TypeId, TypeTable};

use crate::array::Array;
use crate::dir::Dir;
use crate::error::RtError;
use crate::object::Object;
use crate::string::PfString;
use crate::value::{Value, Var};

struct TupleReader<'t> {
    types: &'t TypeTable,
    target: TypeId,
    values: Peekable<IntoIter<Value>>,
}

impl<'t> TupleReader<'t> {
    fn new(types: &'t TypeTable, values: Vec<Value>, target: TypeId) -> Self {
        TupleReader {
            types,
            target,
            values: values.into_iter().peekable(),
        }
    }

    fn target_name(&self) -> String {
        self.types.display(self.target).to_string()
    }

    fn next_raw(&mut self) -> Result<Value, RtError> {
        match self.values.next() {
            Some(value) => Ok(value),
            None => Err(RtError::TupleTooShort {
                target: self.target_name(),
            }),
        }
    }

    /// One value for a slot of type `ty`.
    fn slot(&mut self, ty: TypeId) -> Result<Value, RtError> {
        let types = self.types;
        if types.kind(ty)? == SingleType::Class && !self.next_fills(ty)? {
            return ensure_sufficient_stack(|| self.class(ty)).map(Value::Object);
        }
        self.next_raw()?.check_type(types, ty, "tuple slot")
    }

    /// Whether the next value is a whole instance for class slot `ty`.
    fn next_fills(&mut self, ty: TypeId) -> Result<bool, RtError> {
        match self.values.peek() {
            Some(Value::Nil) => Ok(true),
            Some(Value::Object(o)) => Ok(self.types.accepts(ty, o.class())?),
            _ => Ok(false),
        }
    }

    fn class(&mut self, class: TypeId) -> Result<Object, RtError> {
        let types = self.types;
        let fields = types
            .fields(class)?
            .iter()
            .map(|field| self.slot(field.ty))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Object::from_fields(class, fields))
    }

    fn finish(mut self) -> Result<(), RtError> {
        let extra = self.values.by_ref().count();
        if extra == 0 {
            Ok(())
        } else {
            Err(RtError::TupleTooLong {
                target: self.target_name(),
                extra,
            })
        }
    }
}

/// Build an instance of `class` from a flat tuple.
pub fn tuple_to_class(
    types: &TypeTable,
    values: Vec<Value>,
    class: TypeId,
) -> Result<Object, RtError> {
    let mut reader = TupleReader::new(types, values, class);
    let object = reader.class(class)?;
    reader.finish()?;
    Ok(object)
}

/// Build an array of `count` elements of `el_type`.
pub fn array_from_tuple(
    types: &TypeTable,
    values: Vec<Value>,
    count: usize,
    el_type: TypeId,
) -> Result<Array, RtError> {
    let el_kind = types.kind(el_type)?;
    let mut reader = TupleReader::new(types, values, el_type);
    let items = (0..count)
        .map(|_| reader.slot(el_type))
        .collect::<Result<Vec<_>, _>>()?;
    reader.finish()?;
    Ok(Array::from_checked(el_type, el_kind, items, count))
}

/// Build a directory from `count` interleaved key/value pairs.
pub fn dir_from_tuple(
    types: &TypeTable,
    values: Vec<Value>,
    count: usize,
    el_type: TypeId,
) -> Result<Dir, RtError> {
    let dir = Dir::new(types, count, el_type)?;
    let mut reader = TupleReader::new(types, values, el_type);
    for _ in 0..count {
        let key = match reader.next_raw()? {
            Value::String(key) => key,
            other => {
                return Err(RtError::TypeMismatch {
                    context: "directory key",
                    expected: "string",
                    found: other.kind_name(),
                })
            }
        };
        let value = reader.slot(el_type)?;
        dir.insert(types, key, value)?;
    }
    reader.finish()?;
    Ok(dir)
}

fn expect_kind(types: &TypeTable, el_type: TypeId, kind: SingleType) -> Result<(), RtError> {
    let found = types.kind(el_type)?;
    if found == kind {
        Ok(())
    } else {
        Err(RtError::TypeMismatch {
            context: "array element type",
            expected: kind.keyword(),
            found: found.keyword(),
        })
    }
}

macro_rules! typed_array_from_tuple {
    ($($name:ident: $elem:ty => $variant:ident;)*) => {$(
        /// Build an array directly from already-typed elements.
        pub fn $name(
            types: &TypeTable,
            values: &[$elem],
            el_type: TypeId,
        ) -> Result<Array, RtError> {
            expect_kind(types, el_type, SingleType::$variant)?;
            let items = values.iter().copied().map(Value::$variant).collect();
            Ok(Array::from_checked(el_type, SingleType::$variant, items, values.len()))
        }
    )*};
}

typed_array_from_tuple! {
    bit_array_from_tuple: bool => Bit;
    byte_array_from_tuple: i8 => Byte;
    short_array_from_tuple: i16 => Short;
    int_array_from_tuple: i32 => Int;
    long_array_from_tuple: i64 => Long;
    float_array_from_tuple: f32 => Float;
    double_array_from_tuple: f64 => Double;
    char_array_from_tuple: u8 => Char;
}

/// Array of strings; `None` elements are nil.
pub fn string_array_from_tuple(
    types: &TypeTable,
    values: Vec<Option<PfString>>,
    el_type: TypeId,
) -> Result<Array, RtError> {
    expect_kind(types, el_type, SingleType::String)?;
    let size = values.len();
    let items = values.into_iter().map(Value::from).collect();
    Ok(Array::from_checked(el_type, SingleType::String, items, size))
}

pub fn var_array_from_tuple(
    types: &TypeTable,
    values: Vec<Var>,
    el_type: TypeId,
) -> Result<Array, RtError> {
    expect_kind(types, el_type, SingleType::Var)?;
    let size = values.len();
    let items = values
        .into_iter()
        .map(|var| Value::Var(Box::new(var)))
        .collect();
    Ok(Array::from_checked(el_type, SingleType::Var, items, size))
}

/// Array of class instances, building any element given as flat fields.
pub fn class_array_from_tuple(
    types: &TypeTable,
    values: Vec<Value>,
    count: usize,
    el_type: TypeId,
) -> Result<Array, RtError> {
    expect_kind(types, el_type, SingleType::Class)?;
    array_from_tuple(types, values, count, el_type)
}
