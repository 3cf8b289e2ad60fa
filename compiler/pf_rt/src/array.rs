//! Homogeneous growable arrays.
//!
//! Every element has the array's element type; stores that would break
//! that are rejected. Capacity grows 0, 4, 8, 16, ... on append.

mod sort;

use std::cell::Ref;
use std::fmt;

use pf_types::{SingleType, TypeId, TypeTable};

use crate::error::RtError;
use crate::heap::{Heap, HeapKind, ObjAddr};
use crate::string::PfString;
use crate::value::{release_all, Value};

/// Capacity of the first allocation made by an append.
const FIRST_CAPACITY: usize = 4;

pub(crate) struct ArrayData {
    el_type: TypeId,
    el_kind: SingleType,
    el_size: usize,
    allocated: usize,
    items: Vec<Value>,
}

impl Drop for ArrayData {
    fn drop(&mut self) {
        release_all(std::mem::take(&mut self.items));
    }
}

#[derive(Clone)]
pub struct Array(Heap<ArrayData>);

impl Array {
    /// Wrap `items` as an array of `el_type`, reserving room for
    /// `allocated` elements. Every item must fit the element type.
    pub fn of_type(
        types: &TypeTable,
        el_type: TypeId,
        items: Vec<Value>,
        allocated: usize,
    ) -> Result<Array, RtError> {
        let el_kind = types.kind(el_type)?;
        let items = items
            .into_iter()
            .map(|v| v.check_type(types, el_type, "array element"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Array::from_checked(el_type, el_kind, items, allocated))
    }

    /// Caller has already checked `items` against `el_type`.
    pub(crate) fn from_checked(
        el_type: TypeId,
        el_kind: SingleType,
        mut items: Vec<Value>,
        allocated: usize,
    ) -> Array {
        let allocated = allocated.max(items.len());
        items.reserve_exact(allocated - items.len());
        Array(Heap::new(
            HeapKind::Array,
            ArrayData {
                el_type,
                el_kind,
                el_size: el_kind.layout().size,
                allocated,
                items,
            },
        ))
    }

    /// Zero-filled array of `size` elements.
    pub fn dim(types: &TypeTable, size: usize, el_type: TypeId) -> Result<Array, RtError> {
        let el_kind = types.kind(el_type)?;
        let items = vec![Value::zero(el_kind); size];
        Ok(Array::from_checked(el_type, el_kind, items, size))
    }

    /// Nested arrays, one dimension per nesting level of `array_type`.
    /// Levels past the end of `dims` stay nil.
    pub fn multi_dim(
        types: &TypeTable,
        dims: &[usize],
        array_type: TypeId,
    ) -> Result<Array, RtError> {
        let el_type = types.element(array_type)?;
        let Some((&size, rest)) = dims.split_first() else {
            return Array::dim(types, 0, el_type);
        };
        if rest.is_empty() || types.kind(el_type)? != SingleType::Array {
            return Array::dim(types, size, el_type);
        }
        let items = (0..size)
            .map(|_| Array::multi_dim(types, rest, el_type).map(Value::Array))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Array::from_checked(el_type, SingleType::Array, items, size))
    }

    /// Array of `string` holding `strings`.
    pub fn from_strings(types: &TypeTable, strings: Vec<PfString>) -> Result<Array, RtError> {
        let el_type = types.string_type()?;
        let size = strings.len();
        let items = strings.into_iter().map(Value::String).collect();
        Ok(Array::from_checked(el_type, SingleType::String, items, size))
    }

    /// Move the elements onto `pending` if this is the last handle.
    pub(crate) fn detach_items(self, pending: &mut Vec<Value>) {
        if self.ref_count() == 1 {
            pending.append(&mut self.0.borrow_mut().items);
        }
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.0.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Element slots reserved, always at least [`Array::size`].
    pub fn allocated(&self) -> usize {
        self.0.borrow().allocated
    }

    /// Declared element type; every stored value fits it.
    pub fn el_type(&self) -> TypeId {
        self.0.borrow().el_type
    }

    pub fn el_kind(&self) -> SingleType {
        self.0.borrow().el_kind
    }

    /// Slot size of one element.
    pub fn el_size(&self) -> usize {
        self.0.borrow().el_size
    }

    pub fn ref_count(&self) -> usize {
        self.0.ref_count()
    }

    /// Whether both handles refer to the same array.
    pub fn ptr_eq(&self, other: &Array) -> bool {
        self.0.ptr_eq(&other.0)
    }

    /// Identity of the underlying allocation.
    pub fn addr(&self) -> ObjAddr {
        self.0.addr()
    }

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Result<Value, RtError> {
        let data = self.0.borrow();
        data.items
            .get(index)
            .cloned()
            .ok_or(RtError::IndexOutOfRange {
                index,
                size: data.items.len(),
            })
    }

    /// Store `value` at `index`, releasing the old element.
    pub fn set(&self, types: &TypeTable, index: usize, value: Value) -> Result<(), RtError> {
        let value = value.check_type(types, self.el_type(), "array element")?;
        let old = {
            let mut data = self.0.borrow_mut();
            let size = data.items.len();
            let slot = data
                .items
                .get_mut(index)
                .ok_or(RtError::IndexOutOfRange { index, size })?;
            std::mem::replace(slot, value)
        };
        drop(old);
        Ok(())
    }

    /// Add `value` at the end.
    pub fn append(&self, types: &TypeTable, value: Value) -> Result<(), RtError> {
        let value = value.check_type(types, self.el_type(), "array element")?;
        let mut data = self.0.borrow_mut();
        if data.items.len() == data.allocated {
            let allocated = if data.allocated == 0 {
                FIRST_CAPACITY
            } else {
                data.allocated * 2
            };
            let extra = allocated - data.items.len();
            data.items.reserve_exact(extra);
            data.allocated = allocated;
        }
        data.items.push(value);
        Ok(())
    }

    /// Same as [`Array::append`].
    pub fn push(&self, types: &TypeTable, value: Value) -> Result<(), RtError> {
        self.append(types, value)
    }

    /// Remove and return the last element.
    pub fn pop(&self) -> Result<Value, RtError> {
        self.0.borrow_mut().items.pop().ok_or(RtError::PopEmpty)
    }

    /// Snapshot of the elements.
    pub fn items(&self) -> Vec<Value> {
        self.0.borrow().items.clone()
    }

    pub(crate) fn borrow_items(&self) -> Ref<'_, [Value]> {
        Ref::map(self.0.borrow(), |data| data.items.as_slice())
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        write!(
            f,
            "Array(of {} @ {}, size={}, rc={})",
            data.el_kind,
            self.addr(),
            data.items.len(),
            self.ref_count()
        )
    }
}

#[cfg(test)]
mod tests;
