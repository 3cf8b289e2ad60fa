//! Class instances.

use std::cell::Ref;
use std::fmt;

use pf_types::{TypeId, TypeTable};

use crate::error::RtError;
use crate::heap::{Heap, HeapKind, ObjAddr};
use crate::value::{release_all, Value};

pub(crate) struct ObjData {
    class: TypeId,
    fields: Vec<Value>,
}

impl Drop for ObjData {
    fn drop(&mut self) {
        release_all(std::mem::take(&mut self.fields));
    }
}

/// Instance of a class; one slot per field, in declaration order.
#[derive(Clone)]
pub struct Object(Heap<ObjData>);

impl Object {
    /// New instance with every field zero-filled.
    pub fn new(types: &TypeTable, class: TypeId) -> Result<Object, RtError> {
        let fields = types
            .fields(class)?
            .iter()
            .map(|field| types.kind(field.ty).map(Value::zero))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Object::from_fields(class, fields))
    }

    /// Caller has already checked `fields` against the class.
    pub(crate) fn from_fields(class: TypeId, fields: Vec<Value>) -> Object {
        Object(Heap::new(HeapKind::Object, ObjData { class, fields }))
    }

    /// The instance's class type.
    pub fn class(&self) -> TypeId {
        self.0.borrow().class
    }

    pub fn field_count(&self) -> usize {
        self.0.borrow().fields.len()
    }

    /// Number of live handles.
    pub fn ref_count(&self) -> usize {
        self.0.ref_count()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        self.0.ptr_eq(&other.0)
    }

    pub fn addr(&self) -> ObjAddr {
        self.0.addr()
    }

    /// Value of field `index`.
    pub fn get(&self, index: usize) -> Result<Value, RtError> {
        let data = self.0.borrow();
        data.fields
            .get(index)
            .cloned()
            .ok_or(RtError::IndexOutOfRange {
                index,
                size: data.fields.len(),
            })
    }

    /// Store `value` in field `index`, releasing the old value.
    pub fn set(&self, types: &TypeTable, index: usize, value: Value) -> Result<(), RtError> {
        let field_type = types
            .fields(self.class())?
            .get(index)
            .map(|field| field.ty)
            .ok_or_else(|| RtError::IndexOutOfRange {
                index,
                size: self.field_count(),
            })?;
        let value = value.check_type(types, field_type, "field")?;
        self.set_unchecked(index, value);
        Ok(())
    }

    /// Move the fields onto `pending` if this is the last handle.
    pub(crate) fn detach_fields(self, pending: &mut Vec<Value>) {
        if self.ref_count() == 1 {
            pending.append(&mut self.0.borrow_mut().fields);
        }
    }

    pub(crate) fn set_unchecked(&self, index: usize, value: Value) {
        let old = self
            .0
            .borrow_mut()
            .fields
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, value));
        drop(old);
    }

    /// Position of the field called `name`.
    pub fn field_index(&self, types: &TypeTable, name: &str) -> Result<usize, RtError> {
        let class = self.class();
        types
            .fields(class)?
            .iter()
            .position(|field| &*field.name == name)
            .ok_or_else(|| RtError::NoSuchField {
                class: types.display(class).to_string(),
                name: name.to_owned(),
            })
    }

    /// [`Object::get`] by field name.
    pub fn get_named(&self, types: &TypeTable, name: &str) -> Result<Value, RtError> {
        self.get(self.field_index(types, name)?)
    }

    /// [`Object::set`] by field name.
    pub fn set_named(&self, types: &TypeTable, name: &str, value: Value) -> Result<(), RtError> {
        self.set(types, self.field_index(types, name)?, value)
    }

    /// Snapshot of the field values.
    pub fn fields(&self) -> Vec<Value> {
        self.0.borrow().fields.clone()
    }

    pub(crate) fn borrow_fields(&self) -> Ref<'_, [Value]> {
        Ref::map(self.0.borrow(), |data| data.fields.as_slice())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Object({} @ {}, rc={})",
            self.class(),
            self.addr(),
            self.ref_count()
        )
    }
}

#[cfg(test)]
mod tests;
