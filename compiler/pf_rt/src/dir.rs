//! String-keyed directories.

use std::fmt;

use pf_types::{SingleType, TypeId, TypeTable};
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::error::RtError;
use crate::heap::{Heap, HeapKind, ObjAddr};
use crate::string::PfString;
use crate::value::{release_all, Value};

pub(crate) struct DirData {
    el_type: TypeId,
    el_kind: SingleType,
    table: FxHashMap<Vec<u8>, Value>,
}

impl Drop for DirData {
    fn drop(&mut self) {
        release_all(self.table.drain().map(|(_, value)| value).collect());
    }
}

#[derive(Clone)]
pub struct Dir(Heap<DirData>);

impl Dir {
    /// Empty directory sized for about `estimated_size` entries.
    pub fn new(types: &TypeTable, estimated_size: usize, el_type: TypeId) -> Result<Dir, RtError> {
        let el_kind = types.kind(el_type)?;
        Ok(Dir::with_kind(el_type, el_kind, estimated_size))
    }

    fn with_kind(el_type: TypeId, el_kind: SingleType, estimated_size: usize) -> Dir {
        let capacity = (estimated_size.saturating_mul(3) / 2).max(1).next_power_of_two();
        Dir(Heap::new(
            HeapKind::Dir,
            DirData {
                el_type,
                el_kind,
                table: FxHashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            },
        ))
    }

    /// Declared value type.
    pub fn el_type(&self) -> TypeId {
        self.0.borrow().el_type
    }

    pub fn el_kind(&self) -> SingleType {
        self.0.borrow().el_kind
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.borrow().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ref_count(&self) -> usize {
        self.0.ref_count()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Dir) -> bool {
        self.0.ptr_eq(&other.0)
    }

    pub fn addr(&self) -> ObjAddr {
        self.0.addr()
    }

    /// Add or replace the entry for `key`. The key handle is released once
    /// its bytes are copied; the replaced value is returned.
    pub fn insert(
        &self,
        types: &TypeTable,
        key: PfString,
        value: Value,
    ) -> Result<Option<Value>, RtError> {
        let key = key.to_vec();
        self.insert_bytes(types, &key, value)
    }

    /// [`Dir::insert`] with a borrowed key.
    pub fn insert_bytes(
        &self,
        types: &TypeTable,
        key: &[u8],
        value: Value,
    ) -> Result<Option<Value>, RtError> {
        let value = value.check_type(types, self.el_type(), "directory value")?;
        let old = self.0.borrow_mut().table.insert(key.to_vec(), value);
        Ok(old)
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Option<Value> {
        self.0.borrow().table.get(key).cloned()
    }

    /// Take the entry for `key` out, handing its value to the caller.
    pub fn remove(&self, key: &[u8]) -> Option<Value> {
        self.0.borrow_mut().table.remove(key)
    }

    /// Whether `key` has an entry.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.0.borrow().table.contains_key(key)
    }

    /// Move the values onto `pending` if this is the last handle.
    pub(crate) fn detach_values(self, pending: &mut Vec<Value>) {
        if self.ref_count() == 1 {
            pending.extend(self.0.borrow_mut().table.drain().map(|(_, value)| value));
        }
    }

    /// Keys in byte order.
    pub fn keys(&self) -> Vec<Vec<u8>> {
        let mut keys: Vec<Vec<u8>> = self.0.borrow().table.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Entries in key byte order.
    pub fn sorted_entries(&self) -> Vec<(Vec<u8>, Value)> {
        let mut entries: Vec<(Vec<u8>, Value)> = self
            .0
            .borrow()
            .table
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl fmt::Debug for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        write!(
            f,
            "Dir(of {} @ {}, len={}, rc={})",
            data.el_kind,
            self.addr(),
            data.table.len(),
            self.ref_count()
        )
    }
}
