//! Reference-counted heap cells.
//!
//! `Heap<T>` has a crate-private constructor: every heap object is created
//! through the typed constructors on [`PfString`](crate::PfString),
//! [`Array`](crate::Array), [`Dir`](crate::Dir) and
//! [`Object`](crate::Object), which keeps the per-thread ledger honest.
//!
//! The ledger counts allocations and cleanups on the current thread. With
//! no cycles in play, `live_objects()` returns to its starting value once
//! every handle has been dropped.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Which object family a heap cell belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HeapKind {
    String,
    Array,
    Dir,
    Object,
}

/// Address of a heap cell, used as its identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjAddr(usize);

impl fmt::Display for ObjAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

thread_local! {
    static ALLOCATIONS: Cell<u64> = const { Cell::new(0) };
    static CLEANUPS: Cell<u64> = const { Cell::new(0) };
}

/// Heap objects allocated on this thread and not yet cleaned up.
pub fn live_objects() -> u64 {
    ALLOCATIONS.with(Cell::get) - CLEANUPS.with(Cell::get)
}

/// Heap objects cleaned up on this thread so far.
pub fn cleanup_count() -> u64 {
    CLEANUPS.with(Cell::get)
}

struct HeapCell<T> {
    kind: HeapKind,
    data: RefCell<T>,
}

impl<T> Drop for HeapCell<T> {
    fn drop(&mut self) {
        CLEANUPS.with(|c| c.set(c.get() + 1));
        tracing::trace!(kind = ?self.kind, "cleanup");
    }
}

/// Shared handle to a heap object.
///
/// `clone` is the reference increment and `drop` the decrement; the object
/// is cleaned up, and everything it holds released, when the last handle
/// goes away.
pub struct Heap<T>(Rc<HeapCell<T>>);

impl<T> Heap<T> {
    pub(crate) fn new(kind: HeapKind, data: T) -> Self {
        ALLOCATIONS.with(|c| c.set(c.get() + 1));
        Heap(Rc::new(HeapCell {
            kind,
            data: RefCell::new(data),
        }))
    }

    /// Current number of handles to this object.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Whether both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the allocation, stable for as long as any handle lives.
    /// Used as the identity key when printing and comparing.
    pub fn addr(&self) -> ObjAddr {
        ObjAddr(Rc::as_ptr(&self.0).cast::<()>() as usize)
    }

    /// Which kind of heap value this is.
    pub fn kind(&self) -> HeapKind {
        self.0.kind
    }

    pub(crate) fn borrow(&self) -> Ref<'_, T> {
        self.0.data.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.data.borrow_mut()
    }
}

impl<T> Clone for Heap<T> {
    fn clone(&self) -> Self {
        Heap(Rc::clone(&self.0))
    }
}

// Contents are left out: an object graph may be cyclic.
impl<T> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Heap({:?} @ {}, rc={})",
            self.0.kind,
            self.addr(),
            self.ref_count()
        )
    }
}

#[cfg(test)]
mod tests;
