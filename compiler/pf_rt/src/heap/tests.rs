use super::*;
use pretty_assertions::assert_eq;

#[test]
fn clone_shares_the_cell() {
    let a = Heap::new(HeapKind::Array, vec![1, 2, 3]);
    let b = a.clone();
    assert!(a.ptr_eq(&b));
    assert_eq!(a.addr(), b.addr());
    assert_eq!(a.ref_count(), 2);
    drop(b);
    assert_eq!(a.ref_count(), 1);
}

#[test]
fn distinct_cells_are_distinct() {
    let a = Heap::new(HeapKind::String, 1);
    let b = Heap::new(HeapKind::String, 1);
    assert!(!a.ptr_eq(&b));
    assert!(a.addr() != b.addr());
}

#[test]
fn ledger_counts_cleanup_once() {
    let live = live_objects();
    let cleaned = cleanup_count();

    let a = Heap::new(HeapKind::Object, String::from("x"));
    let b = a.clone();
    let c = b.clone();
    assert_eq!(live_objects(), live + 1);

    drop(a);
    drop(c);
    assert_eq!(cleanup_count(), cleaned);
    drop(b);
    assert_eq!(cleanup_count(), cleaned + 1);
    assert_eq!(live_objects(), live);
}

#[test]
fn nested_cells_release_their_children() {
    let live = live_objects();
    let inner = Heap::new(HeapKind::String, 7);
    let outer = Heap::new(HeapKind::Array, vec![inner.clone(), inner]);
    assert_eq!(live_objects(), live + 2);
    drop(outer);
    assert_eq!(live_objects(), live);
}

#[test]
fn borrow_mut_is_visible_through_every_handle() {
    let a = Heap::new(HeapKind::Array, vec![1]);
    let b = a.clone();
    b.borrow_mut().push(2);
    assert_eq!(*a.borrow(), vec![1, 2]);
}

#[test]
fn debug_omits_contents() {
    let a = Heap::new(HeapKind::Dir, vec![1, 2]);
    let text = format!("{a:?}");
    assert!(text.starts_with("Heap(Dir @ 0x"));
    assert!(text.ends_with("rc=1)"));
}
