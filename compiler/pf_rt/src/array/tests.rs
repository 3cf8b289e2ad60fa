use super::*;
use crate::test_helpers::{
    self, ARRAY_OF_ARRAY_OF_INT, ARRAY_OF_INT, ARRAY_OF_VAR, INT, NODE, POINT, POINT3, STRING, VAR,
};
use crate::value::FuncRef;
use crate::Object;
use pretty_assertions::assert_eq;

fn ints(array: &Array) -> Vec<i32> {
    array.items().iter().filter_map(Value::as_int).collect()
}

fn int_array(values: &[i32]) -> Array {
    let items = values.iter().copied().map(Value::Int).collect();
    Array::of_type(&test_helpers::types(), INT, items, values.len()).unwrap()
}

// ── Construction ────────────────────────────────────────────────────

#[test]
fn dim_zero_fills() {
    let types = test_helpers::types();
    let a = Array::dim(&types, 3, INT).unwrap();
    assert_eq!(ints(&a), vec![0, 0, 0]);
    assert_eq!(a.allocated(), 3);
    assert_eq!(a.el_size(), 4);

    let s = Array::dim(&types, 2, STRING).unwrap();
    assert!(s.items().iter().all(Value::is_nil));
}

#[test]
fn multi_dim_nests_one_level_per_dimension() {
    let types = test_helpers::types();
    let grid = Array::multi_dim(&types, &[2, 3], ARRAY_OF_ARRAY_OF_INT).unwrap();
    assert_eq!(grid.size(), 2);
    assert_eq!(grid.el_kind(), SingleType::Array);
    for row in grid.items() {
        let row = row.as_array().unwrap().clone();
        assert_eq!(ints(&row), vec![0, 0, 0]);
    }
}

#[test]
fn multi_dim_leaves_missing_levels_nil() {
    let types = test_helpers::types();
    let rows = Array::multi_dim(&types, &[2], ARRAY_OF_ARRAY_OF_INT).unwrap();
    assert_eq!(rows.size(), 2);
    assert!(rows.items().iter().all(Value::is_nil));
}

#[test]
fn of_type_rejects_foreign_elements() {
    let types = test_helpers::types();
    let err = Array::of_type(&types, INT, vec![Value::Long(1)], 1).unwrap_err();
    assert_eq!(
        err,
        RtError::TypeMismatch {
            context: "array element",
            expected: "int",
            found: "long",
        }
    );
}

// ── Growth ──────────────────────────────────────────────────────────

#[test]
fn append_capacity_sequence() {
    let types = test_helpers::types();
    let a = Array::dim(&types, 0, INT).unwrap();
    let mut seen = vec![a.allocated()];
    for n in 0..17 {
        a.append(&types, Value::Int(n)).unwrap();
        if seen.last() != Some(&a.allocated()) {
            seen.push(a.allocated());
        }
    }
    assert_eq!(seen, vec![0, 4, 8, 16, 32]);
    assert_eq!(a.size(), 17);
}

#[test]
fn append_checks_kind() {
    let types = test_helpers::types();
    let a = int_array(&[]);
    assert!(a.append(&types, Value::Double(1.0)).is_err());
    assert!(a.push(&types, Value::Int(1)).is_ok());
    assert_eq!(a.size(), 1);
}

#[test]
fn append_checks_the_element_type() {
    let types = test_helpers::types();
    let rows = Array::dim(&types, 0, ARRAY_OF_INT).unwrap();
    let words = Array::dim(&types, 0, STRING).unwrap();
    let err = rows.append(&types, Value::from(words)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "array element expects array of int, got array of string"
    );
    rows.append(&types, Value::from(int_array(&[1]))).unwrap();
    assert_eq!(rows.size(), 1);
}

#[test]
fn class_elements_take_subclasses_only() {
    let types = test_helpers::types();
    let points = Array::dim(&types, 0, POINT).unwrap();
    let point3 = Object::new(&types, POINT3).unwrap();
    points.append(&types, Value::from(point3)).unwrap();
    let node = Object::new(&types, NODE).unwrap();
    let err = points.set(&types, 0, Value::from(node)).unwrap_err();
    assert_eq!(err.to_string(), "array element expects point, got node");
    assert_eq!(points.size(), 1);
}

#[test]
fn pop_returns_last_and_fails_when_empty() {
    let a = int_array(&[1, 2]);
    assert_eq!(a.pop().unwrap().as_int(), Some(2));
    assert_eq!(a.pop().unwrap().as_int(), Some(1));
    let err = a.pop().unwrap_err();
    assert_eq!(err.to_string(), "Popping from an empty array");
}

// ── Indexing ────────────────────────────────────────────────────────

#[test]
fn get_and_set_check_bounds() {
    let types = test_helpers::types();
    let a = int_array(&[1, 2, 3]);
    a.set(&types, 1, Value::Int(20)).unwrap();
    assert_eq!(a.get(1).unwrap().as_int(), Some(20));
    assert_eq!(
        a.get(3).unwrap_err(),
        RtError::IndexOutOfRange { index: 3, size: 3 }
    );
    assert_eq!(
        a.set(&types, 5, Value::Int(0)).unwrap_err(),
        RtError::IndexOutOfRange { index: 5, size: 3 }
    );
}

#[test]
fn set_releases_the_old_element() {
    let types = test_helpers::types();
    let strings = Array::dim(&types, 1, STRING).unwrap();
    let old = PfString::new("old");
    strings.set(&types, 0, Value::from(old.clone())).unwrap();
    assert_eq!(old.ref_count(), 2);
    strings.set(&types, 0, Value::Nil).unwrap();
    assert_eq!(old.ref_count(), 1);
}

#[test]
fn array_can_hold_itself() {
    let types = test_helpers::types();
    let nested = Array::of_type(&types, VAR, Vec::new(), 0).unwrap();
    let boxed = Value::var(Value::from(nested.clone()), ARRAY_OF_VAR);
    nested.append(&types, boxed).unwrap();
    assert_eq!(nested.ref_count(), 2);
    nested.set(&types, 0, Value::Nil).unwrap();
    assert_eq!(nested.ref_count(), 1);
}

#[test]
fn nested_arrays_need_the_exact_element_type() {
    let types = test_helpers::types();
    let rows = Array::of_type(&types, ARRAY_OF_INT, Vec::new(), 0).unwrap();
    let err = rows.append(&types, Value::from(rows.clone())).unwrap_err();
    assert_eq!(
        err.to_string(),
        "array element expects array of int, got array of array of int"
    );
    assert_eq!(rows.ref_count(), 1);
}

// ── Sorting ─────────────────────────────────────────────────────────

#[test]
fn sort_builtin_ints() {
    let a = int_array(&[5, 3, 9, 1]);
    a.sort(None).unwrap();
    assert_eq!(ints(&a), vec![1, 3, 5, 9]);
}

#[test]
fn sort_builtin_strings_bytewise() {
    let types = test_helpers::types();
    let a = PfString::new("pear apple Zebra fig").words(&types).unwrap();
    a.sort(None).unwrap();
    let sorted: Vec<String> = a
        .items()
        .iter()
        .filter_map(|v| v.as_string().map(PfString::to_string_lossy))
        .collect();
    assert_eq!(sorted, vec!["Zebra", "apple", "fig", "pear"]);
}

#[test]
fn sort_builtin_doubles() {
    let types = test_helpers::types();
    let a = Array::dim(&types, 0, test_helpers::DOUBLE).unwrap();
    for x in [2.5, -1.0, 0.0] {
        a.append(&types, Value::Double(x)).unwrap();
    }
    a.sort(None).unwrap();
    let sorted: Vec<f64> = a.items().iter().filter_map(Value::as_double).collect();
    assert_eq!(sorted, vec![-1.0, 0.0, 2.5]);
}

#[test]
fn sort_complex_needs_a_comparator() {
    let types = test_helpers::types();
    let a = Array::dim(&types, 2, POINT).unwrap();
    let err = a.sort(None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Need to supply a comparison function to sort array of complex type"
    );
}

#[test]
fn sort_with_comparator_is_stable() {
    let types = test_helpers::types();
    let nodes = Array::dim(&types, 0, NODE).unwrap();
    for (value, tag) in [(2, 0), (1, 1), (2, 2), (1, 3)] {
        let node = Object::new(&types, NODE).unwrap();
        node.set(&types, 0, Value::Int(value)).unwrap();
        // Tag each node by hanging a distinct-length chain off `next`.
        let mut tail = Value::Nil;
        for _ in 0..tag {
            let link = Object::new(&types, NODE).unwrap();
            link.set(&types, 1, tail).unwrap();
            tail = Value::from(link);
        }
        node.set(&types, 1, tail).unwrap();
        nodes.append(&types, Value::from(node)).unwrap();
    }
    let by_value = FuncRef::new("by_value", |slots| {
        let key = |v: &Value| {
            v.as_object()
                .and_then(|o| o.get(0).ok())
                .and_then(|v| v.as_int())
                .unwrap_or(0)
        };
        let diff = key(&slots[0]) - key(&slots[1]);
        slots[0] = Value::Int(diff);
        Ok(())
    });
    nodes.sort(Some(&by_value)).unwrap();

    let chain_len = |v: &Value| {
        let mut len = 0;
        let mut cur = v.as_object().and_then(|o| o.get(1).ok());
        while let Some(Value::Object(o)) = cur {
            len += 1;
            cur = o.get(1).ok();
        }
        len
    };
    let order: Vec<(i32, i32)> = nodes
        .items()
        .iter()
        .map(|v| {
            let value = v
                .as_object()
                .and_then(|o| o.get(0).ok())
                .and_then(|v| v.as_int())
                .unwrap_or(-1);
            (value, chain_len(v))
        })
        .collect();
    assert_eq!(order, vec![(1, 1), (1, 3), (2, 0), (2, 2)]);
}

#[test]
fn sort_reports_a_bad_comparator() {
    let a = int_array(&[2, 1]);
    let broken = FuncRef::new("broken", |slots| {
        slots[0] = Value::Nil;
        Ok(())
    });
    assert_eq!(
        a.sort(Some(&broken)).unwrap_err(),
        RtError::BadComparatorResult("nil")
    );
    assert_eq!(a.size(), 2);
}

#[test]
fn debug_shows_shape() {
    let a = int_array(&[1, 2]);
    let text = format!("{a:?}");
    assert!(text.starts_with("Array(of int @ 0x"));
    assert!(text.ends_with("size=2, rc=1)"));
}
