use super::*;
use crate::string::PfString;
use crate::test_helpers::{self, HOLDER, LINE, NODE, PAIR, POINT, POINT3};
use pretty_assertions::assert_eq;

#[test]
fn new_zero_fills_every_field() {
    let types = test_helpers::types();
    let p = Object::new(&types, POINT).unwrap();
    assert_eq!(p.field_count(), 2);
    assert_eq!(p.get(0).unwrap().as_int(), Some(0));

    let h = Object::new(&types, HOLDER).unwrap();
    assert!(h.fields().iter().all(Value::is_nil));
}

#[test]
fn new_rejects_non_classes() {
    let types = test_helpers::types();
    assert!(Object::new(&types, test_helpers::INT).is_err());
}

#[test]
fn set_checks_field_kind_and_bounds() {
    let types = test_helpers::types();
    let p = Object::new(&types, POINT).unwrap();
    p.set(&types, 1, Value::Int(7)).unwrap();
    assert_eq!(p.get(1).unwrap().as_int(), Some(7));
    assert!(matches!(
        p.set(&types, 0, Value::Long(1)),
        Err(RtError::TypeMismatch { .. })
    ));
    assert_eq!(
        p.set(&types, 2, Value::Int(1)).unwrap_err(),
        RtError::IndexOutOfRange { index: 2, size: 2 }
    );
}

#[test]
fn set_checks_the_field_class() {
    let types = test_helpers::types();
    let line = Object::new(&types, LINE).unwrap();
    let node = Object::new(&types, NODE).unwrap();
    assert_eq!(
        line.set(&types, 0, Value::from(node)).unwrap_err(),
        RtError::WrongType {
            context: "field",
            expected: "point".to_owned(),
            found: "node".to_owned(),
        }
    );
    let point3 = Object::new(&types, POINT3).unwrap();
    line.set(&types, 1, Value::from(point3.clone())).unwrap();
    assert!(line.get(1).unwrap().as_object().unwrap().ptr_eq(&point3));
}

#[test]
fn set_checks_element_types_of_containers() {
    let types = test_helpers::types();
    let holder = Object::new(&types, HOLDER).unwrap();
    let strings = crate::Array::dim(&types, 0, test_helpers::STRING).unwrap();
    let err = holder.set(&types, 1, Value::from(strings)).unwrap_err();
    assert_eq!(err.to_string(), "field expects array of int, got array of string");
    let tags = crate::Dir::new(&types, 0, test_helpers::STRING).unwrap();
    let err = holder.set(&types, 2, Value::from(tags)).unwrap_err();
    assert_eq!(err.to_string(), "field expects dir of int, got dir of string");
}

#[test]
fn fields_by_name() {
    let types = test_helpers::types();
    let pair = Object::new(&types, PAIR).unwrap();
    pair.set_named(&types, "b", Value::from(PfString::new("bee")))
        .unwrap();
    assert_eq!(pair.field_index(&types, "b").unwrap(), 1);
    let b = pair.get_named(&types, "b").unwrap();
    assert_eq!(b.as_string().map(PfString::to_string_lossy), Some("bee".to_owned()));
    assert_eq!(
        pair.field_index(&types, "c").unwrap_err(),
        RtError::NoSuchField {
            class: "pair".to_owned(),
            name: "c".to_owned(),
        }
    );
}

#[test]
fn shared_field_values_are_counted() {
    let types = test_helpers::types();
    let s = PfString::new("shared");
    let pair = Object::new(&types, PAIR).unwrap();
    pair.set(&types, 0, Value::from(s.clone())).unwrap();
    pair.set(&types, 1, Value::from(s.clone())).unwrap();
    assert_eq!(s.ref_count(), 3);
    drop(pair);
    assert_eq!(s.ref_count(), 1);
}

#[test]
fn class_is_remembered() {
    let types = test_helpers::types();
    let p = Object::new(&types, POINT).unwrap();
    assert_eq!(p.class(), POINT);
    assert!(format!("{p:?}").starts_with("Object(#5 @ 0x"));
}
