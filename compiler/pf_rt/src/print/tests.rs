use super::*;
use crate::test_helpers::{
    self, ARRAY_OF_INT, ARRAY_OF_NODE, ARRAY_OF_POINT, ARRAY_OF_TO, BIT, CHAR, DIR_OF_INT,
    DIR_OF_STRING, DOUBLE, HOLDER, INT, NODE, PAIR, POINT, STRING, TO, VAR,
};
use crate::tuple::tuple_to_class;
use crate::value::FuncRef;
use pretty_assertions::assert_eq;

fn text(value: &Value, ty: TypeId) -> String {
    let types = test_helpers::types();
    to_text(&types, value, ty).unwrap()
}

fn ints(values: &[i32]) -> Value {
    let items = values.iter().copied().map(Value::Int).collect();
    let types = test_helpers::types();
    Value::from(Array::of_type(&types, INT, items, values.len()).unwrap())
}

// ── Scalars ─────────────────────────────────────────────────────────

#[test]
fn scalars() {
    assert_eq!(text(&Value::Int(-12), INT), "-12");
    assert_eq!(text(&Value::Bit(true), BIT), "1");
    assert_eq!(text(&Value::Char(b'x'), CHAR), "x");
    assert_eq!(text(&Value::Double(2.0), DOUBLE), "2.00");
}

#[test]
fn formal_mode_prints_six_decimals() {
    let types = test_helpers::types();
    let options = PrintOptions {
        formal: true,
        identity: true,
    };
    let out = to_text_with(&types, &Value::Double(0.5), DOUBLE, options).unwrap();
    assert_eq!(out, "0.500000");
}

#[test]
fn nil_references() {
    assert_eq!(text(&Value::Nil, STRING), "nil");
    assert_eq!(text(&Value::Nil, POINT), "nil");
    assert_eq!(text(&Value::Nil, ARRAY_OF_INT), "nil");
}

#[test]
fn strings_are_quoted_and_escaped() {
    let s = Value::from(PfString::new("it's a\\b\nc\rd"));
    assert_eq!(text(&s, STRING), r"'it\'s a\\b\nc\rd'");
}

#[test]
fn functions_print_a_placeholder() {
    let f = Value::Func(FuncRef::new("f", |_| Ok(())));
    assert_eq!(text(&f, TO), "<function>");
    let types = test_helpers::types();
    let fs = Array::of_type(&types, TO, vec![f.clone(), Value::Nil], 2).unwrap();
    assert_eq!(
        to_text(&types, &Value::from(fs), ARRAY_OF_TO).unwrap(),
        "(<function>,nil)"
    );
}

#[test]
fn var_prints_its_payload() {
    let v = Value::var(Value::Int(5), INT);
    assert_eq!(text(&v, VAR), "5");
    let s = Value::var(Value::from(PfString::new("s")), STRING);
    assert_eq!(text(&s, VAR), "'s'");
}

#[test]
fn mismatched_value_is_an_error() {
    let types = test_helpers::types();
    let err = to_text(&types, &Value::Long(1), INT).unwrap_err();
    assert_eq!(
        err,
        RtError::TypeMismatch {
            context: "print",
            expected: "int",
            found: "long",
        }
    );
    assert!(to_text(&types, &Value::Nil, INT).is_err());
}

// ── Composites ──────────────────────────────────────────────────────

#[test]
fn arrays_and_objects_use_parens() {
    assert_eq!(text(&ints(&[1, 2, 3]), ARRAY_OF_INT), "(1,2,3)");
    assert_eq!(text(&ints(&[]), ARRAY_OF_INT), "()");

    let types = test_helpers::types();
    let p = tuple_to_class(&types, vec![Value::Int(1), Value::Int(2)], POINT).unwrap();
    assert_eq!(to_text(&types, &Value::from(p), POINT).unwrap(), "(1,2)");
}

#[test]
fn directories_print_sorted() {
    let types = test_helpers::types();
    let d = Dir::new(&types, 2, INT).unwrap();
    d.insert(&types, PfString::new("b"), Value::Int(2)).unwrap();
    d.insert(&types, PfString::new("a"), Value::Int(1)).unwrap();
    assert_eq!(to_text(&types, &Value::from(d), DIR_OF_INT).unwrap(), "('a'@1,'b'@2)");
}

#[test]
fn holder_mixes_every_composite() {
    let types = test_helpers::types();
    let h = Object::new(&types, HOLDER).unwrap();
    h.set(&types, 0, Value::from(PfString::new("h"))).unwrap();
    h.set(&types, 1, ints(&[7])).unwrap();
    let tags = Dir::new(&types, 1, INT).unwrap();
    tags.insert(&types, PfString::new("k"), Value::Int(1)).unwrap();
    h.set(&types, 2, Value::from(tags)).unwrap();
    assert_eq!(
        to_text(&types, &Value::from(h), HOLDER).unwrap(),
        "('h',(7),('k'@1))"
    );
}

// ── Identity ────────────────────────────────────────────────────────

#[test]
fn shared_string_prints_once() {
    let types = test_helpers::types();
    let s = PfString::new("x");
    let pair = tuple_to_class(
        &types,
        vec![Value::from(s.clone()), Value::from(s)],
        PAIR,
    )
    .unwrap();
    assert_eq!(to_text(&types, &Value::from(pair), PAIR).unwrap(), "('x',$2)");
}

#[test]
fn numbering_is_parent_first() {
    let types = test_helpers::types();
    let p = tuple_to_class(&types, vec![Value::Int(1), Value::Int(2)], POINT).unwrap();
    let points = Array::of_type(&types, POINT, vec![Value::from(p.clone()), Value::from(p)], 2)
        .unwrap();
    assert_eq!(
        to_text(&types, &Value::from(points), ARRAY_OF_POINT).unwrap(),
        "((1,2),$2)"
    );
}

#[test]
fn self_cycle_prints_a_back_reference() {
    let types = test_helpers::types();
    let node = Object::new(&types, NODE).unwrap();
    node.set(&types, 0, Value::Int(1)).unwrap();
    node.set(&types, 1, Value::from(node.clone())).unwrap();
    assert_eq!(to_text(&types, &Value::from(node.clone()), NODE).unwrap(), "(1,$1)");
    node.set(&types, 1, Value::Nil).unwrap();
}

#[test]
fn without_identity_sharing_is_expanded_and_cycles_fail() {
    let types = test_helpers::types();
    let plain = PrintOptions {
        formal: false,
        identity: false,
    };
    let s = PfString::new("x");
    let pair = tuple_to_class(
        &types,
        vec![Value::from(s.clone()), Value::from(s)],
        PAIR,
    )
    .unwrap();
    assert_eq!(
        to_text_with(&types, &Value::from(pair), PAIR, plain).unwrap(),
        "('x','x')"
    );

    let node = Object::new(&types, NODE).unwrap();
    node.set(&types, 1, Value::from(node.clone())).unwrap();
    let nodes = Array::of_type(&types, NODE, vec![Value::from(node.clone())], 1).unwrap();
    assert_eq!(
        to_text_with(&types, &Value::from(nodes), ARRAY_OF_NODE, plain).unwrap_err(),
        RtError::Cycle
    );
    node.set(&types, 1, Value::Nil).unwrap();
}

#[test]
fn shared_identity_table_spans_calls() {
    let types = test_helpers::types();
    let s = Value::from(PfString::new("once"));
    let mut ids = IdentityTable::new();
    let mut out = Vec::new();
    print_value(&mut out, &types, &s, STRING, Some(&mut ids)).unwrap();
    out.push(b' ');
    print_value(&mut out, &types, &s, STRING, Some(&mut ids)).unwrap();
    assert_eq!(out, b"'once' $1");
    assert_eq!(ids.len(), 1);
    assert_eq!(ids.get(s.identity().unwrap()), Some(1));
}

#[test]
fn dir_of_strings_shares_values() {
    let types = test_helpers::types();
    let v = PfString::new("v");
    let d = Dir::new(&types, 2, STRING).unwrap();
    d.insert(&types, PfString::new("a"), Value::from(v.clone())).unwrap();
    d.insert(&types, PfString::new("b"), Value::from(v)).unwrap();
    assert_eq!(
        to_text(&types, &Value::from(d), DIR_OF_STRING).unwrap(),
        "('a'@'v','b'@$2)"
    );
}

// ── Bytes ───────────────────────────────────────────────────────────

#[test]
fn non_utf8_bytes_print_unchanged() {
    let types = test_helpers::types();
    let s = Value::from(PfString::new([0xff, b'a', b'\'']));
    assert_eq!(to_bytes(&types, &s, STRING).unwrap(), b"'\xffa\\''");
    assert_eq!(to_text(&types, &s, STRING).unwrap_err(), RtError::NotUtf8(1));
    assert_eq!(to_bytes(&types, &Value::Char(0xe9), CHAR).unwrap(), vec![0xe9]);
}

#[test]
fn non_utf8_dir_keys_print_unchanged() {
    let types = test_helpers::types();
    let d = Dir::new(&types, 1, INT).unwrap();
    d.insert_bytes(&types, &[0x80], Value::Int(1)).unwrap();
    assert_eq!(
        to_bytes(&types, &Value::from(d), DIR_OF_INT).unwrap(),
        b"('\x80'@1)"
    );
}
