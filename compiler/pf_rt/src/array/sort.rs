//! Stable in-place sorting.

use std::cmp::Ordering;

use pf_types::SingleType;

use super::Array;
use crate::error::RtError;
use crate::value::{FuncRef, Value};

fn compare_builtin(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bit(x), Value::Bit(y)) => x.cmp(y),
        (Value::Byte(x), Value::Byte(y)) => x.cmp(y),
        (Value::Short(x), Value::Short(y)) => x.cmp(y),
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Long(x), Value::Long(y)) => x.cmp(y),
        (Value::Float(x), Value::Float(y)) => x.total_cmp(y),
        (Value::Double(x), Value::Double(y)) => x.total_cmp(y),
        (Value::Char(x), Value::Char(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp_bytes(y),
        (Value::Nil, Value::Nil) => Ordering::Equal,
        (Value::Nil, _) => Ordering::Less,
        (_, Value::Nil) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn call_comparator(compare: &FuncRef, a: &Value, b: &Value) -> Result<Ordering, RtError> {
    let mut slots = [a.clone(), b.clone()];
    compare.call(&mut slots)?;
    match &slots[0] {
        Value::Int(n) => Ok(n.cmp(&0)),
        other => Err(RtError::BadComparatorResult(other.kind_name())),
    }
}

impl Array {
    /// Sort in place. Without a comparator only numbers, characters, bits
    /// and strings can be sorted.
    ///
    /// The comparator is called with the two elements in slots 0 and 1 and
    /// leaves a negative, zero or positive `int` in slot 0. The array reads
    /// as empty while the comparator runs.
    pub fn sort(&self, compare: Option<&FuncRef>) -> Result<(), RtError> {
        let kind = self.el_kind();
        let builtin = kind.is_integral() || kind.is_floating() || kind == SingleType::String;
        if compare.is_none() && !builtin {
            return Err(RtError::SortNeedsComparator);
        }
        let mut items = std::mem::take(&mut self.0.borrow_mut().items);
        let mut failure = None;
        match compare {
            None => items.sort_by(compare_builtin),
            Some(f) => items.sort_by(|a, b| {
                if failure.is_some() {
                    return Ordering::Equal;
                }
                call_comparator(f, a, b).unwrap_or_else(|err| {
                    failure = Some(err);
                    Ordering::Equal
                })
            }),
        }
        self.0.borrow_mut().items = items;
        failure.map_or(Ok(()), Err)
    }
}
