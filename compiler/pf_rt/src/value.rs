//! Runtime values.
//!
//! A [`Value`] is what one slot of a paraflow frame, array or class
//! instance holds. Primitives are inline; heap objects are handles whose
//! clone and drop are the reference increment and decrement.

use std::fmt;
use std::rc::Rc;

use pf_stack::ensure_sufficient_stack;
use pf_types::{SingleType, TypeId, TypeTable};
use rustc_hash::FxHashSet;

use crate::array::Array;
use crate::dir::Dir;
use crate::error::RtError;
use crate::heap::ObjAddr;
use crate::object::Object;
use crate::string::PfString;

#[derive(Clone, Debug, Default)]
pub enum Value {
    /// A reference slot holding nothing.
    #[default]
    Nil,
    Bit(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(u8),
    String(PfString),
    Array(Array),
    Dir(Dir),
    Object(Object),
    Var(Box<Var>),
    Func(FuncRef),
}

/// A value tagged with its runtime type.
#[derive(Clone, Debug)]
pub struct Var {
    pub value: Value,
    pub ty: TypeId,
}

impl Drop for Var {
    fn drop(&mut self) {
        if matches!(
            self.value,
            Value::Array(_) | Value::Dir(_) | Value::Object(_) | Value::Var(_)
        ) {
            release_all(vec![std::mem::take(&mut self.value)]);
        }
    }
}

/// Drop `values` and everything only they keep alive, one object at a
/// time. Each object's children are moved onto the worklist before the
/// object itself is cleaned up, so nesting depth never reaches the stack.
pub(crate) fn release_all(mut pending: Vec<Value>) {
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(a) => a.detach_items(&mut pending),
            Value::Dir(d) => d.detach_values(&mut pending),
            Value::Object(o) => o.detach_fields(&mut pending),
            Value::Var(mut var) => pending.push(std::mem::take(&mut var.value)),
            other => drop(other),
        }
    }
}

type NativeFn = dyn Fn(&mut [Value]) -> Result<(), RtError>;

/// Callable reference.
///
/// Arguments arrive in the leading slots and the result is left in slot 0.
#[derive(Clone)]
pub struct FuncRef {
    name: Rc<str>,
    call: Rc<NativeFn>,
}

impl FuncRef {
    /// Wrap a native function. `name` is for diagnostics only.
    pub fn new(
        name: &str,
        call: impl Fn(&mut [Value]) -> Result<(), RtError> + 'static,
    ) -> Self {
        FuncRef {
            name: Rc::from(name),
            call: Rc::new(call),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the function over `slots`; the result is left in slot 0.
    pub fn call(&self, slots: &mut [Value]) -> Result<(), RtError> {
        (self.call)(slots)
    }

    pub fn ptr_eq(&self, other: &FuncRef) -> bool {
        Rc::ptr_eq(&self.call, &other.call)
    }
}

impl fmt::Debug for FuncRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FuncRef({})", self.name)
    }
}

impl Value {
    /// Zero fill for a slot of `kind`: zero for numbers, nil for references.
    pub fn zero(kind: SingleType) -> Value {
        match kind {
            SingleType::Bit => Value::Bit(false),
            SingleType::Byte => Value::Byte(0),
            SingleType::Short => Value::Short(0),
            SingleType::Int => Value::Int(0),
            SingleType::Long => Value::Long(0),
            SingleType::Float => Value::Float(0.0),
            SingleType::Double => Value::Double(0.0),
            SingleType::Char => Value::Char(0),
            SingleType::String
            | SingleType::Array
            | SingleType::List
            | SingleType::Dir
            | SingleType::Tree
            | SingleType::Var
            | SingleType::Class
            | SingleType::To
            | SingleType::Para
            | SingleType::Flow => Value::Nil,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bit(_) => "bit",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Dir(_) => "dir",
            Value::Object(_) => "object",
            Value::Var(_) => "var",
            Value::Func(_) => "function",
        }
    }

    /// Whether this value may be stored in a slot of `kind`.
    pub fn fits(&self, kind: SingleType) -> bool {
        match (self, kind) {
            (Value::Bit(_), SingleType::Bit)
            | (Value::Byte(_), SingleType::Byte)
            | (Value::Short(_), SingleType::Short)
            | (Value::Int(_), SingleType::Int)
            | (Value::Long(_), SingleType::Long)
            | (Value::Float(_), SingleType::Float)
            | (Value::Double(_), SingleType::Double)
            | (Value::Char(_), SingleType::Char)
            | (Value::String(_), SingleType::String)
            | (Value::Array(_), SingleType::Array)
            | (Value::Dir(_), SingleType::Dir)
            | (Value::Object(_), SingleType::Class)
            | (Value::Var(_), SingleType::Var) => true,
            (Value::Func(_), kind) => kind.is_function(),
            (Value::Nil, kind) => !kind.is_primitive(),
            _ => false,
        }
    }

    /// Whether this value may be stored in a slot of type `ty`.
    ///
    /// Beyond [`Value::fits`], an object must be of the slot's class or a
    /// subclass, and an array or directory must have the slot's element
    /// type.
    pub fn fits_type(&self, types: &TypeTable, ty: TypeId) -> Result<bool, RtError> {
        if !self.fits(types.kind(ty)?) {
            return Ok(false);
        }
        let fits = match self {
            Value::Object(o) => types.accepts(ty, o.class())?,
            Value::Array(a) => types.same_type(types.element(ty)?, a.el_type())?,
            Value::Dir(d) => types.same_type(types.element(ty)?, d.el_type())?,
            _ => true,
        };
        Ok(fits)
    }

    /// `self`, if it fits a slot of type `ty`.
    pub(crate) fn check_type(
        self,
        types: &TypeTable,
        ty: TypeId,
        context: &'static str,
    ) -> Result<Value, RtError> {
        if self.fits_type(types, ty)? {
            return Ok(self);
        }
        let kind = types.kind(ty)?;
        if !self.fits(kind) {
            return Err(RtError::TypeMismatch {
                context,
                expected: kind.keyword(),
                found: self.kind_name(),
            });
        }
        Err(RtError::WrongType {
            context,
            expected: types.display(ty).to_string(),
            found: self.type_name(types),
        })
    }

    /// Full type of a heap value, for error messages.
    fn type_name(&self, types: &TypeTable) -> String {
        match self {
            Value::Object(o) => types.display(o.class()).to_string(),
            Value::Array(a) => format!("array of {}", types.display(a.el_type())),
            Value::Dir(d) => format!("dir of {}", types.display(d.el_type())),
            other => other.kind_name().to_owned(),
        }
    }

    /// `value` tagged with its runtime type `ty`.
    pub fn var(value: Value, ty: TypeId) -> Value {
        Value::Var(Box::new(Var { value, ty }))
    }

    /// The empty reference.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Identity of the heap object this value refers to, if any.
    pub fn identity(&self) -> Option<ObjAddr> {
        match self {
            Value::String(s) => Some(s.addr()),
            Value::Array(a) => Some(a.addr()),
            Value::Dir(d) => Some(d.addr()),
            Value::Object(o) => Some(o.addr()),
            Value::Var(v) => v.value.identity(),
            _ => None,
        }
    }

    /// Reference count of the heap object this value refers to, if any.
    pub fn ref_count(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.ref_count()),
            Value::Array(a) => Some(a.ref_count()),
            Value::Dir(d) => Some(d.ref_count()),
            Value::Object(o) => Some(o.ref_count()),
            Value::Var(v) => v.value.ref_count(),
            _ => None,
        }
    }

    pub fn as_bit(&self) -> Option<bool> {
        match self {
            Value::Bit(b) => Some(*b),
            _ => None,
        }
    }

    /// The payload of an `int` value.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&PfString> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dir(&self) -> Option<&Dir> {
        match self {
            Value::Dir(d) => Some(d),
            _ => None,
        }
    }

    /// The handle of a class instance; `None` for nil and other kinds.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Structural equality.
    ///
    /// Two graphs are equal when they have the same shape and contents;
    /// identity is not compared. Cycles terminate: a pair of objects
    /// already under comparison is assumed equal.
    pub fn deep_eq(&self, other: &Value) -> bool {
        DeepEq::default().values(self, other)
    }
}

#[derive(Default)]
struct DeepEq {
    visiting: FxHashSet<(ObjAddr, ObjAddr)>,
}

impl DeepEq {
    fn values(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bit(x), Value::Bit(y)) => x == y,
            (Value::Byte(x), Value::Byte(y)) => x == y,
            (Value::Short(x), Value::Short(y)) => x == y,
            (Value::Int(x), Value::Int(y)) => x == y,
            (Value::Long(x), Value::Long(y)) => x == y,
            (Value::Float(x), Value::Float(y)) => x == y || (x.is_nan() && y.is_nan()),
            (Value::Double(x), Value::Double(y)) => x == y || (x.is_nan() && y.is_nan()),
            (Value::Char(x), Value::Char(y)) => x == y,
            (Value::String(x), Value::String(y)) => x.same(y),
            (Value::Array(x), Value::Array(y)) => {
                self.enter(x.addr(), y.addr(), |this| this.arrays(x, y))
            }
            (Value::Dir(x), Value::Dir(y)) => {
                self.enter(x.addr(), y.addr(), |this| this.dirs(x, y))
            }
            (Value::Object(x), Value::Object(y)) => {
                self.enter(x.addr(), y.addr(), |this| this.objects(x, y))
            }
            (Value::Var(x), Value::Var(y)) => x.ty == y.ty && self.values(&x.value, &y.value),
            (Value::Func(x), Value::Func(y)) => x.ptr_eq(y),
            _ => false,
        }
    }

    fn enter(
        &mut self,
        a: ObjAddr,
        b: ObjAddr,
        compare: impl FnOnce(&mut Self) -> bool,
    ) -> bool {
        if !self.visiting.insert((a, b)) {
            return true;
        }
        ensure_sufficient_stack(|| compare(self))
    }

    fn arrays(&mut self, a: &Array, b: &Array) -> bool {
        if a.el_kind() != b.el_kind() || a.size() != b.size() {
            return false;
        }
        let (left, right) = (a.items(), b.items());
        left.iter().zip(&right).all(|(x, y)| self.values(x, y))
    }

    fn dirs(&mut self, a: &Dir, b: &Dir) -> bool {
        if a.el_kind() != b.el_kind() || a.len() != b.len() {
            return false;
        }
        let (left, right) = (a.sorted_entries(), b.sorted_entries());
        left.iter()
            .zip(&right)
            .all(|((ka, va), (kb, vb))| ka == kb && self.values(va, vb))
    }

    fn objects(&mut self, a: &Object, b: &Object) -> bool {
        if a.class() != b.class() {
            return false;
        }
        let (left, right) = (a.fields(), b.fields());
        left.len() == right.len() && left.iter().zip(&right).all(|(x, y)| self.values(x, y))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bit(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Double(x)
    }
}

impl From<PfString> for Value {
    fn from(s: PfString) -> Self {
        Value::String(s)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Dir> for Value {
    fn from(d: Dir) -> Self {
        Value::Dir(d)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl From<Option<PfString>> for Value {
    fn from(s: Option<PfString>) -> Self {
        s.map_or(Value::Nil, Value::String)
    }
}
