//! Canonical text printing.
//!
//! ```text
//! value   := nil | $N | number | char | string | '(' items ')'
//! string  := '\'' escaped bytes '\''
//! items   := value (',' value)*              (arrays, classes)
//!          | string '@' value (',' ...)*      (directories, sorted by key)
//! ```
//!
//! With an identity table, the Nth distinct heap object met in a call
//! prints in full the first time and as `$N` afterwards, which keeps
//! sharing and makes cyclic graphs printable. Numbering follows first
//! encounter, parents before children.

use std::io;

use pf_stack::ensure_sufficient_stack;
use pf_types::{SingleType, TypeId, TypeTable};
use rustc_hash::FxHashMap;

use crate::array::Array;
use crate::dir::Dir;
use crate::error::RtError;
use crate::heap::ObjAddr;
use crate::object::Object;
use crate::string::PfString;
use crate::value::Value;

/// Knobs for one print call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PrintOptions {
    /// Six decimals for floating point instead of two.
    pub formal: bool,
    /// Number heap objects and print repeats as `$N`.
    pub identity: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            formal: false,
            identity: true,
        }
    }
}

/// Objects already printed in this call, by address.
#[derive(Debug, Default)]
pub struct IdentityTable {
    ids: FxHashMap<ObjAddr, u32>,
}

enum Visit {
    First,
    Repeat(u32),
}

impl IdentityTable {
    /// Empty table; ids start at 1.
    pub fn new() -> Self {
        IdentityTable::default()
    }

    /// Number of objects seen so far.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Id of an object already seen.
    pub fn get(&self, addr: ObjAddr) -> Option<u32> {
        self.ids.get(&addr).copied()
    }

    fn visit(&mut self, addr: ObjAddr) -> Visit {
        if let Some(&id) = self.ids.get(&addr) {
            return Visit::Repeat(id);
        }
        let id = u32::try_from(self.ids.len() + 1).unwrap_or(u32::MAX);
        self.ids.insert(addr, id);
        Visit::First
    }
}

/// Streaming printer over any byte sink.
///
/// Strings are byte buffers, so output is bytes too; nothing is re-encoded.
pub struct Printer<'a, W> {
    out: &'a mut W,
    types: &'a TypeTable,
    formal: bool,
    ids: Option<&'a mut IdentityTable>,
    ancestors: Vec<ObjAddr>,
}

impl<'a, W: io::Write> Printer<'a, W> {
    /// Printer writing to `out`. Without `ids` a cycle is an error.
    pub fn new(
        out: &'a mut W,
        types: &'a TypeTable,
        ids: Option<&'a mut IdentityTable>,
    ) -> Self {
        Printer {
            out,
            types,
            formal: false,
            ids,
            ancestors: Vec::new(),
        }
    }

    /// Six decimals for floating point.
    #[must_use]
    pub fn formal(mut self, formal: bool) -> Self {
        self.formal = formal;
        self
    }

    /// Print `value` as a value of type `ty`.
    pub fn print(&mut self, value: &Value, ty: TypeId) -> Result<(), RtError> {
        let kind = self.types.kind(ty)?;
        match (kind, value) {
            (kind, Value::Nil) if !kind.is_primitive() => self.out.write_all(b"nil")?,
            (SingleType::Bit, Value::Bit(b)) => write!(self.out, "{}", u8::from(*b))?,
            (SingleType::Byte, Value::Byte(n)) => write!(self.out, "{n}")?,
            (SingleType::Short, Value::Short(n)) => write!(self.out, "{n}")?,
            (SingleType::Int, Value::Int(n)) => write!(self.out, "{n}")?,
            (SingleType::Long, Value::Long(n)) => write!(self.out, "{n}")?,
            (SingleType::Float, Value::Float(x)) => self.float(f64::from(*x))?,
            (SingleType::Double, Value::Double(x)) => self.float(*x)?,
            (SingleType::Char, Value::Char(c)) => self.out.write_all(&[*c])?,
            (SingleType::String, Value::String(s)) => {
                self.composite(s.addr(), |p| p.string_body(s))?;
            }
            (SingleType::Array, Value::Array(a)) => {
                self.composite(a.addr(), |p| p.array_body(a))?;
            }
            (SingleType::Dir, Value::Dir(d)) => {
                self.composite(d.addr(), |p| p.dir_body(d))?;
            }
            (SingleType::Class, Value::Object(o)) => {
                self.composite(o.addr(), |p| p.object_body(o))?;
            }
            (SingleType::Var, Value::Var(var)) => self.print(&var.value, var.ty)?,
            (kind, Value::Func(_)) if kind.is_function() => {
                self.out.write_all(b"<function>")?;
            }
            (SingleType::List | SingleType::Tree, _) => {
                return Err(RtError::Unsupported { op: "print", kind });
            }
            (kind, other) => {
                return Err(RtError::TypeMismatch {
                    context: "print",
                    expected: kind.keyword(),
                    found: other.kind_name(),
                })
            }
        }
        Ok(())
    }

    fn float(&mut self, x: f64) -> io::Result<()> {
        if self.formal {
            write!(self.out, "{x:.6}")
        } else {
            write!(self.out, "{x:.2}")
        }
    }

    fn composite(
        &mut self,
        addr: ObjAddr,
        body: impl FnOnce(&mut Self) -> Result<(), RtError>,
    ) -> Result<(), RtError> {
        if let Some(ids) = self.ids.as_deref_mut() {
            if let Visit::Repeat(id) = ids.visit(addr) {
                write!(self.out, "${id}")?;
                return Ok(());
            }
            return ensure_sufficient_stack(|| body(self));
        }
        if self.ancestors.contains(&addr) {
            return Err(RtError::Cycle);
        }
        self.ancestors.push(addr);
        let result = ensure_sufficient_stack(|| body(self));
        self.ancestors.pop();
        result
    }

    fn string_body(&mut self, s: &PfString) -> Result<(), RtError> {
        write_quoted(self.out, &s.bytes())?;
        Ok(())
    }

    fn array_body(&mut self, array: &Array) -> Result<(), RtError> {
        let el_type = array.el_type();
        let items = array.borrow_items();
        self.out.write_all(b"(")?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.write_all(b",")?;
            }
            self.print(item, el_type)?;
        }
        self.out.write_all(b")")?;
        Ok(())
    }

    fn dir_body(&mut self, dir: &Dir) -> Result<(), RtError> {
        let el_type = dir.el_type();
        self.out.write_all(b"(")?;
        for (i, (key, value)) in dir.sorted_entries().iter().enumerate() {
            if i > 0 {
                self.out.write_all(b",")?;
            }
            write_quoted(self.out, key)?;
            self.out.write_all(b"@")?;
            self.print(value, el_type)?;
        }
        self.out.write_all(b")")?;
        Ok(())
    }

    fn object_body(&mut self, object: &Object) -> Result<(), RtError> {
        let types = self.types;
        let fields = types.fields(object.class())?;
        let values = object.borrow_fields();
        self.out.write_all(b"(")?;
        for (i, (field, value)) in fields.iter().zip(values.iter()).enumerate() {
            if i > 0 {
                self.out.write_all(b",")?;
            }
            self.print(value, field.ty)?;
        }
        self.out.write_all(b")")?;
        Ok(())
    }
}

/// Single-quoted string with `\n`, `\r`, `\\` and `\'` escaped. Other
/// bytes pass through untouched.
fn write_quoted<W: io::Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    out.write_all(b"'")?;
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let escaped: &[u8] = match b {
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\\' => b"\\\\",
            b'\'' => b"\\'",
            _ => continue,
        };
        out.write_all(&bytes[start..i])?;
        out.write_all(escaped)?;
        start = i + 1;
    }
    out.write_all(&bytes[start..])?;
    out.write_all(b"'")
}

/// Print `value` of type `ty` into `out`.
///
/// Pass an identity table to number shared objects; pass the same table
/// to several calls to share numbering between them. Without one, a cycle
/// is an error.
pub fn print_value<W: io::Write>(
    out: &mut W,
    types: &TypeTable,
    value: &Value,
    ty: TypeId,
    ids: Option<&mut IdentityTable>,
) -> Result<(), RtError> {
    Printer::new(out, types, ids).print(value, ty)
}

/// Print with default options into a fresh buffer.
pub fn to_bytes(types: &TypeTable, value: &Value, ty: TypeId) -> Result<Vec<u8>, RtError> {
    to_bytes_with(types, value, ty, PrintOptions::default())
}

#[tracing::instrument(level = "trace", skip(types, value))]
pub fn to_bytes_with(
    types: &TypeTable,
    value: &Value,
    ty: TypeId,
    options: PrintOptions,
) -> Result<Vec<u8>, RtError> {
    let mut out = Vec::new();
    let mut ids = IdentityTable::new();
    let ids = options.identity.then_some(&mut ids);
    Printer::new(&mut out, types, ids)
        .formal(options.formal)
        .print(value, ty)?;
    Ok(out)
}

/// Like [`to_bytes`], for values whose text is valid UTF-8.
pub fn to_text(types: &TypeTable, value: &Value, ty: TypeId) -> Result<String, RtError> {
    to_text_with(types, value, ty, PrintOptions::default())
}

/// Like [`to_bytes_with`]; fails with [`RtError::NotUtf8`] if a string
/// or character holds bytes that are not UTF-8.
pub fn to_text_with(
    types: &TypeTable,
    value: &Value,
    ty: TypeId,
    options: PrintOptions,
) -> Result<String, RtError> {
    let bytes = to_bytes_with(types, value, ty, options)?;
    String::from_utf8(bytes).map_err(|err| RtError::NotUtf8(err.utf8_error().valid_up_to()))
}

#[cfg(test)]
mod tests;
