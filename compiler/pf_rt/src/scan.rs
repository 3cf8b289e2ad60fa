//! Reading the canonical text format back into values.
//!
//! Every string, array, directory and object gets the next `$N` id as
//! soon as it is opened, before its contents are read, so a back-reference
//! from inside an object to itself rebuilds the cycle.

use pf_stack::ensure_sufficient_stack;
use pf_types::{SingleType, TypeId, TypeTable};

use crate::array::Array;
use crate::dir::Dir;
use crate::error::RtError;
use crate::object::Object;
use crate::string::{is_space, PfString};
use crate::value::Value;

/// Parse exactly one value of type `ty` from `text`.
///
/// `text` is bytes: quoted strings may hold any byte, as printed by
/// [`crate::to_bytes`].
#[tracing::instrument(level = "trace", skip(types, text))]
pub fn scan_value<T: AsRef<[u8]> + ?Sized>(
    types: &TypeTable,
    text: &T,
    ty: TypeId,
) -> Result<Value, RtError> {
    let mut scanner = Scanner::new(types, text);
    let value = scanner.scan(ty)?;
    scanner.finish()?;
    Ok(value)
}

/// Values reaching this have been range checked by `Scanner::integer`.
fn narrow<T: TryFrom<i64> + Default>(n: i64) -> T {
    T::try_from(n).unwrap_or_default()
}

/// Number from an ASCII run already delimited by the caller.
fn parse_ascii<T: std::str::FromStr>(digits: &[u8]) -> Option<T> {
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Cursor over one text holding one or more values.
///
/// Values scanned by the same scanner share `$N` numbering.
pub struct Scanner<'a> {
    types: &'a TypeTable,
    text: &'a [u8],
    pos: usize,
    ids: Vec<Value>,
}

impl<'a> Scanner<'a> {
    /// Scanner positioned at the start of `text`, with no objects seen yet.
    pub fn new<T: AsRef<[u8]> + ?Sized>(types: &'a TypeTable, text: &'a T) -> Self {
        Scanner {
            types,
            text: text.as_ref(),
            pos: 0,
            ids: Vec::new(),
        }
    }

    /// Byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Scan the next value of type `ty`.
    pub fn scan(&mut self, ty: TypeId) -> Result<Value, RtError> {
        self.value(ty)
    }

    /// Check that only white space is left.
    pub fn finish(&mut self) -> Result<(), RtError> {
        self.skip_space();
        if self.pos < self.text.len() {
            return Err(self.error("Extra characters after value"));
        }
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> RtError {
        RtError::Scan {
            pos: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.get(self.pos).copied()
    }

    fn skip_space(&mut self) {
        while self.peek().is_some_and(is_space) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: u8, message: &'static str) -> Result<(), RtError> {
        self.skip_space();
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn eat_keyword(&mut self, word: &[u8]) -> bool {
        if self.text[self.pos..].starts_with(word) {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    fn register(&mut self, value: &Value) {
        self.ids.push(value.clone());
        tracing::trace!(id = self.ids.len(), pos = self.pos, "registered");
    }

    fn value(&mut self, ty: TypeId) -> Result<Value, RtError> {
        let kind = self.types.kind(ty)?;
        // A char may itself be white space.
        if kind != SingleType::Char {
            self.skip_space();
        }
        match kind {
            SingleType::Bit => Ok(Value::Bit(self.integer(kind)? != 0)),
            SingleType::Byte => self.integer(kind).map(|n| Value::Byte(narrow(n))),
            SingleType::Short => self.integer(kind).map(|n| Value::Short(narrow(n))),
            SingleType::Int => self.integer(kind).map(|n| Value::Int(narrow(n))),
            SingleType::Long => self.integer(kind).map(Value::Long),
            SingleType::Float => self.float().map(Value::Float),
            SingleType::Double => self.float().map(Value::Double),
            SingleType::Char => self.char().map(Value::Char),
            SingleType::String | SingleType::Array | SingleType::Dir | SingleType::Class => {
                if self.eat_keyword(b"nil") {
                    return Ok(Value::Nil);
                }
                if self.eat(b'$') {
                    return self.back_reference(ty);
                }
                ensure_sufficient_stack(|| match kind {
                    SingleType::String => self.string(),
                    SingleType::Array => self.array(ty),
                    SingleType::Dir => self.dir(ty),
                    _ => self.object(ty),
                })
            }
            SingleType::Var
            | SingleType::To
            | SingleType::Para
            | SingleType::Flow
            | SingleType::List
            | SingleType::Tree => Err(RtError::Unsupported { op: "scan", kind }),
        }
    }

    fn integer(&mut self, kind: SingleType) -> Result<i64, RtError> {
        let source = self.text;
        let start = self.pos;
        self.eat(b'-');
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let n: i64 = parse_ascii(&source[start..self.pos]).ok_or_else(|| {
            self.pos = start;
            self.error("Expecting number")
        })?;
        let fits = match kind {
            SingleType::Bit => (0..=1).contains(&n),
            SingleType::Byte => i8::try_from(n).is_ok(),
            SingleType::Short => i16::try_from(n).is_ok(),
            SingleType::Int => i32::try_from(n).is_ok(),
            _ => true,
        };
        if fits {
            Ok(n)
        } else {
            self.pos = start;
            Err(self.error(format!("{n} out of range for {kind}")))
        }
    }

    fn float<T: std::str::FromStr>(&mut self) -> Result<T, RtError> {
        let source = self.text;
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, b'-' | b'+' | b'.'))
        {
            self.pos += 1;
        }
        parse_ascii(&source[start..self.pos]).ok_or_else(|| {
            self.pos = start;
            self.error("Expecting number")
        })
    }

    fn char(&mut self) -> Result<u8, RtError> {
        let byte = self.peek().ok_or_else(|| self.error("Expecting character"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn back_reference(&mut self, ty: TypeId) -> Result<Value, RtError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits = String::from_utf8_lossy(&self.text[start..self.pos]).into_owned();
        let value = parse_ascii::<usize>(&self.text[start..self.pos])
            .and_then(|id| id.checked_sub(1))
            .and_then(|i| self.ids.get(i))
            .cloned()
            .ok_or_else(|| self.error(format!("Unknown back-reference ${digits}")))?;
        if value.fits_type(self.types, ty)? {
            Ok(value)
        } else {
            Err(self.error(format!(
                "Back-reference ${digits} is a {}, expecting {}",
                value.kind_name(),
                self.types.display(ty)
            )))
        }
    }

    /// Quoted bytes, escapes decoded.
    fn quoted(&mut self) -> Result<Vec<u8>, RtError> {
        let bytes = self.text;
        let quote = match self.peek() {
            Some(q @ (b'\'' | b'"')) => q,
            _ => return Err(self.error("Expecting quote")),
        };
        let start = self.pos;
        self.pos += 1;
        let mut out = Vec::new();
        loop {
            let Some(&c) = bytes.get(self.pos) else {
                self.pos = start;
                return Err(self.error("Unterminated string"));
            };
            self.pos += 1;
            if c == quote {
                return Ok(out);
            }
            if c != b'\\' {
                out.push(c);
                continue;
            }
            let Some(&escaped) = bytes.get(self.pos) else {
                self.pos = start;
                return Err(self.error("Unterminated string"));
            };
            self.pos += 1;
            out.push(match escaped {
                b'n' => b'\n',
                b'r' => b'\r',
                other => other,
            });
        }
    }

    fn string(&mut self) -> Result<Value, RtError> {
        let value = Value::String(PfString::new(self.quoted()?));
        self.register(&value);
        Ok(value)
    }

    /// After an item: `,` continues, `)` ends.
    fn more_items(&mut self) -> Result<bool, RtError> {
        self.skip_space();
        if self.eat(b',') {
            Ok(true)
        } else if self.eat(b')') {
            Ok(false)
        } else {
            Err(self.error("Expecting comma"))
        }
    }

    fn array(&mut self, ty: TypeId) -> Result<Value, RtError> {
        self.expect(b'(', "Expecting (")?;
        let el_type = self.types.element(ty)?;
        let array = Array::of_type(self.types, el_type, Vec::new(), 0)?;
        self.register(&Value::Array(array.clone()));
        self.skip_space();
        if !self.eat(b')') {
            loop {
                let item = self.value(el_type)?;
                array.append(self.types, item)?;
                if !self.more_items()? {
                    break;
                }
            }
        }
        Ok(Value::Array(array))
    }

    fn dir(&mut self, ty: TypeId) -> Result<Value, RtError> {
        self.expect(b'(', "Expecting (")?;
        let el_type = self.types.element(ty)?;
        let dir = Dir::new(self.types, 0, el_type)?;
        self.register(&Value::Dir(dir.clone()));
        self.skip_space();
        if !self.eat(b')') {
            loop {
                self.skip_space();
                let key = self.quoted()?;
                self.skip_space();
                if !(self.eat(b'@') || self.eat(b':')) {
                    return Err(self.error("Expecting @"));
                }
                let value = self.value(el_type)?;
                dir.insert_bytes(self.types, &key, value)?;
                if !self.more_items()? {
                    break;
                }
            }
        }
        Ok(Value::Dir(dir))
    }

    fn object(&mut self, ty: TypeId) -> Result<Value, RtError> {
        self.expect(b'(', "Expecting (")?;
        let types = self.types;
        let object = Object::new(types, ty)?;
        self.register(&Value::Object(object.clone()));
        let fields = types.fields(ty)?;
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.expect(b',', "Expecting comma")?;
            }
            let value = self.value(field.ty)?;
            object.set_unchecked(i, value);
        }
        self.expect(b')', "Expecting )")?;
        Ok(Value::Object(object))
    }
}
