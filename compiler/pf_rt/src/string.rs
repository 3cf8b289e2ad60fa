//! Byte strings.
//!
//! A [`PfString`] is a reference-counted byte buffer. Literal constants are
//! borrowed from static storage (`allocated == 0`) and become owned the
//! first time something appends to them.
//!
//! Built-ins that take strings take them by value: the argument handle is
//! released when the call returns. The receiver is borrowed.

mod format;
mod search;
mod split;

use std::borrow::Cow;
use std::cell::Ref;
use std::cmp::Ordering;
use std::fmt;

use crate::error::RtError;
use crate::heap::{Heap, HeapKind, ObjAddr};

pub use format::{float_string, int_string, substitute};

/// Growth switches from doubling to linear steps at this size.
const LINEAR_GROWTH: usize = 64 * 1024;

pub(crate) struct StrBuf {
    bytes: Cow<'static, [u8]>,
    allocated: usize,
}

#[derive(Clone)]
pub struct PfString(Heap<StrBuf>);

/// C-locale `isspace`.
pub fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Clamp a byte count into the `int` range used by string positions.
pub(crate) fn int_len(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Clamp an `int` position into `0..=size`.
fn clamp_pos(pos: i32, size: usize) -> usize {
    usize::try_from(pos).map_or(0, |p| p.min(size))
}

impl PfString {
    fn from_buf(bytes: Cow<'static, [u8]>, allocated: usize) -> Self {
        PfString(Heap::new(HeapKind::String, StrBuf { bytes, allocated }))
    }

    /// Empty string with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_buf(Cow::Owned(Vec::with_capacity(capacity)), capacity)
    }

    /// Copy `bytes` into a new string.
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        let bytes = bytes.as_ref().to_vec();
        let allocated = bytes.len();
        Self::from_buf(Cow::Owned(bytes), allocated)
    }

    /// Wrap a literal without copying it.
    pub fn from_static(text: &'static str) -> Self {
        Self::from_buf(Cow::Borrowed(text.as_bytes()), 0)
    }

    pub fn from_int(n: i32) -> Self {
        Self::new(n.to_string())
    }

    pub fn from_long(n: i64) -> Self {
        Self::new(n.to_string())
    }

    pub fn from_float(x: f32) -> Self {
        Self::from_double(f64::from(x))
    }

    pub fn from_double(x: f64) -> Self {
        Self::new(format!("{x:.2}"))
    }

    /// Concatenate `parts` into one fresh string, skipping nil parts.
    pub fn concat(parts: impl IntoIterator<Item = Option<PfString>>) -> Self {
        let parts: Vec<PfString> = parts.into_iter().flatten().collect();
        let total = parts.iter().map(PfString::size).sum();
        let mut bytes = Vec::with_capacity(total);
        for part in &parts {
            bytes.extend_from_slice(&part.bytes());
        }
        Self::from_buf(Cow::Owned(bytes), total)
    }

    pub fn size(&self) -> usize {
        self.0.borrow().bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Reserved capacity; 0 for a borrowed constant.
    pub fn allocated(&self) -> usize {
        self.0.borrow().allocated
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.0.borrow().bytes, Cow::Borrowed(_))
    }

    /// Borrow the content. The borrow must end before the string is
    /// appended to.
    pub fn bytes(&self) -> Ref<'_, [u8]> {
        Ref::map(self.0.borrow(), |buf| &*buf.bytes)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes().to_vec()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    pub fn ref_count(&self) -> usize {
        self.0.ref_count()
    }

    /// Identity comparison; [`PfString::same`] compares content.
    pub fn ptr_eq(&self, other: &PfString) -> bool {
        self.0.ptr_eq(&other.0)
    }

    pub fn addr(&self) -> ObjAddr {
        self.0.addr()
    }

    /// Append `src` in place, growing geometrically.
    pub fn append(&self, src: Option<PfString>) {
        let Some(src) = src else {
            return;
        };
        let tail = src.to_vec();
        drop(src);
        let mut buf = self.0.borrow_mut();
        let new_size = buf.bytes.len() + tail.len();
        if new_size > buf.allocated {
            buf.allocated = if new_size <= LINEAR_GROWTH {
                new_size * 2
            } else {
                new_size + LINEAR_GROWTH
            };
        }
        let allocated = buf.allocated;
        let bytes = buf.bytes.to_mut();
        bytes.reserve_exact(allocated.saturating_sub(bytes.len()));
        bytes.extend_from_slice(&tail);
    }

    /// This string if nothing else holds it, otherwise a private copy.
    pub fn make_independent_copy(self) -> PfString {
        if self.ref_count() == 1 {
            self
        } else {
            let copy = self.to_vec();
            PfString::new(copy)
        }
    }

    pub fn dupe(&self) -> PfString {
        PfString::new(&*self.bytes())
    }

    /// First `n` bytes (clamped).
    pub fn first(&self, n: i32) -> PfString {
        let bytes = self.bytes();
        PfString::new(&bytes[..clamp_pos(n, bytes.len())])
    }

    /// Last `n` bytes (clamped).
    pub fn last(&self, n: i32) -> PfString {
        let bytes = self.bytes();
        let n = clamp_pos(n, bytes.len());
        PfString::new(&bytes[bytes.len() - n..])
    }

    /// `size` bytes starting at `start`, clamped to the string.
    pub fn middle(&self, start: i32, size: i32) -> Result<PfString, RtError> {
        if size < 0 {
            return Err(RtError::NegativeSize(size));
        }
        let bytes = self.bytes();
        let end = clamp_pos(start.saturating_add(size), bytes.len());
        let start = clamp_pos(start, bytes.len()).min(end);
        Ok(PfString::new(&bytes[start..end]))
    }

    /// Everything from `start` on (clamped).
    pub fn rest(&self, start: i32) -> PfString {
        let bytes = self.bytes();
        PfString::new(&bytes[clamp_pos(start, bytes.len())..])
    }

    pub fn upper(&self) -> PfString {
        PfString::new(self.bytes().to_ascii_uppercase())
    }

    pub fn lower(&self) -> PfString {
        PfString::new(self.bytes().to_ascii_lowercase())
    }

    /// Copy without leading or trailing white space.
    pub fn trim(&self) -> PfString {
        let bytes = self.bytes();
        let start = bytes.iter().position(|&c| !is_space(c)).unwrap_or(bytes.len());
        let end = bytes.iter().rposition(|&c| !is_space(c)).map_or(start, |e| e + 1);
        PfString::new(&bytes[start..end])
    }

    /// Left-justify in a field of `size` bytes, truncating or padding.
    pub fn fit_left(&self, size: i32) -> PfString {
        let size = usize::try_from(size).unwrap_or(0);
        let bytes = self.bytes();
        let mut out = bytes[..size.min(bytes.len())].to_vec();
        out.resize(size, b' ');
        PfString::new(out)
    }

    /// Right-justify in a field of `size` bytes, truncating or padding.
    pub fn fit_right(&self, size: i32) -> PfString {
        let size = usize::try_from(size).unwrap_or(0);
        let bytes = self.bytes();
        let keep = size.min(bytes.len());
        let mut out = vec![b' '; size - keep];
        out.extend_from_slice(&bytes[..keep]);
        PfString::new(out)
    }

    /// Count of white-space bytes starting at `pos`.
    pub fn leading_spaces(&self, pos: i32) -> i32 {
        let bytes = self.bytes();
        let start = clamp_pos(pos, bytes.len());
        int_len(bytes[start..].iter().take_while(|&&c| is_space(c)).count())
    }

    pub fn as_int(&self) -> Result<i32, RtError> {
        self.parse_number("int")
    }

    pub fn as_long(&self) -> Result<i64, RtError> {
        self.parse_number("long")
    }

    pub fn as_double(&self) -> Result<f64, RtError> {
        self.parse_number("double")
    }

    fn parse_number<T: std::str::FromStr>(&self, target: &'static str) -> Result<T, RtError> {
        let bytes = self.bytes();
        std::str::from_utf8(&bytes)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| RtError::BadNumber {
                text: String::from_utf8_lossy(&bytes).into_owned(),
                target,
            })
    }

    /// Byte-wise comparison of two live strings.
    pub fn cmp_bytes(&self, other: &PfString) -> Ordering {
        if self.ptr_eq(other) {
            return Ordering::Equal;
        }
        (*self.bytes()).cmp(&*other.bytes())
    }

    /// Nil-safe ordering: nil sorts before every string.
    pub fn compare(a: Option<PfString>, b: Option<PfString>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => a.cmp_bytes(&b),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
        }
    }

    /// Same object or same bytes.
    pub fn same(&self, other: &PfString) -> bool {
        self.ptr_eq(other) || *self.bytes() == *other.bytes()
    }

    /// Case-insensitive equality.
    pub fn same_word(&self, other: Option<PfString>) -> bool {
        other
            .as_ref()
            .is_some_and(|o| self.bytes().eq_ignore_ascii_case(&o.bytes()))
    }
}

/// Byte equality, like [`PfString::same`].
impl PartialEq for PfString {
    fn eq(&self, other: &PfString) -> bool {
        self.same(other)
    }
}

impl Eq for PfString {}

impl fmt::Debug for PfString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PfString({:?}, rc={})", self.to_string_lossy(), self.ref_count())
    }
}

impl fmt::Display for PfString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}
