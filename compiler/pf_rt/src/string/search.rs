//! Substring search and delimited extraction.

use super::{int_len, PfString};

fn find_from(haystack: &[u8], needle: &[u8], start: usize) -> Option<usize> {
    if needle.is_empty() {
        return (start <= haystack.len()).then_some(start);
    }
    haystack
        .get(start..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| pos + start)
}

fn position(pos: Option<usize>) -> i32 {
    pos.map_or(-1, int_len)
}

impl PfString {
    /// Position of the first occurrence of `sub`, or -1.
    pub fn find(&self, sub: PfString) -> i32 {
        position(find_from(&self.bytes(), &sub.bytes(), 0))
    }

    /// Position of the first occurrence of `sub` at or after `start`, or -1.
    pub fn find_next(&self, sub: PfString, start: i32) -> i32 {
        let bytes = self.bytes();
        match usize::try_from(start) {
            Ok(start) if start < bytes.len() => position(find_from(&bytes, &sub.bytes(), start)),
            _ => -1,
        }
    }

    /// Position of the last occurrence of `sub`, or -1. An empty pattern
    /// never matches.
    pub fn find_last(&self, sub: PfString) -> i32 {
        let bytes = self.bytes();
        let needle = sub.bytes();
        if needle.is_empty() || needle.len() > bytes.len() {
            return -1;
        }
        position(bytes.windows(needle.len()).rposition(|w| w == &*needle))
    }

    pub fn starts_with(&self, prefix: PfString) -> bool {
        self.bytes().starts_with(&prefix.bytes())
    }

    pub fn ends_with(&self, suffix: PfString) -> bool {
        self.bytes().ends_with(&suffix.bytes())
    }

    /// Text between the first `start` marker and the `end` marker after it.
    pub fn between(&self, start: PfString, end: PfString) -> Option<PfString> {
        self.next_between(start, end, 0).0
    }

    /// Like [`between`](Self::between), searching from `pos`. Also returns
    /// the position of the end marker, or -1 when nothing was found.
    pub fn next_between(
        &self,
        start: PfString,
        end: PfString,
        pos: i32,
    ) -> (Option<PfString>, i32) {
        let bytes = self.bytes();
        let (open, close) = (start.bytes(), end.bytes());
        let Ok(pos) = usize::try_from(pos) else {
            return (None, -1);
        };
        if pos + open.len() + close.len() > bytes.len() {
            return (None, -1);
        }
        let Some(s) = find_from(&bytes, &open, pos) else {
            return (None, -1);
        };
        if s + open.len() + close.len() > bytes.len() {
            return (None, -1);
        }
        let s = s + open.len();
        match find_from(&bytes, &close, s) {
            Some(e) => (Some(PfString::new(&bytes[s..e])), int_len(e)),
            None => (None, -1),
        }
    }

    /// `pos` as an index, if it lies within `0..=size`.
    pub(super) fn scan_start(&self, pos: i32) -> Option<usize> {
        usize::try_from(pos).ok().filter(|&p| p <= self.size())
    }
}
