//! Tokenizing: whole-string splits into arrays and incremental `next_*`
//! scanners that return the piece plus the position to resume from.

use pf_types::TypeTable;

use super::{int_len, is_space, PfString};
use crate::array::Array;
use crate::error::RtError;

fn is_token_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Length of the token at the start of `bytes`: an identifier run, or a
/// single punctuation byte.
fn token_span(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(&c) if is_token_byte(c) => bytes.iter().take_while(|&&c| is_token_byte(c)).count(),
        Some(_) => 1,
        None => 0,
    }
}

fn word_span(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|&&c| !is_space(c)).count()
}

fn skip_space(bytes: &[u8], pos: usize) -> usize {
    pos + bytes[pos..].iter().take_while(|&&c| is_space(c)).count()
}

fn collect_spans(bytes: &[u8], span: fn(&[u8]) -> usize) -> Vec<PfString> {
    let mut out = Vec::new();
    let mut pos = skip_space(bytes, 0);
    while pos < bytes.len() {
        let len = span(&bytes[pos..]);
        out.push(PfString::new(&bytes[pos..pos + len]));
        pos = skip_space(bytes, pos + len);
    }
    out
}

impl PfString {
    /// Identifier runs and single punctuation bytes, white space dropped.
    pub fn tokens(&self, types: &TypeTable) -> Result<Array, RtError> {
        let parts = collect_spans(&self.bytes(), token_span);
        Array::from_strings(types, parts)
    }

    /// White-space separated words.
    pub fn words(&self, types: &TypeTable) -> Result<Array, RtError> {
        let parts = collect_spans(&self.bytes(), word_span);
        Array::from_strings(types, parts)
    }

    /// Lines without their terminators. A trailing newline does not start
    /// an extra empty line.
    pub fn lines(&self, types: &TypeTable) -> Result<Array, RtError> {
        let bytes = self.bytes();
        let body = bytes.strip_suffix(b"\n").unwrap_or(&bytes[..]);
        let parts = if bytes.is_empty() {
            Vec::new()
        } else {
            body.split(|&c| c == b'\n').map(PfString::new).collect()
        };
        drop(bytes);
        Array::from_strings(types, parts)
    }

    /// Split on `splitter`. A one-byte splitter keeps empty pieces,
    /// including a trailing one; with a longer splitter every byte of it
    /// is a separator.
    pub fn split(&self, types: &TypeTable, splitter: PfString) -> Result<Array, RtError> {
        let bytes = self.bytes();
        let seps = splitter.bytes();
        let parts = bytes
            .split(|c| seps.contains(c))
            .map(PfString::new)
            .collect();
        drop(bytes);
        Array::from_strings(types, parts)
    }

    fn next_span(&self, pos: i32, span: fn(&[u8]) -> usize) -> (Option<PfString>, i32) {
        let Some(start) = self.scan_start(pos) else {
            return (None, -1);
        };
        let bytes = self.bytes();
        let start = skip_space(&bytes, start);
        if start == bytes.len() {
            return (None, int_len(start));
        }
        let end = start + span(&bytes[start..]);
        (Some(PfString::new(&bytes[start..end])), int_len(end))
    }

    /// Token starting at or after `pos`, and the position just past it.
    pub fn next_token(&self, pos: i32) -> (Option<PfString>, i32) {
        self.next_span(pos, token_span)
    }

    /// Word starting at or after `pos`, and the position just past it.
    pub fn next_word(&self, pos: i32) -> (Option<PfString>, i32) {
        self.next_span(pos, word_span)
    }

    /// Line starting at `pos`, and the position of the next line.
    pub fn next_line(&self, pos: i32) -> (Option<PfString>, i32) {
        let Some(start) = self.scan_start(pos) else {
            return (None, -1);
        };
        let bytes = self.bytes();
        match bytes[start..].iter().position(|&c| c == b'\n') {
            Some(len) => (
                Some(PfString::new(&bytes[start..start + len])),
                int_len(start + len + 1),
            ),
            None => (Some(PfString::new(&bytes[start..])), int_len(bytes.len())),
        }
    }

    /// Unescape the quoted run starting at `pos`, whose first byte is the
    /// quote character. A quote preceded by a backslash is kept. Returns
    /// the contents and the position just past the closing quote.
    pub fn between_quotes(&self, pos: i32) -> Result<(PfString, i32), RtError> {
        let bytes = self.bytes();
        if bytes.is_empty() {
            return Err(RtError::EmptyQuoted);
        }
        let start = usize::try_from(pos)
            .ok()
            .filter(|&p| p < bytes.len())
            .ok_or_else(|| RtError::IndexOutOfRange {
                index: usize::try_from(pos).unwrap_or(usize::MAX),
                size: bytes.len(),
            })?;
        let quote = bytes[start];
        let mut out = Vec::new();
        let mut last = 0u8;
        for (i, &c) in bytes.iter().enumerate().skip(start + 1) {
            if c == quote {
                if last != b'\\' {
                    return Ok((PfString::new(out), int_len(i + 1)));
                }
                out.pop();
            }
            out.push(c);
            last = c;
        }
        Err(RtError::UnterminatedQuote(char::from(quote)))
    }
}
