//! Parser for the compiler's paren-code type encoding.
//!
//! ```text
//! node := digits [ '(' node ( ',' node )* ')' ]
//! ```
//!
//! Digits are a base-type id, parentheses hold children, commas separate
//! siblings. `"9(4)"` is base 9 with one child of base 4; `"15(16(4,9),16(4))"`
//! is a function whose input and output tuples are nested nodes.

use std::fmt;

use crate::error::TypeError;

/// Parsed, not yet interned, type tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeTree {
    pub base: u32,
    pub children: Vec<CodeTree>,
}

impl CodeTree {
    pub fn leaf(base: u32) -> Self {
        CodeTree {
            base,
            children: Vec::new(),
        }
    }

    /// Parse a complete code string.
    pub fn parse(code: &str) -> Result<CodeTree, TypeError> {
        let mut parser = CodeParser {
            code,
            bytes: code.as_bytes(),
            pos: 0,
        };
        let tree = parser.node()?;
        if parser.pos != parser.bytes.len() {
            return Err(parser.error("unexpected trailing characters"));
        }
        Ok(tree)
    }

    /// Canonical code string; `parse(tree.to_string()) == tree`.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CodeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if !self.children.is_empty() {
            f.write_str("(")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{child}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

struct CodeParser<'a> {
    code: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl CodeParser<'_> {
    fn error(&self, reason: &'static str) -> TypeError {
        TypeError::MalformedCode {
            code: self.code.to_string(),
            column: self.pos,
            reason,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn node(&mut self) -> Result<CodeTree, TypeError> {
        let base = self.digits()?;
        let mut tree = CodeTree::leaf(base);
        if self.peek() == Some(b'(') {
            self.pos += 1;
            loop {
                tree.children.push(self.node()?);
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b')') => {
                        self.pos += 1;
                        break;
                    }
                    Some(_) => return Err(self.error("expected `,` or `)`")),
                    None => return Err(self.error("unclosed `(`")),
                }
            }
        }
        Ok(tree)
    }

    fn digits(&mut self) -> Result<u32, TypeError> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(c @ b'0'..=b'9') = self.peek() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u32::from(c - b'0')))
                .ok_or_else(|| self.error("base type index too large"))?;
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected base type index"));
        }
        Ok(value)
    }
}
