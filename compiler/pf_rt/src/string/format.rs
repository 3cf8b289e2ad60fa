//! Number formatting and `$name` template substitution.

use super::PfString;
use crate::error::RtError;

/// Format `n` right-aligned in at least `min_width` bytes, optionally
/// zero padded and with thousands separators.
pub fn int_string(n: i64, min_width: i32, zero_pad: bool, commas: bool) -> PfString {
    let width = usize::try_from(min_width).unwrap_or(0);
    let plain = if zero_pad {
        format!("{n:0width$}")
    } else {
        format!("{n:>width$}")
    };
    if !commas {
        return PfString::new(plain);
    }
    let bytes = plain.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() + bytes.len() / 3);
    let lead = match bytes.len() % 3 {
        0 => 3,
        n => n,
    };
    out.extend_from_slice(&bytes[..lead.min(bytes.len())]);
    for group in bytes[lead.min(bytes.len())..].chunks(3) {
        if out.last().is_some_and(u8::is_ascii_digit) {
            out.push(b',');
        }
        out.extend_from_slice(group);
    }
    PfString::new(out)
}

/// Format `x` with `after` decimals in at least `before + after + 1`
/// bytes. Scientific notation uses a signed two-digit exponent.
pub fn float_string(x: f64, before: i32, after: i32, scientific: bool) -> PfString {
    let precision = usize::try_from(after).unwrap_or(0);
    let width = usize::try_from(before.saturating_add(after).saturating_add(1)).unwrap_or(0);
    let body = if scientific {
        let raw = format!("{x:.precision$e}");
        match raw.split_once('e') {
            Some((mantissa, exp)) => {
                let exp: i32 = exp.parse().unwrap_or(0);
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
            }
            None => raw,
        }
    } else {
        format!("{x:.precision$}")
    };
    PfString::new(format!("{body:>width$}"))
}

/// Replace each `$name` or `$(expr)` in `template` with the next argument.
/// `$$` is a literal dollar sign and nil arguments render as `(nil)`.
pub fn substitute(template: PfString, args: Vec<Option<PfString>>) -> Result<PfString, RtError> {
    let text = template.bytes();
    let mut args = args.into_iter();
    let mut out = Vec::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        let c = text[i];
        if c != b'$' {
            out.push(c);
            i += 1;
            continue;
        }
        match text.get(i + 1) {
            Some(b'$') => {
                out.push(b'$');
                i += 2;
                continue;
            }
            Some(b'(') => {
                let close = text[i..]
                    .iter()
                    .position(|&c| c == b')')
                    .ok_or(RtError::Template("unclosed `$(`"))?;
                i += close + 1;
            }
            _ => {
                i += 1;
                while text.get(i).is_some_and(|&c| c.is_ascii_alphanumeric() || c == b'_') {
                    i += 1;
                }
            }
        }
        let arg = args
            .next()
            .ok_or(RtError::Template("fewer arguments than `$` variables"))?;
        match arg {
            Some(s) => out.extend_from_slice(&s.bytes()),
            None => out.extend_from_slice(b"(nil)"),
        }
    }
    if args.next().is_some() {
        return Err(RtError::Template("more arguments than `$` variables"));
    }
    Ok(PfString::new(out))
}
