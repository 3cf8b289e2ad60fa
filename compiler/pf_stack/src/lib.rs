//! Stack growth guard for recursive walks over runtime values.
//!
//! Printing, scanning, tuple construction and structural comparison all
//! recurse once per level of nesting in the value graph. An array of arrays
//! nested a few hundred thousand levels deep is legal data, so every such
//! walk wraps its recursive step in [`ensure_sufficient_stack`].
//!
//! Native targets grow the stack on demand through `stacker`. On wasm the
//! guard is a plain call.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn print_nested(&mut self, value: &Value, ty: TypeId) -> Result<(), RtError> {
///     ensure_sufficient_stack(|| self.print_body(value, ty))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// Wasm manages its own stack; call through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
