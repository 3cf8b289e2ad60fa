//! Reference-counted object model for paraflow programs.
//!
//! Every heap value (strings, arrays, directories, class instances) lives
//! behind a [`Heap`] handle. Cloning a handle is the reference increment,
//! dropping it is the decrement, and the last drop cleans the object up
//! and releases whatever it holds. Values are described by the
//! [`pf_types::TypeTable`]; tuple construction, printing and scanning all
//! walk that table.
//!
//! # Text Format
//!
//! [`print_value`] writes the canonical pickling syntax and [`scan_value`]
//! reads it back. Shared objects print once and are then referenced as
//! `$N`, so both sharing and cycles survive a round trip.
//!
//! # Thread Safety
//!
//! Handles use non-atomic counts and are `!Send`. A whole object graph
//! belongs to one thread. The type table itself is immutable and shared.

mod array;
mod dir;
mod error;
mod heap;
mod object;
mod print;
mod scan;
mod string;
mod tuple;
mod value;

#[cfg(test)]
mod test_helpers;

use std::sync::Once;

pub use array::Array;
pub use dir::Dir;
pub use error::RtError;
pub use heap::{cleanup_count, live_objects, Heap, HeapKind, ObjAddr};
pub use object::Object;
pub use print::{
    print_value, to_bytes, to_bytes_with, to_text, to_text_with, IdentityTable, PrintOptions,
    Printer,
};
pub use scan::{scan_value, Scanner};
pub use string::{float_string, int_string, is_space, substitute, PfString};
pub use tuple::{
    array_from_tuple, bit_array_from_tuple, byte_array_from_tuple, char_array_from_tuple,
    class_array_from_tuple, dir_from_tuple, double_array_from_tuple, float_array_from_tuple,
    int_array_from_tuple, long_array_from_tuple, short_array_from_tuple,
    string_array_from_tuple, tuple_to_class, var_array_from_tuple,
};
pub use value::{FuncRef, Value, Var};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber for runtime diagnostics.
///
/// Does nothing unless `RUST_LOG` is set, and only ever runs once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
