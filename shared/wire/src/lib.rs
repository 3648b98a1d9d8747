//! # Tether Wire
//! Byte-exact encoding primitives shared between the tether-server &
//! tether-client crates. All multi-byte values are big-endian; strings
//! are length-prefixed printable ASCII.

mod error;
mod reader;
mod wire;
mod writer;

pub use error::WireError;
pub use reader::WireReader;
pub use wire::Wire;
pub use writer::WireWriter;

/// Inclusive range of byte values a wire string may contain.
pub const ASCII_PRINTABLE_MIN: u8 = 0x20;
pub const ASCII_PRINTABLE_MAX: u8 = 0x7E;

pub(crate) fn is_printable_ascii(string: &str) -> bool {
    string
        .bytes()
        .all(|b| (ASCII_PRINTABLE_MIN..=ASCII_PRINTABLE_MAX).contains(&b))
}
