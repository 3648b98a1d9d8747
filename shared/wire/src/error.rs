use thiserror::Error;

/// Errors produced while decoding an incoming buffer.
///
/// A `WireError` is fatal for the connection that produced the buffer,
/// never for the process: the caller drops the offending packet (or the
/// offending peer) and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The buffer ended before the value's declared width.
    #[error("buffer too short: needed {needed} more byte(s) at offset {offset}")]
    UnexpectedEnd { needed: usize, offset: usize },

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid boolean byte: {0:#04x}")]
    InvalidBool(u8),

    /// A decoded string contained a byte outside printable ASCII.
    #[error("string contains non-printable byte {byte:#04x} at index {index}")]
    NonPrintableString { byte: u8, index: usize },

    /// An enum discriminant had no matching variant.
    #[error("unknown {what} discriminant: {value}")]
    UnknownDiscriminant { what: &'static str, value: u8 },
}
