use crate::is_printable_ascii;

/// A growable byte buffer for outgoing packet data.
///
/// All integers and floats are written big-endian. Strings come in an
/// 8-bit-length and a 16-bit-length variant; both are restricted to
/// printable ASCII, and writing anything else is a fatal assertion —
/// an out-of-range string on the sending side is a bug, not a
/// condition to recover from.
pub struct WireWriter {
    buffer: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(256),
        }
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn bytes_written(&self) -> usize {
        self.buffer.len()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buffer.push(value as u8);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(value as u8);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Short-string variant: one length byte.
    ///
    /// # Panics
    ///
    /// Panics if the string is longer than 255 bytes or contains a byte
    /// outside printable ASCII.
    pub fn write_str8(&mut self, string: &str) {
        if string.len() > u8::MAX as usize {
            panic!(
                "cannot encode {}-byte string with an 8-bit length prefix",
                string.len()
            );
        }
        if !is_printable_ascii(string) {
            panic!("cannot encode non-printable-ASCII string: {:?}", string);
        }
        self.write_u8(string.len() as u8);
        self.buffer.extend_from_slice(string.as_bytes());
    }

    /// Standard string variant: two length bytes.
    ///
    /// # Panics
    ///
    /// Panics if the string is longer than 65535 bytes or contains a
    /// byte outside printable ASCII.
    pub fn write_str16(&mut self, string: &str) {
        if string.len() > u16::MAX as usize {
            panic!(
                "cannot encode {}-byte string with a 16-bit length prefix",
                string.len()
            );
        }
        if !is_printable_ascii(string) {
            panic!("cannot encode non-printable-ASCII string: {:?}", string);
        }
        self.write_u16(string.len() as u16);
        self.buffer.extend_from_slice(string.as_bytes());
    }
}

impl Default for WireWriter {
    fn default() -> Self {
        Self::new()
    }
}
