use crate::{WireError, ASCII_PRINTABLE_MAX, ASCII_PRINTABLE_MIN};

/// A cursor over an incoming buffer.
///
/// Every read checks the remaining length first; a short buffer yields
/// [`WireError::UnexpectedEnd`] rather than a panic, so a malformed
/// packet only poisons its own connection.
pub struct WireReader<'b> {
    buffer: &'b [u8],
    cursor: usize,
}

impl<'b> WireReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    pub fn bytes_remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor >= self.buffer.len()
    }

    fn take(&mut self, count: usize) -> Result<&'b [u8], WireError> {
        if self.bytes_remaining() < count {
            return Err(WireError::UnexpectedEnd {
                needed: count - self.bytes_remaining(),
                offset: self.cursor,
            });
        }
        let slice = &self.buffer[self.cursor..self.cursor + count];
        self.cursor += count;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, WireError> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, WireError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_i16(&mut self) -> Result<i16, WireError> {
        let bytes = self.take(2)?;
        Ok(i16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64, WireError> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(raw))
    }

    pub fn read_f32(&mut self) -> Result<f32, WireError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, WireError> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(WireError::InvalidBool(other)),
        }
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'b [u8], WireError> {
        self.take(count)
    }

    pub fn read_str8(&mut self) -> Result<String, WireError> {
        let len = self.read_u8()? as usize;
        self.read_string_body(len)
    }

    pub fn read_str16(&mut self) -> Result<String, WireError> {
        let len = self.read_u16()? as usize;
        self.read_string_body(len)
    }

    fn read_string_body(&mut self, len: usize) -> Result<String, WireError> {
        let bytes = self.take(len)?;
        for (index, &byte) in bytes.iter().enumerate() {
            if !(ASCII_PRINTABLE_MIN..=ASCII_PRINTABLE_MAX).contains(&byte) {
                return Err(WireError::NonPrintableString { byte, index });
            }
        }
        // Validated above: printable ASCII is always valid UTF-8.
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
