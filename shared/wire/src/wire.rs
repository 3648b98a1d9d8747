use crate::{WireError, WireReader, WireWriter};

/// A value with a fixed, self-describing wire encoding.
///
/// Implemented for the primitive types the protocol composes its
/// messages from. Schema-typed field values are encoded separately,
/// driven by their declared wire type, because their layout depends on
/// the schema rather than on the Rust type.
pub trait Wire: Sized {
    fn ser(&self, writer: &mut WireWriter);
    fn de(reader: &mut WireReader) -> Result<Self, WireError>;
}

macro_rules! impl_wire {
    ($type:ty, $write:ident, $read:ident) => {
        impl Wire for $type {
            fn ser(&self, writer: &mut WireWriter) {
                writer.$write(*self);
            }

            fn de(reader: &mut WireReader) -> Result<Self, WireError> {
                reader.$read()
            }
        }
    };
}

impl_wire!(u8, write_u8, read_u8);
impl_wire!(i8, write_i8, read_i8);
impl_wire!(u16, write_u16, read_u16);
impl_wire!(i16, write_i16, read_i16);
impl_wire!(u32, write_u32, read_u32);
impl_wire!(i32, write_i32, read_i32);
impl_wire!(u64, write_u64, read_u64);
impl_wire!(f32, write_f32, read_f32);
impl_wire!(f64, write_f64, read_f64);
impl_wire!(bool, write_bool, read_bool);

impl Wire for String {
    fn ser(&self, writer: &mut WireWriter) {
        writer.write_str16(self);
    }

    fn de(reader: &mut WireReader) -> Result<Self, WireError> {
        reader.read_str16()
    }
}

impl<T: Wire> Wire for Vec<T> {
    fn ser(&self, writer: &mut WireWriter) {
        if self.len() > u16::MAX as usize {
            panic!(
                "cannot encode {}-element array with a 16-bit length prefix",
                self.len()
            );
        }
        writer.write_u16(self.len() as u16);
        for element in self {
            element.ser(writer);
        }
    }

    fn de(reader: &mut WireReader) -> Result<Self, WireError> {
        let length = reader.read_u16()? as usize;
        let mut output = Vec::with_capacity(length.min(1024));
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }
}
