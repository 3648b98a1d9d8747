use tether_wire::{WireError, WireReader, WireWriter};

use crate::FieldValue;

/// Declared encoding of one replicated field.
///
/// Every multi-byte encoding has a fixed declared width and
/// signedness; strings are length-prefixed printable ASCII; arrays are
/// length-prefixed and homogeneous; templates are named ordered sets
/// of further typed fields.
#[derive(Clone, Debug, PartialEq)]
pub enum WireType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
    /// 2D vector: a pair of the declared numeric subtype.
    Vec2(Box<WireType>),
    /// Printable-ASCII string, 8-bit length prefix.
    String8,
    /// Printable-ASCII string, 16-bit length prefix.
    String16,
    /// Homogeneous array, 16-bit length prefix.
    Array(Box<WireType>),
    /// Named nested template; fields encode in declared order.
    Template(Vec<(String, WireType)>),
}

impl WireType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            WireType::U8
                | WireType::I8
                | WireType::U16
                | WireType::I16
                | WireType::U32
                | WireType::I32
                | WireType::F32
                | WireType::F64
        )
    }

    /// The zero value a fresh replica starts from.
    pub fn default_value(&self) -> FieldValue {
        match self {
            WireType::U8 => FieldValue::U8(0),
            WireType::I8 => FieldValue::I8(0),
            WireType::U16 => FieldValue::U16(0),
            WireType::I16 => FieldValue::I16(0),
            WireType::U32 => FieldValue::U32(0),
            WireType::I32 => FieldValue::I32(0),
            WireType::F32 => FieldValue::F32(0.0),
            WireType::F64 => FieldValue::F64(0.0),
            WireType::Vec2(_) => FieldValue::Vec2(0.0, 0.0),
            WireType::String8 | WireType::String16 => FieldValue::String(String::new()),
            WireType::Array(_) => FieldValue::Array(Vec::new()),
            WireType::Template(fields) => {
                FieldValue::Template(fields.iter().map(|(_, t)| t.default_value()).collect())
            }
        }
    }

    /// Encodes `value` in this declared layout.
    ///
    /// # Panics
    ///
    /// Panics when the value's variant does not match the declared
    /// type. The schema was validated at startup, so a mismatch here is
    /// a local programming bug; writing it anyway would corrupt every
    /// byte that follows.
    pub fn write_value(&self, value: &FieldValue, writer: &mut WireWriter) {
        match (self, value) {
            (WireType::U8, FieldValue::U8(v)) => writer.write_u8(*v),
            (WireType::I8, FieldValue::I8(v)) => writer.write_i8(*v),
            (WireType::U16, FieldValue::U16(v)) => writer.write_u16(*v),
            (WireType::I16, FieldValue::I16(v)) => writer.write_i16(*v),
            (WireType::U32, FieldValue::U32(v)) => writer.write_u32(*v),
            (WireType::I32, FieldValue::I32(v)) => writer.write_i32(*v),
            (WireType::F32, FieldValue::F32(v)) => writer.write_f32(*v),
            (WireType::F64, FieldValue::F64(v)) => writer.write_f64(*v),
            (WireType::Vec2(subtype), FieldValue::Vec2(x, y)) => {
                subtype.write_numeric(*x, writer);
                subtype.write_numeric(*y, writer);
            }
            (WireType::String8, FieldValue::String(s)) => writer.write_str8(s),
            (WireType::String16, FieldValue::String(s)) => writer.write_str16(s),
            (WireType::Array(element), FieldValue::Array(values)) => {
                if values.len() > u16::MAX as usize {
                    panic!("array field of {} elements exceeds 16-bit length", values.len());
                }
                writer.write_u16(values.len() as u16);
                for value in values {
                    element.write_value(value, writer);
                }
            }
            (WireType::Template(fields), FieldValue::Template(values)) => {
                if fields.len() != values.len() {
                    panic!(
                        "template value has {} fields, declaration has {}",
                        values.len(),
                        fields.len()
                    );
                }
                for ((_, field_type), value) in fields.iter().zip(values) {
                    field_type.write_value(value, writer);
                }
            }
            (declared, value) => panic!(
                "field value {} does not match declared wire type {:?}",
                value.type_name(),
                declared
            ),
        }
    }

    fn write_numeric(&self, value: f64, writer: &mut WireWriter) {
        match self {
            WireType::U8 => writer.write_u8(value as u8),
            WireType::I8 => writer.write_i8(value as i8),
            WireType::U16 => writer.write_u16(value as u16),
            WireType::I16 => writer.write_i16(value as i16),
            WireType::U32 => writer.write_u32(value as u32),
            WireType::I32 => writer.write_i32(value as i32),
            WireType::F32 => writer.write_f32(value as f32),
            WireType::F64 => writer.write_f64(value),
            other => panic!("vector subtype {:?} is not numeric", other),
        }
    }

    /// Decodes one value in this declared layout.
    pub fn read_value(&self, reader: &mut WireReader) -> Result<FieldValue, WireError> {
        Ok(match self {
            WireType::U8 => FieldValue::U8(reader.read_u8()?),
            WireType::I8 => FieldValue::I8(reader.read_i8()?),
            WireType::U16 => FieldValue::U16(reader.read_u16()?),
            WireType::I16 => FieldValue::I16(reader.read_i16()?),
            WireType::U32 => FieldValue::U32(reader.read_u32()?),
            WireType::I32 => FieldValue::I32(reader.read_i32()?),
            WireType::F32 => FieldValue::F32(reader.read_f32()?),
            WireType::F64 => FieldValue::F64(reader.read_f64()?),
            WireType::Vec2(subtype) => {
                let x = subtype.read_numeric(reader)?;
                let y = subtype.read_numeric(reader)?;
                FieldValue::Vec2(x, y)
            }
            WireType::String8 => FieldValue::String(reader.read_str8()?),
            WireType::String16 => FieldValue::String(reader.read_str16()?),
            WireType::Array(element) => {
                let length = reader.read_u16()? as usize;
                let mut values = Vec::with_capacity(length.min(1024));
                for _ in 0..length {
                    values.push(element.read_value(reader)?);
                }
                FieldValue::Array(values)
            }
            WireType::Template(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for (_, field_type) in fields {
                    values.push(field_type.read_value(reader)?);
                }
                FieldValue::Template(values)
            }
        })
    }

    fn read_numeric(&self, reader: &mut WireReader) -> Result<f64, WireError> {
        Ok(match self {
            WireType::U8 => reader.read_u8()? as f64,
            WireType::I8 => reader.read_i8()? as f64,
            WireType::U16 => reader.read_u16()? as f64,
            WireType::I16 => reader.read_i16()? as f64,
            WireType::U32 => reader.read_u32()? as f64,
            WireType::I32 => reader.read_i32()? as f64,
            WireType::F32 => reader.read_f32()? as f64,
            WireType::F64 => reader.read_f64()?,
            other => panic!("vector subtype {:?} is not numeric", other),
        })
    }
}
