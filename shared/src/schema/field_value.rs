/// A runtime value for one replicated field, event argument, or action
/// argument. The wire layout is not self-describing; it is driven
/// entirely by the field's declared [`WireType`](crate::WireType).
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    F32(f32),
    F64(f64),
    /// Pair of the declared numeric subtype. Stored widened; narrowed
    /// at encode time.
    Vec2(f64, f64),
    String(String),
    Array(Vec<FieldValue>),
    /// Positional values for a named nested template.
    Template(Vec<FieldValue>),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::U8(_) => "u8",
            FieldValue::I8(_) => "i8",
            FieldValue::U16(_) => "u16",
            FieldValue::I16(_) => "i16",
            FieldValue::U32(_) => "u32",
            FieldValue::I32(_) => "i32",
            FieldValue::F32(_) => "f32",
            FieldValue::F64(_) => "f64",
            FieldValue::Vec2(_, _) => "vec2",
            FieldValue::String(_) => "string",
            FieldValue::Array(_) => "array",
            FieldValue::Template(_) => "template",
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::U8(v) => Some(*v as f64),
            FieldValue::I8(v) => Some(*v as f64),
            FieldValue::U16(v) => Some(*v as f64),
            FieldValue::I16(v) => Some(*v as f64),
            FieldValue::U32(v) => Some(*v as f64),
            FieldValue::I32(v) => Some(*v as f64),
            FieldValue::F32(v) => Some(*v as f64),
            FieldValue::F64(v) => Some(*v),
            _ => None,
        }
    }
}
