use tether_wire::{WireError, WireReader, WireWriter};

use crate::MAX_REPLICATED_FIELDS;

/// One bit per declared replicated field, in the schema's sorted field
/// order. Bit N set means field N changed since the mask was last
/// cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffMask {
    bits: u64,
}

impl DiffMask {
    pub fn new() -> Self {
        Self { bits: 0 }
    }

    pub fn set_bit(&mut self, field: u8) {
        debug_assert!((field as usize) < MAX_REPLICATED_FIELDS);
        self.bits |= 1 << field;
    }

    pub fn clear_bit(&mut self, field: u8) {
        self.bits &= !(1 << field);
    }

    pub fn bit(&self, field: u8) -> bool {
        self.bits & (1 << field) != 0
    }

    pub fn or(&mut self, other: &DiffMask) {
        self.bits |= other.bits;
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }

    pub fn is_clear(&self) -> bool {
        self.bits == 0
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Indices of the set bits, ascending — the order dirty fields are
    /// written in.
    pub fn iter_set(&self, field_count: u8) -> impl Iterator<Item = u8> + '_ {
        (0..field_count).filter(|field| self.bit(*field))
    }

    fn byte_width(field_count: u8) -> usize {
        (field_count as usize + 7) / 8
    }

    /// Writes `ceil(field_count / 8)` mask bytes, low byte first. This
    /// is the parallel "which fields changed" signal the receiver uses
    /// to re-derive field presence.
    pub fn write(&self, field_count: u8, writer: &mut WireWriter) {
        for byte in 0..Self::byte_width(field_count) {
            writer.write_u8((self.bits >> (byte * 8)) as u8);
        }
    }

    pub fn read(field_count: u8, reader: &mut WireReader) -> Result<Self, WireError> {
        let mut bits: u64 = 0;
        for byte in 0..Self::byte_width(field_count) {
            bits |= (reader.read_u8()? as u64) << (byte * 8);
        }
        Ok(Self { bits })
    }
}
