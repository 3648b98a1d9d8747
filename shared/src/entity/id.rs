use std::fmt;

use tether_wire::{Wire, WireError, WireReader, WireWriter};

pub const ENTITY_INDEX_BITS: u32 = 24;

const INDEX_MASK: u32 = (1 << ENTITY_INDEX_BITS) - 1;

/// Highest usable slot index; the all-ones index is reserved to mean
/// "no entity" (the free-list terminator).
pub const ENTITY_INDEX_MAX: u32 = INDEX_MASK - 1;

pub(crate) const NULL_INDEX: u32 = INDEX_MASK;

/// A packed handle to a live entity: slot index in the low 24 bits,
/// generation in the high 8.
///
/// The generation is bumped every time a slot is freed, so a handle
/// captured before its entity died stops resolving the moment the slot
/// is recycled. The counter wraps mod 256: after 256 reuses of one slot
/// an old handle can alias a new entity. That bound is accepted and
/// deliberate; nothing widens it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(u32);

impl EntityId {
    pub const NULL: EntityId = EntityId(u32::MAX);

    pub fn new(index: u32, generation: u8) -> Self {
        debug_assert!(index <= ENTITY_INDEX_MAX);
        Self(index | ((generation as u32) << ENTITY_INDEX_BITS))
    }

    pub fn index(&self) -> u32 {
        self.0 & INDEX_MASK
    }

    pub fn generation(&self) -> u8 {
        (self.0 >> ENTITY_INDEX_BITS) as u8
    }

    pub fn is_null(&self) -> bool {
        self.index() == NULL_INDEX
    }

    pub fn to_raw(&self) -> u32 {
        self.0
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "EntityId(null)")
        } else {
            write!(f, "EntityId({}v{})", self.index(), self.generation())
        }
    }
}

impl Wire for EntityId {
    fn ser(&self, writer: &mut WireWriter) {
        writer.write_u32(self.0);
    }

    fn de(reader: &mut WireReader) -> Result<Self, WireError> {
        Ok(Self(reader.read_u32()?))
    }
}
