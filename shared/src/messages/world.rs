use tether_wire::{Wire, WireError, WireReader, WireWriter};

use crate::{EntityId, KindId};

/// Wire notice that a replicated entity came into existence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySpawn {
    pub kind: KindId,
    pub entity: EntityId,
}

impl Wire for EntitySpawn {
    fn ser(&self, writer: &mut WireWriter) {
        self.kind.ser(writer);
        self.entity.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, WireError> {
        Ok(Self {
            kind: KindId::de(reader)?,
            entity: EntityId::de(reader)?,
        })
    }
}

/// Wire notice that a replicated entity was destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityDespawn {
    pub kind: KindId,
    pub entity: EntityId,
}

impl Wire for EntityDespawn {
    fn ser(&self, writer: &mut WireWriter) {
        self.kind.ser(writer);
        self.entity.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, WireError> {
        Ok(Self {
            kind: KindId::de(reader)?,
            entity: EntityId::de(reader)?,
        })
    }
}
