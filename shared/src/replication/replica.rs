use tether_wire::{Wire, WireError, WireReader, WireWriter};

use crate::{DiffMask, EntityId, FieldValue, KindId, Schema};

/// Replication state for one live entity instance: its current field
/// values in schema order, the dirty mask accumulated since the last
/// send, and the lifetime mask used to catch up late joiners.
pub struct Replica {
    kind: KindId,
    entity: EntityId,
    values: Vec<FieldValue>,
    dirty: DiffMask,
    lifetime: DiffMask,
}

impl Replica {
    /// Fresh replica with every field at its wire type's zero value.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is not in the schema; replicas are only created
    /// for kinds validated at startup.
    pub fn new(schema: &Schema, kind: KindId, entity: EntityId) -> Self {
        let Some(kind_schema) = schema.kind(kind) else {
            panic!("replica created for unknown kind id {}", kind.to_u8());
        };
        Self {
            kind,
            entity,
            values: kind_schema
                .fields
                .iter()
                .map(|field| field.wire.default_value())
                .collect(),
            dirty: DiffMask::new(),
            lifetime: DiffMask::new(),
        }
    }

    pub fn kind(&self) -> KindId {
        self.kind
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn field(&self, index: u8) -> Option<&FieldValue> {
        self.values.get(index as usize)
    }

    /// Mutates the field and marks its dirty bit in one call. This is
    /// the only mutation path on the authoritative side; there is no
    /// silent assignment that could forget to dirty the field.
    pub fn set_field(&mut self, index: u8, value: FieldValue) {
        self.values[index as usize] = value;
        self.dirty.set_bit(index);
    }

    /// Remote-side application of a received value: no dirty marking.
    pub fn apply_field(&mut self, index: u8, value: FieldValue) {
        self.values[index as usize] = value;
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_clear()
    }

    pub fn dirty_mask(&self) -> &DiffMask {
        &self.dirty
    }

    pub fn lifetime_mask(&self) -> &DiffMask {
        &self.lifetime
    }

    /// Serializes one update record driven by the dirty mask — the
    /// mask, not a recomputation, decides which fields are present.
    /// Afterwards the dirty mask is folded into the lifetime mask and
    /// cleared.
    ///
    /// The caller skips replicas whose mask is already clear; a clear
    /// mask means nothing is written for the entity this tick.
    pub fn write_update(&mut self, schema: &Schema, writer: &mut WireWriter) {
        let dirty = self.dirty;
        self.write_masked(schema, &dirty, writer);
        self.lifetime.or(&dirty);
        self.dirty.clear();
    }

    /// Serializes one catch-up record from the lifetime mask, for a
    /// client that joined after the changes happened. Leaves both
    /// masks untouched.
    pub fn write_catchup(&self, schema: &Schema, writer: &mut WireWriter) {
        let lifetime = self.lifetime;
        self.write_masked(schema, &lifetime, writer);
    }

    fn write_masked(&self, schema: &Schema, mask: &DiffMask, writer: &mut WireWriter) {
        let kind_schema = match schema.kind(self.kind) {
            Some(kind_schema) => kind_schema,
            None => panic!("replica kind id {} vanished from schema", self.kind.to_u8()),
        };
        self.kind.ser(writer);
        self.entity.ser(writer);
        mask.write(kind_schema.field_count(), writer);
        for field in mask.iter_set(kind_schema.field_count()) {
            kind_schema.fields[field as usize]
                .wire
                .write_value(&self.values[field as usize], writer);
        }
    }
}

/// A decoded update (or catch-up) record.
pub struct UpdateRecord {
    pub kind: KindId,
    pub entity: EntityId,
    /// `(field index, value)` pairs in ascending field order.
    pub fields: Vec<(u8, FieldValue)>,
}

/// Decodes one update record. The receiver re-derives field presence
/// from the transmitted mask; no field tags exist on the wire.
pub fn read_update(schema: &Schema, reader: &mut WireReader) -> Result<UpdateRecord, WireError> {
    let kind = KindId::de(reader)?;
    let entity = EntityId::de(reader)?;
    let Some(kind_schema) = schema.kind(kind) else {
        return Err(WireError::UnknownDiscriminant {
            what: "kind id",
            value: kind.to_u8(),
        });
    };
    let mask = DiffMask::read(kind_schema.field_count(), reader)?;
    let mut fields = Vec::new();
    for field in mask.iter_set(kind_schema.field_count()) {
        let value = kind_schema.fields[field as usize].wire.read_value(reader)?;
        fields.push((field, value));
    }
    Ok(UpdateRecord {
        kind,
        entity,
        fields,
    })
}
