use std::collections::HashMap;

use log::warn;

use tether_shared::{EntityId, FieldValue, KindId, Replica, Schema, UpdateRecord, WireError};

/// Client-side mirror of the server's replica set.
///
/// Values are applied exactly as received; nothing here marks dirty
/// bits, because the client is never the authority for these fields.
pub struct RemoteWorld {
    replicas: HashMap<EntityId, Replica>,
}

impl RemoteWorld {
    pub fn new() -> Self {
        Self {
            replicas: HashMap::new(),
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.replicas.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }

    pub fn replica(&self, id: EntityId) -> Option<&Replica> {
        self.replicas.get(&id)
    }

    /// Convenience lookup of one field's current mirrored value.
    /// `None` for an unmirrored entity or an out-of-range field index.
    pub fn field(&self, id: EntityId, index: u8) -> Option<&FieldValue> {
        self.replicas
            .get(&id)
            .and_then(|replica| replica.field(index))
    }

    /// Mirrors a newly spawned entity. A kind id the schema never
    /// declared means the stream cannot be trusted past this record,
    /// so it surfaces as a decode error rather than a mirror entry.
    pub(crate) fn spawn(
        &mut self,
        schema: &Schema,
        kind: KindId,
        entity: EntityId,
    ) -> Result<(), WireError> {
        if schema.kind(kind).is_none() {
            return Err(WireError::UnknownDiscriminant {
                what: "kind id",
                value: kind.to_u8(),
            });
        }
        if self.replicas.contains_key(&entity) {
            warn!("spawn for already-mirrored entity {:?}; ignoring", entity);
            return Ok(());
        }
        self.replicas.insert(entity, Replica::new(schema, kind, entity));
        Ok(())
    }

    pub(crate) fn despawn(&mut self, entity: EntityId) {
        if self.replicas.remove(&entity).is_none() {
            warn!("despawn for unmirrored entity {:?}; ignoring", entity);
        }
    }

    /// Applies one decoded update record. A record for an entity this
    /// mirror never saw spawn is dropped with a warning; the packet
    /// was already fully decoded, so the stream stays aligned.
    pub(crate) fn apply(&mut self, record: UpdateRecord) {
        let Some(replica) = self.replicas.get_mut(&record.entity) else {
            warn!("update for unmirrored entity {:?}; ignoring", record.entity);
            return;
        };
        for (index, value) in record.fields {
            replica.apply_field(index, value);
        }
    }
}

impl Default for RemoteWorld {
    fn default() -> Self {
        Self::new()
    }
}
