use std::collections::HashMap;

use tether_shared::{
    ComponentStorage, Entity, EntityId, EntityRegistry, EventRegistry, KindId, Replica, Schema,
};

/// The authoritative replica set: one [`Replica`] per replicated
/// entity, plus the spawn/despawn bookkeeping the write phase drains.
///
/// Replicas live in a dense vec in spawn order so the packet stream is
/// deterministic; the map only resolves entity id to position.
pub struct HostWorld {
    replicas: Vec<Replica>,
    positions: HashMap<EntityId, usize>,
    pending_spawn: Vec<(KindId, EntityId)>,
    pending_despawn: Vec<(KindId, EntityId)>,
}

impl HostWorld {
    pub fn new() -> Self {
        Self {
            replicas: Vec::new(),
            positions: HashMap::new(),
            pending_spawn: Vec::new(),
            pending_despawn: Vec::new(),
        }
    }

    /// Registers the entity and mints its replica in one step. The
    /// spawn record is queued for the next write phase.
    ///
    /// # Panics
    ///
    /// Panics if the entity's kind is not in the schema; replicating
    /// a kind the remote side cannot name is a configuration error.
    pub fn spawn(
        &mut self,
        schema: &Schema,
        registry: &mut EntityRegistry,
        components: &mut ComponentStorage,
        events: &mut EventRegistry,
        entity: Box<dyn Entity>,
    ) -> EntityId {
        let kind_name = entity.kind();
        let Some(kind) = schema.kind_id(kind_name) else {
            panic!("spawn of kind {:?} which the schema never declared", kind_name);
        };

        let id = registry.add_entity(entity, components, events);
        if self.positions.contains_key(&id) {
            // add_entity returned an existing id (double add); the
            // replica already exists too.
            return id;
        }

        self.positions.insert(id, self.replicas.len());
        self.replicas.push(Replica::new(schema, kind, id));
        self.pending_spawn.push((kind, id));
        id
    }

    /// Drops the replica, queueing its despawn record. Spawn and
    /// despawn within one tick cancel out: nothing is sent.
    pub(crate) fn despawn(&mut self, id: EntityId) {
        let Some(position) = self.positions.remove(&id) else {
            return;
        };
        let replica = self.replicas.remove(position);
        for other in self.positions.values_mut() {
            if *other > position {
                *other -= 1;
            }
        }

        let unsent = self
            .pending_spawn
            .iter()
            .position(|(_, pending)| *pending == id);
        match unsent {
            Some(queued) => {
                self.pending_spawn.remove(queued);
            }
            None => self.pending_despawn.push((replica.kind(), id)),
        }
    }

    pub fn replica(&self, id: EntityId) -> Option<&Replica> {
        self.positions.get(&id).map(|at| &self.replicas[*at])
    }

    pub fn replica_mut(&mut self, id: EntityId) -> Option<&mut Replica> {
        let at = *self.positions.get(&id)?;
        Some(&mut self.replicas[at])
    }

    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Replica> {
        self.replicas.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Replica> {
        self.replicas.iter_mut()
    }

    pub(crate) fn is_pending_spawn(&self, id: EntityId) -> bool {
        self.pending_spawn.iter().any(|(_, pending)| *pending == id)
    }

    pub(crate) fn take_pending_spawn(&mut self) -> Vec<(KindId, EntityId)> {
        std::mem::take(&mut self.pending_spawn)
    }

    pub(crate) fn take_pending_despawn(&mut self) -> Vec<(KindId, EntityId)> {
        std::mem::take(&mut self.pending_despawn)
    }
}

impl Default for HostWorld {
    fn default() -> Self {
        Self::new()
    }
}
