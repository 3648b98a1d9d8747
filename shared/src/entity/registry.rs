use log::warn;

use crate::{
    entity::id::NULL_INDEX, ComponentStorage, Entity, EntityId, EntitySubset, EventRegistry,
    SubsetKey, TickContext, ENTITY_INDEX_MAX,
};

/// One sparse-array slot. A live slot decodes to the entity's dense
/// index plus the generation its handles must carry; a free slot
/// instead threads the free list (next free index) and records the
/// generation to stamp on the slot's next occupant.
#[derive(Clone, Copy, Debug)]
enum Slot {
    Live { dense: u32, generation: u8 },
    Free { next: u32, generation: u8 },
}

struct EntityRecord {
    id: EntityId,
    entity: Box<dyn Entity>,
}

/// Owns the live entity list and the identifier lifecycle.
///
/// Lookup, insertion and removal are all O(1): the dense array holds
/// the entities gap-free, the sparse array maps slot index to dense
/// position, and removal is swap-with-last plus a free-list push.
/// Destruction during a tick is deferred to end-of-tick so in-progress
/// iteration never observes a shortened list.
pub struct EntityRegistry {
    sparse: Vec<Slot>,
    dense: Vec<EntityRecord>,
    free_head: u32,
    destroy_queue: Vec<EntityId>,
    subsets: Vec<EntitySubset>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            free_head: NULL_INDEX,
            destroy_queue: Vec::new(),
            subsets: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Assigns a fresh id (recycling a freed slot when one is
    /// available), takes ownership of the entity, expands its static
    /// event subscriptions, runs its add hook, and mirrors it into any
    /// matching subset.
    ///
    /// Re-adding an instance that already carries an id is a logged
    /// no-op returning the existing id.
    ///
    /// # Panics
    ///
    /// Panics if the entity's kind declares two listeners for the same
    /// event name (a configuration error), or if the 24-bit index space
    /// is exhausted.
    pub fn add_entity(
        &mut self,
        mut entity: Box<dyn Entity>,
        components: &mut ComponentStorage,
        events: &mut EventRegistry,
    ) -> EntityId {
        if let Some(existing) = entity.base().id() {
            warn!(
                "entity of kind {:?} already added as {:?}; ignoring",
                entity.kind(),
                existing
            );
            return existing;
        }

        let (index, generation) = self.allocate_slot();
        let id = EntityId::new(index, generation);
        entity.base_mut().assign_id(id);

        Self::subscribe_listeners(entity.as_ref(), index, events);

        let dense = self.dense.len() as u32;
        self.sparse[index as usize] = Slot::Live { dense, generation };
        self.dense.push(EntityRecord { id, entity });

        let mut ctx = TickContext::new(components, events);
        self.dense[dense as usize].entity.on_add(&mut ctx);
        self.destroy_queue.extend(ctx.take_destroyed());

        let record = &self.dense[dense as usize];
        for subset in &mut self.subsets {
            subset.offer(id, record.entity.as_ref());
        }

        id
    }

    fn allocate_slot(&mut self) -> (u32, u8) {
        if self.free_head != NULL_INDEX {
            let index = self.free_head;
            match self.sparse[index as usize] {
                Slot::Free { next, generation } => {
                    self.free_head = next;
                    (index, generation)
                }
                Slot::Live { .. } => panic!("corrupt free list: head slot {} is live", index),
            }
        } else {
            let index = self.sparse.len() as u32;
            if index > ENTITY_INDEX_MAX {
                panic!("entity index space exhausted ({} slots)", index);
            }
            self.sparse.push(Slot::Free {
                next: NULL_INDEX,
                generation: 0,
            });
            (index, 0)
        }
    }

    fn subscribe_listeners(entity: &dyn Entity, index: u32, events: &mut EventRegistry) {
        let listeners = entity.event_listeners();
        for (position, listener) in listeners.iter().enumerate() {
            for earlier in &listeners[..position] {
                if earlier.event == listener.event {
                    panic!(
                        "kind {:?} declares more than one listener for event {:?}",
                        entity.kind(),
                        listener.event
                    );
                }
            }
            events.subscribe(index, listener);
        }
    }

    /// O(1) lookup; `None` for a stale or never-valid handle.
    pub fn entity(&self, id: EntityId) -> Option<&dyn Entity> {
        let dense = self.dense_index(id)?;
        Some(self.dense[dense].entity.as_ref())
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut dyn Entity> {
        let dense = self.dense_index(id)?;
        Some(self.dense[dense].entity.as_mut())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.dense_index(id).is_some()
    }

    fn dense_index(&self, id: EntityId) -> Option<usize> {
        let slot = self.sparse.get(id.index() as usize)?;
        match *slot {
            Slot::Live { dense, generation } if generation == id.generation() => {
                Some(dense as usize)
            }
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &dyn Entity)> {
        self.dense
            .iter()
            .map(|record| (record.id, record.entity.as_ref()))
    }

    /// Queue an id for deferred removal. Nothing is mutated until the
    /// destruction flush at the end of `update`; queueing a stale id is
    /// harmless.
    pub fn queue_destroy(&mut self, id: EntityId) {
        self.destroy_queue.push(id);
    }

    /// Runs one simulation tick: pre-update event pass, `update` on
    /// every live entity in dense order, post-update event pass, then
    /// the deferred destruction flush. Returns the ids destroyed this
    /// tick, already removed from every subset.
    pub fn update(
        &mut self,
        dt: f32,
        components: &mut ComponentStorage,
        events: &mut EventRegistry,
    ) -> Vec<EntityId> {
        let mut ctx = TickContext::new(components, events);

        self.run_event_pass(&mut ctx);

        let mut cursor = 0;
        while cursor < self.dense.len() {
            self.dense[cursor].entity.update(dt, &mut ctx);
            cursor += 1;
        }

        self.run_event_pass(&mut ctx);

        self.destroy_queue.extend(ctx.take_destroyed());
        let destroyed = self.flush_destroyed(&mut ctx);

        for subset in &mut self.subsets {
            for id in &destroyed {
                subset.queue_remove(*id);
            }
            subset.flush();
        }

        destroyed
    }

    fn run_event_pass(&mut self, ctx: &mut TickContext) {
        while let Some(event) = ctx.events.pop_queued() {
            let bindings = ctx.events.bindings_for(&event.name);
            for binding in bindings {
                let Some(dense) = self.dense_index_by_slot(binding.entity_index) else {
                    continue;
                };
                let record = &mut self.dense[dense];
                (binding.handler)(record.entity.as_mut(), ctx, binding.extra, &event.args);
            }
        }
    }

    fn dense_index_by_slot(&self, index: u32) -> Option<usize> {
        match self.sparse.get(index as usize)? {
            Slot::Live { dense, .. } => Some(*dense as usize),
            Slot::Free { .. } => None,
        }
    }

    fn flush_destroyed(&mut self, ctx: &mut TickContext) -> Vec<EntityId> {
        let mut destroyed = Vec::new();
        while let Some(id) = self.destroy_queue.pop() {
            let Some(dense) = self.dense_index(id) else {
                warn!("destroy of stale id {:?} ignored", id);
                continue;
            };

            let mut record = self.dense.swap_remove(dense);

            // Fix up the sparse entry of whichever record got moved
            // into the vacated dense position.
            if dense < self.dense.len() {
                let moved = self.dense[dense].id;
                self.sparse[moved.index() as usize] = Slot::Live {
                    dense: dense as u32,
                    generation: moved.generation(),
                };
            }

            record.entity.on_destroy(ctx);
            self.destroy_queue.extend(ctx.take_destroyed());

            ctx.events.remove_entity(id.index());
            ctx.components.remove_all(id.index());

            self.sparse[id.index() as usize] = Slot::Free {
                next: self.free_head,
                generation: id.generation().wrapping_add(1),
            };
            self.free_head = id.index();

            destroyed.push(id);
        }
        destroyed
    }

    /// Immediate administrative teardown: destroys every live entity
    /// right now, bypassing the deferred queue. Never call mid-tick.
    pub fn clear(&mut self, components: &mut ComponentStorage, events: &mut EventRegistry) {
        let mut ctx = TickContext::new(components, events);
        for mut record in self.dense.drain(..) {
            record.entity.on_destroy(&mut ctx);
            ctx.events.remove_entity(record.id.index());
            ctx.components.remove_all(record.id.index());
            self.sparse[record.id.index() as usize] = Slot::Free {
                next: self.free_head,
                generation: record.id.generation().wrapping_add(1),
            };
            self.free_head = record.id.index();
        }
        self.destroy_queue.clear();
        for subset in &mut self.subsets {
            subset.clear();
        }
    }

    /// Registers a filtered view mirroring the registry. Membership is
    /// decided by the predicate when an entity is added; removal is
    /// driven by the registry's own destruction flush.
    pub fn create_subset(&mut self, filter: fn(&dyn Entity) -> bool) -> SubsetKey {
        let key = SubsetKey(self.subsets.len());
        let mut subset = EntitySubset::new(filter);
        for record in &self.dense {
            subset.offer(record.id, record.entity.as_ref());
        }
        self.subsets.push(subset);
        key
    }

    pub fn subset(&self, key: SubsetKey) -> Option<&EntitySubset> {
        self.subsets.get(key.0)
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
