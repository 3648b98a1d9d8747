use crate::{ComponentStorage, EntityId, EventRegistry};

/// Mutable world state handed to entity hooks and event handlers
/// during a tick.
///
/// Destruction requested through the context is deferred: ids are
/// collected here and flushed by the registry at end-of-tick, so code
/// iterating the live entity list never observes a shortened list.
pub struct TickContext<'a> {
    pub components: &'a mut ComponentStorage,
    pub events: &'a mut EventRegistry,
    destroyed: Vec<EntityId>,
}

impl<'a> TickContext<'a> {
    pub fn new(components: &'a mut ComponentStorage, events: &'a mut EventRegistry) -> Self {
        Self {
            components,
            events,
            destroyed: Vec::new(),
        }
    }

    /// Queue an entity for destruction at the end of the current tick.
    pub fn destroy(&mut self, id: EntityId) {
        self.destroyed.push(id);
    }

    pub(crate) fn take_destroyed(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.destroyed)
    }
}
