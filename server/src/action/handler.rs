use tether_shared::{
    ActionErrorCode, ComponentStorage, CorrelationId, Entity, EntityId, EntityRegistry,
    EventRegistry, FieldValue, Schema, UserId,
};

use crate::world::host_world::HostWorld;

/// Everything an attempt handler may touch while arbitrating one
/// request: the identity of the requesting user, the correlation id it
/// must be answered under, and mutable access to the simulation.
pub struct AttemptContext<'a> {
    pub user: UserId,
    pub correlation: CorrelationId,
    pub schema: &'a Schema,
    pub registry: &'a mut EntityRegistry,
    pub components: &'a mut ComponentStorage,
    pub events: &'a mut EventRegistry,
    pub world: &'a mut HostWorld,
}

impl<'a> AttemptContext<'a> {
    /// Spawns a replicated entity on behalf of the handler; identical
    /// to [`crate::Server::spawn_entity`].
    pub fn spawn_entity(&mut self, entity: Box<dyn Entity>) -> EntityId {
        self.world.spawn(
            self.schema,
            self.registry,
            self.components,
            self.events,
            entity,
        )
    }

    /// Queues a replicated entity for destruction at the end of the
    /// current tick.
    pub fn destroy_entity(&mut self, id: EntityId) {
        self.registry.queue_destroy(id);
    }
}

/// Server-side arbiter for one declared action.
///
/// The handler is the authority: it validates the request against
/// current server state and either performs the mutation (returning
/// the result values broadcast to other clients) or rejects it with a
/// typed error code. The originator's speculative state is settled by
/// the ack either way.
pub trait AttemptHandler {
    fn attempt_action(
        &mut self,
        ctx: &mut AttemptContext,
        args: &[FieldValue],
    ) -> Result<Vec<FieldValue>, ActionErrorCode>;
}
