use crate::{EntityId, EventListener, TickContext, Vec2};

/// Per-entity record data owned by the registry once the entity has
/// been added: the assigned id and the world position.
#[derive(Debug, Default)]
pub struct EntityBase {
    id: Option<EntityId>,
    pub position: Vec2,
}

impl EntityBase {
    pub fn new(position: Vec2) -> Self {
        Self { id: None, position }
    }

    /// The id assigned by the registry, or `None` before `add_entity`.
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

/// Behavior attached to a registry-owned entity.
///
/// `kind` names the entity's schema kind (or a purely-local kind name
/// that the schema never saw). The hooks run inside the owning tick;
/// anything they need beyond `self` arrives through the [`TickContext`].
pub trait Entity {
    fn base(&self) -> &EntityBase;
    fn base_mut(&mut self) -> &mut EntityBase;

    fn kind(&self) -> &'static str;

    fn on_add(&mut self, _ctx: &mut TickContext) {}

    fn update(&mut self, _dt: f32, _ctx: &mut TickContext) {}

    fn on_destroy(&mut self, _ctx: &mut TickContext) {}

    /// Static per-kind event subscriptions, expanded into live bindings
    /// at add time. At most one listener per event name per kind.
    fn event_listeners(&self) -> &'static [EventListener] {
        &[]
    }
}
