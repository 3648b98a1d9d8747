//! # Tether Shared
//! Common functionality shared between tether-server & tether-client:
//! the generational entity registry, typed component storage, the
//! event subscription registry, the shared network-entity schema, and
//! the dirty-bit replication primitives built on top of it.

pub use tether_wire::{Wire, WireError, WireReader, WireWriter};

mod component;
mod entity;
mod event;
mod messages;
mod protocol;
mod replication;
mod schema;
mod types;
mod vec2;

pub use component::{
    kinds::{ComponentKinds, ComponentTypeId},
    storage::{ComponentListener, ComponentStorage, QueryKey},
};
pub use entity::{
    context::TickContext,
    entity::{Entity, EntityBase},
    id::{EntityId, ENTITY_INDEX_BITS, ENTITY_INDEX_MAX},
    registry::EntityRegistry,
    subset::{EntitySubset, SubsetKey},
};
pub use event::registry::{EventHandler, EventListener, EventRegistry, QueuedEvent};
pub use messages::{
    action::{
        read_action_request, ActionAckFail, ActionAckSuccess, ActionDo, ActionErrorCode,
        ActionRequest, ActionRequestOutcome, CorrelationId,
    },
    packet_type::PacketType,
    world::{EntityDespawn, EntitySpawn},
};
pub use protocol::Protocol;
pub use replication::{
    diff_mask::DiffMask,
    replica::{read_update, Replica, UpdateRecord},
};
pub use schema::{
    field_value::FieldValue,
    registration::KindRegistration,
    schema::{
        ActionId, ActionSchema, EventSchema, FieldSchema, KindId, KindSchema, Schema,
        MAX_REPLICATED_FIELDS,
    },
    wire_type::WireType,
};
pub use types::UserId;
pub use vec2::Vec2;
