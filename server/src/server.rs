use std::collections::HashMap;

use log::{info, warn};

use tether_shared::{
    read_action_request, ActionAckFail, ActionAckSuccess, ActionDo, ActionErrorCode,
    ActionRequest, ActionRequestOutcome, ComponentStorage, CorrelationId, Entity, EntityDespawn,
    EntityId, EntityRegistry, EntitySpawn, EventRegistry, FieldValue, KindRegistration,
    PacketType, Replica, Schema, UserId, Wire, WireError, WireReader, WireWriter,
};

use crate::{
    action::{handler::AttemptContext, handler::AttemptHandler, registry::AttemptRegistry},
    error::ServerError,
    user::User,
    world::host_world::HostWorld,
};

/// The authoritative host. Owns the registry, the replica set and the
/// per-user packet buffers, and drives the tick:
///
/// 1. read phase — inbound packets drained per user in arrival order
/// 2. simulate — one registry update
/// 3. write phase — spawn, despawn and dirty-field update packets
///
/// That ordering is load-bearing: an action arriving before a tick is
/// arbitrated before any entity updates, so its effects replicate in
/// the same tick's write phase.
pub struct Server {
    schema: Schema,
    registry: EntityRegistry,
    components: ComponentStorage,
    events: EventRegistry,
    world: HostWorld,
    attempts: Vec<Option<Box<dyn AttemptHandler>>>,
    users: HashMap<UserId, User>,
    user_order: Vec<UserId>,
}

impl Server {
    /// Builds the server from the locked schema.
    ///
    /// # Panics
    ///
    /// Panics if any kind registration's field set disagrees with the
    /// schema, or if the attempt registry does not cover the action
    /// catalogue exactly. Both are configuration errors that must
    /// never survive to tick time.
    pub fn new(
        schema: Schema,
        registrations: &[KindRegistration],
        attempts: AttemptRegistry,
    ) -> Self {
        for registration in registrations {
            schema.validate_kind_fields(registration.name, registration.replicated_fields);
        }
        let attempts = attempts.finalize(&schema);

        Self {
            schema,
            registry: EntityRegistry::new(),
            components: ComponentStorage::new(),
            events: EventRegistry::new(),
            world: HostWorld::new(),
            attempts,
            users: HashMap::new(),
            user_order: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn components_mut(&mut self) -> &mut ComponentStorage {
        &mut self.components
    }

    pub fn events_mut(&mut self) -> &mut EventRegistry {
        &mut self.events
    }

    pub fn world(&self) -> &HostWorld {
        &self.world
    }

    // ---------- connections ----------

    /// Admits a user and queues their catch-up: one spawn record per
    /// live replica, plus one update record built from the lifetime
    /// mask for every replica that has replicated at least one field.
    pub fn connect_user(&mut self, user: UserId) {
        if self.users.contains_key(&user) {
            warn!("user {} connected twice; ignoring", user);
            return;
        }
        info!("user {} connected", user);
        self.users.insert(user, User::new());
        self.user_order.push(user);

        let mut catchup: Vec<Vec<u8>> = Vec::new();
        for replica in self.world.iter() {
            // A replica whose spawn record is still queued will reach
            // this user through the ordinary write phase.
            if self.world.is_pending_spawn(replica.entity()) {
                continue;
            }

            let mut writer = WireWriter::new();
            PacketType::Spawn.ser(&mut writer);
            EntitySpawn {
                kind: replica.kind(),
                entity: replica.entity(),
            }
            .ser(&mut writer);
            catchup.push(writer.to_bytes());

            if !replica.lifetime_mask().is_clear() {
                let mut writer = WireWriter::new();
                PacketType::Update.ser(&mut writer);
                replica.write_catchup(&self.schema, &mut writer);
                catchup.push(writer.to_bytes());
            }
        }

        if let Some(record) = self.users.get_mut(&user) {
            record.outbound.extend(catchup);
        }
    }

    /// Drops the user and both packet buffers. Nothing in flight is
    /// cancelled.
    pub fn disconnect_user(&mut self, user: UserId) {
        if self.users.remove(&user).is_none() {
            warn!("disconnect of unknown user {}; ignoring", user);
            return;
        }
        info!("user {} disconnected", user);
        self.user_order.retain(|other| *other != user);
    }

    /// Queues one inbound packet; processing happens in the read phase
    /// of the next tick.
    pub fn receive(&mut self, user: UserId, packet: Vec<u8>) -> Result<(), ServerError> {
        let Some(record) = self.users.get_mut(&user) else {
            return Err(ServerError::UnknownUser(user));
        };
        record.inbound.push_back(packet);
        Ok(())
    }

    /// Drains the user's outbound packets, oldest first.
    pub fn take_outgoing(&mut self, user: UserId) -> Result<Vec<Vec<u8>>, ServerError> {
        let Some(record) = self.users.get_mut(&user) else {
            return Err(ServerError::UnknownUser(user));
        };
        Ok(std::mem::take(&mut record.outbound))
    }

    // ---------- world ----------

    /// Spawns a replicated entity. The entity joins the registry now;
    /// its spawn record goes out in the next write phase.
    pub fn spawn_entity(&mut self, entity: Box<dyn Entity>) -> EntityId {
        self.world.spawn(
            &self.schema,
            &mut self.registry,
            &mut self.components,
            &mut self.events,
            entity,
        )
    }

    /// Queues a replicated entity for destruction at the end of the
    /// next tick. Stale ids are a logged no-op inside the registry.
    pub fn destroy_entity(&mut self, id: EntityId) {
        self.registry.queue_destroy(id);
    }

    pub fn replica_mut(&mut self, id: EntityId) -> Option<&mut Replica> {
        self.world.replica_mut(id)
    }

    // ---------- tick ----------

    pub fn tick(&mut self, dt: f32) {
        self.read_inbound();

        let destroyed = self
            .registry
            .update(dt, &mut self.components, &mut self.events);
        for id in destroyed {
            self.world.despawn(id);
        }

        self.write_outbound();
    }

    fn read_inbound(&mut self) {
        let order = self.user_order.clone();
        for user in order {
            loop {
                let Some(record) = self.users.get_mut(&user) else {
                    break;
                };
                let Some(packet) = record.inbound.pop_front() else {
                    break;
                };
                if let Err(error) = self.process_packet(user, &packet) {
                    // Connection-fatal, never process-fatal: the rest
                    // of this user's queue dies with the connection.
                    warn!("user {}: malformed packet ({}); disconnecting", user, error);
                    self.disconnect_user(user);
                    break;
                }
            }
        }
    }

    fn process_packet(&mut self, user: UserId, packet: &[u8]) -> Result<(), WireError> {
        let mut reader = WireReader::new(packet);
        match PacketType::de(&mut reader)? {
            PacketType::ActionRequest => self.process_action_request(user, &mut reader),
            other => {
                warn!(
                    "user {} sent server-bound packet of type {:?}; ignoring",
                    user, other
                );
                Ok(())
            }
        }
    }

    fn process_action_request(
        &mut self,
        user: UserId,
        reader: &mut WireReader,
    ) -> Result<(), WireError> {
        let request = match read_action_request(&self.schema, reader)? {
            ActionRequestOutcome::Known(request) => request,
            ActionRequestOutcome::UnknownAction {
                raw_action,
                correlation,
            } => {
                warn!(
                    "user {} requested unknown action {}; failing {}",
                    user, raw_action, correlation
                );
                self.send_ack_fail(user, raw_action, ActionErrorCode::UnknownAction, correlation);
                return Ok(());
            }
        };

        let slot = request.action.to_u8() as usize;
        let Some(mut handler) = self.attempts[slot].take() else {
            panic!("attempt handler slot {} vacated mid-dispatch", slot);
        };

        let verdict = {
            let mut ctx = AttemptContext {
                user,
                correlation: request.correlation,
                schema: &self.schema,
                registry: &mut self.registry,
                components: &mut self.components,
                events: &mut self.events,
                world: &mut self.world,
            };
            handler.attempt_action(&mut ctx, &request.args)
        };
        self.attempts[slot] = Some(handler);

        match verdict {
            Ok(results) => self.settle_success(user, &request, results),
            Err(code) => {
                self.send_ack_fail(user, request.action.to_u8(), code, request.correlation)
            }
        }
        Ok(())
    }

    fn settle_success(
        &mut self,
        originator: UserId,
        request: &ActionRequest,
        results: Vec<FieldValue>,
    ) {
        let declared = match self.schema.action(request.action) {
            Some(action) => action.results.len(),
            None => 0,
        };
        if results.len() != declared {
            panic!(
                "handler for action id {} returned {} result value(s); schema declares {}",
                request.action.to_u8(),
                results.len(),
                declared
            );
        }

        let mut writer = WireWriter::new();
        PacketType::ActionAckSuccess.ser(&mut writer);
        ActionAckSuccess {
            action: request.action,
            correlation: request.correlation,
            results: results.clone(),
        }
        .write(&self.schema, &mut writer);
        self.send(originator, writer.to_bytes());

        let mut writer = WireWriter::new();
        PacketType::ActionDo.ser(&mut writer);
        ActionDo {
            action: request.action,
            results,
        }
        .write(&self.schema, &mut writer);
        self.broadcast_except(originator, &writer.to_bytes());
    }

    fn send_ack_fail(
        &mut self,
        user: UserId,
        raw_action: u8,
        code: ActionErrorCode,
        correlation: CorrelationId,
    ) {
        let mut writer = WireWriter::new();
        PacketType::ActionAckFail.ser(&mut writer);
        ActionAckFail {
            raw_action,
            code,
            correlation,
        }
        .ser(&mut writer);
        self.send(user, writer.to_bytes());
    }

    fn write_outbound(&mut self) {
        for (kind, entity) in self.world.take_pending_spawn() {
            let mut writer = WireWriter::new();
            PacketType::Spawn.ser(&mut writer);
            EntitySpawn { kind, entity }.ser(&mut writer);
            self.broadcast(&writer.to_bytes());
        }

        for (kind, entity) in self.world.take_pending_despawn() {
            let mut writer = WireWriter::new();
            PacketType::Despawn.ser(&mut writer);
            EntityDespawn { kind, entity }.ser(&mut writer);
            self.broadcast(&writer.to_bytes());
        }

        let mut updates: Vec<Vec<u8>> = Vec::new();
        for replica in self.world.iter_mut() {
            if !replica.is_dirty() {
                continue;
            }
            let mut writer = WireWriter::new();
            PacketType::Update.ser(&mut writer);
            replica.write_update(&self.schema, &mut writer);
            updates.push(writer.to_bytes());
        }
        for packet in updates {
            self.broadcast(&packet);
        }
    }

    fn send(&mut self, user: UserId, packet: Vec<u8>) {
        if let Some(record) = self.users.get_mut(&user) {
            record.outbound.push(packet);
        }
    }

    fn broadcast(&mut self, packet: &[u8]) {
        for user in &self.user_order {
            if let Some(record) = self.users.get_mut(user) {
                record.outbound.push(packet.to_vec());
            }
        }
    }

    fn broadcast_except(&mut self, skip: UserId, packet: &[u8]) {
        for user in &self.user_order {
            if *user == skip {
                continue;
            }
            if let Some(record) = self.users.get_mut(user) {
                record.outbound.push(packet.to_vec());
            }
        }
    }
}
