use std::collections::VecDeque;

use log::warn;

use tether_shared::{
    read_update, ActionAckFail, ActionAckSuccess, ActionDo, ActionErrorCode, ActionId,
    ActionRequest, CorrelationId, EntityDespawn, EntityId, EntitySpawn, FieldValue, KindId,
    PacketType, Schema, Wire, WireError, WireReader, WireWriter,
};

use crate::{
    prediction::{Predicted, PredictionManager, PredictionState},
    remote_world::RemoteWorld,
};

/// World and protocol changes surfaced to the application, in the
/// order the packets producing them were received.
#[derive(Debug)]
pub enum ClientEvent {
    Spawned {
        kind: KindId,
        entity: EntityId,
    },
    Despawned {
        kind: KindId,
        entity: EntityId,
    },
    Updated {
        kind: KindId,
        entity: EntityId,
        fields: Vec<u8>,
    },
    /// Another client's action succeeded; apply its results locally.
    DidAction {
        action: ActionId,
        results: Vec<FieldValue>,
    },
    Confirmed {
        correlation: CorrelationId,
        results: Vec<FieldValue>,
    },
    RolledBack {
        correlation: CorrelationId,
        code: ActionErrorCode,
    },
}

/// One connected client: the remote-world mirror, the prediction
/// bookkeeping, and the outbound request buffer.
pub struct Client {
    schema: Schema,
    remote: RemoteWorld,
    predictions: PredictionManager,
    outbound: Vec<Vec<u8>>,
    events: VecDeque<ClientEvent>,
}

impl Client {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            remote: RemoteWorld::new(),
            predictions: PredictionManager::new(),
            outbound: Vec::new(),
            events: VecDeque::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn remote(&self) -> &RemoteWorld {
        &self.remote
    }

    pub fn prediction_state(&self, correlation: CorrelationId) -> Option<PredictionState> {
        self.predictions.state(correlation)
    }

    /// Sends a speculative action request and registers its settlement
    /// hooks. The caller has already applied the local mutation; the
    /// returned correlation id identifies the prediction until the
    /// server's ack settles it.
    ///
    /// # Panics
    ///
    /// Panics if the action name is not in the schema — requesting an
    /// action the server cannot arbitrate is a configuration error.
    pub fn predict_action(
        &mut self,
        action: &str,
        args: Vec<FieldValue>,
        prediction: Box<dyn Predicted>,
    ) -> CorrelationId {
        let Some(action_id) = self.schema.action_id(action) else {
            panic!("prediction for action {:?} which the schema never declared", action);
        };
        let correlation = self.predictions.track(prediction);

        let mut writer = WireWriter::new();
        PacketType::ActionRequest.ser(&mut writer);
        ActionRequest {
            action: action_id,
            correlation,
            args,
        }
        .write(&self.schema, &mut writer);
        self.outbound.push(writer.to_bytes());

        correlation
    }

    /// Decodes one server packet, updating the mirror and queueing the
    /// resulting events. A `WireError` means this connection's stream
    /// is unusable; the caller should drop the connection.
    pub fn receive(&mut self, packet: &[u8]) -> Result<(), WireError> {
        let mut reader = WireReader::new(packet);
        match PacketType::de(&mut reader)? {
            PacketType::Spawn => {
                let spawn = EntitySpawn::de(&mut reader)?;
                self.remote.spawn(&self.schema, spawn.kind, spawn.entity)?;
                self.events.push_back(ClientEvent::Spawned {
                    kind: spawn.kind,
                    entity: spawn.entity,
                });
            }
            PacketType::Despawn => {
                let despawn = EntityDespawn::de(&mut reader)?;
                self.remote.despawn(despawn.entity);
                self.events.push_back(ClientEvent::Despawned {
                    kind: despawn.kind,
                    entity: despawn.entity,
                });
            }
            PacketType::Update => {
                let record = read_update(&self.schema, &mut reader)?;
                let kind = record.kind;
                let entity = record.entity;
                let fields = record.fields.iter().map(|(index, _)| *index).collect();
                self.remote.apply(record);
                self.events.push_back(ClientEvent::Updated {
                    kind,
                    entity,
                    fields,
                });
            }
            PacketType::ActionDo => {
                let done = ActionDo::read(&self.schema, &mut reader)?;
                self.events.push_back(ClientEvent::DidAction {
                    action: done.action,
                    results: done.results,
                });
            }
            PacketType::ActionAckSuccess => {
                let ack = ActionAckSuccess::read(&self.schema, &mut reader)?;
                if self.predictions.resolve_success(ack.correlation, &ack.results) {
                    self.events.push_back(ClientEvent::Confirmed {
                        correlation: ack.correlation,
                        results: ack.results,
                    });
                }
            }
            PacketType::ActionAckFail => {
                let ack = ActionAckFail::de(&mut reader)?;
                if self.predictions.resolve_fail(ack.correlation, ack.code) {
                    self.events.push_back(ClientEvent::RolledBack {
                        correlation: ack.correlation,
                        code: ack.code,
                    });
                }
            }
            PacketType::ActionRequest => {
                warn!("client-bound packet of type ActionRequest; ignoring");
            }
        }
        Ok(())
    }

    /// Drains the outbound request packets, oldest first.
    pub fn take_outgoing(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.outbound)
    }

    /// Drains the queued events, oldest first.
    pub fn take_events(&mut self) -> Vec<ClientEvent> {
        self.events.drain(..).collect()
    }
}
