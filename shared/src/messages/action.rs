use std::fmt;

use tether_wire::{Wire, WireError, WireReader, WireWriter};

use crate::{ActionId, FieldValue, Schema};

/// Client-minted integer linking a speculative action to the server's
/// eventual answer. Incrementing, never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CorrelationId(pub u32);

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Wire for CorrelationId {
    fn ser(&self, writer: &mut WireWriter) {
        writer.write_u32(self.0);
    }

    fn de(reader: &mut WireReader) -> Result<Self, WireError> {
        Ok(Self(reader.read_u32()?))
    }
}

/// Typed reason an action attempt was rejected. The protocol carries
/// no human-readable error text; the client decides what to show for
/// each code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionErrorCode {
    UnknownAction,
    OutOfAmmo,
    OnCooldown,
    NotAuthorized,
    InvalidTarget,
}

impl ActionErrorCode {
    fn to_u8(self) -> u8 {
        match self {
            ActionErrorCode::UnknownAction => 0,
            ActionErrorCode::OutOfAmmo => 1,
            ActionErrorCode::OnCooldown => 2,
            ActionErrorCode::NotAuthorized => 3,
            ActionErrorCode::InvalidTarget => 4,
        }
    }
}

impl Wire for ActionErrorCode {
    fn ser(&self, writer: &mut WireWriter) {
        writer.write_u8(self.to_u8());
    }

    fn de(reader: &mut WireReader) -> Result<Self, WireError> {
        match reader.read_u8()? {
            0 => Ok(ActionErrorCode::UnknownAction),
            1 => Ok(ActionErrorCode::OutOfAmmo),
            2 => Ok(ActionErrorCode::OnCooldown),
            3 => Ok(ActionErrorCode::NotAuthorized),
            4 => Ok(ActionErrorCode::InvalidTarget),
            value => Err(WireError::UnknownDiscriminant {
                what: "action error code",
                value,
            }),
        }
    }
}

/// `[action id][correlation id][arg values]` — the client's half of a
/// speculative action. Argument layout comes from the action's schema.
pub struct ActionRequest {
    pub action: ActionId,
    pub correlation: CorrelationId,
    pub args: Vec<FieldValue>,
}

impl ActionRequest {
    /// # Panics
    ///
    /// Panics if the argument count disagrees with the schema — the
    /// catalogue was validated at startup, so this is a local bug.
    pub fn write(&self, schema: &Schema, writer: &mut WireWriter) {
        let Some(action_schema) = schema.action(self.action) else {
            panic!("request for unknown action id {}", self.action.to_u8());
        };
        if action_schema.args.len() != self.args.len() {
            panic!(
                "action {:?} takes {} argument(s), request carries {}",
                action_schema.name,
                action_schema.args.len(),
                self.args.len()
            );
        }
        self.action.ser(writer);
        self.correlation.ser(writer);
        for (wire_type, value) in action_schema.args.iter().zip(&self.args) {
            wire_type.write_value(value, writer);
        }
    }
}

/// Result of decoding an inbound action request. An unrecognized
/// action id is not a wire error: the correlation id is still
/// readable, and the server answers it with an ack-fail instead of
/// dropping the connection.
pub enum ActionRequestOutcome {
    Known(ActionRequest),
    UnknownAction {
        raw_action: u8,
        correlation: CorrelationId,
    },
}

pub fn read_action_request(
    schema: &Schema,
    reader: &mut WireReader,
) -> Result<ActionRequestOutcome, WireError> {
    let raw_action = reader.read_u8()?;
    let correlation = CorrelationId::de(reader)?;
    let action = ActionId(raw_action);
    let Some(action_schema) = schema.action(action) else {
        return Ok(ActionRequestOutcome::UnknownAction {
            raw_action,
            correlation,
        });
    };
    let mut args = Vec::with_capacity(action_schema.args.len());
    for wire_type in &action_schema.args {
        args.push(wire_type.read_value(reader)?);
    }
    Ok(ActionRequestOutcome::Known(ActionRequest {
        action,
        correlation,
        args,
    }))
}

/// `[action id][result values]` — broadcast to every client other than
/// the originator when an action succeeds.
pub struct ActionDo {
    pub action: ActionId,
    pub results: Vec<FieldValue>,
}

impl ActionDo {
    pub fn write(&self, schema: &Schema, writer: &mut WireWriter) {
        let Some(action_schema) = schema.action(self.action) else {
            panic!("do-notification for unknown action id {}", self.action.to_u8());
        };
        self.action.ser(writer);
        for (wire_type, value) in action_schema.results.iter().zip(&self.results) {
            wire_type.write_value(value, writer);
        }
    }

    pub fn read(schema: &Schema, reader: &mut WireReader) -> Result<Self, WireError> {
        let action = ActionId::de(reader)?;
        let Some(action_schema) = schema.action(action) else {
            return Err(WireError::UnknownDiscriminant {
                what: "action id",
                value: action.to_u8(),
            });
        };
        let mut results = Vec::with_capacity(action_schema.results.len());
        for wire_type in &action_schema.results {
            results.push(wire_type.read_value(reader)?);
        }
        Ok(Self { action, results })
    }
}

/// `[action id][correlation id][result values]` — sent to the
/// originator only.
pub struct ActionAckSuccess {
    pub action: ActionId,
    pub correlation: CorrelationId,
    pub results: Vec<FieldValue>,
}

impl ActionAckSuccess {
    pub fn write(&self, schema: &Schema, writer: &mut WireWriter) {
        let Some(action_schema) = schema.action(self.action) else {
            panic!("ack for unknown action id {}", self.action.to_u8());
        };
        self.action.ser(writer);
        self.correlation.ser(writer);
        for (wire_type, value) in action_schema.results.iter().zip(&self.results) {
            wire_type.write_value(value, writer);
        }
    }

    pub fn read(schema: &Schema, reader: &mut WireReader) -> Result<Self, WireError> {
        let action = ActionId::de(reader)?;
        let correlation = CorrelationId::de(reader)?;
        let Some(action_schema) = schema.action(action) else {
            return Err(WireError::UnknownDiscriminant {
                what: "action id",
                value: action.to_u8(),
            });
        };
        let mut results = Vec::with_capacity(action_schema.results.len());
        for wire_type in &action_schema.results {
            results.push(wire_type.read_value(reader)?);
        }
        Ok(Self {
            action,
            correlation,
            results,
        })
    }
}

/// `[action id][error code][correlation id]` — sent to the originator
/// only. The action id is raw because the rejected request may itself
/// have named an action the schema does not know.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionAckFail {
    pub raw_action: u8,
    pub code: ActionErrorCode,
    pub correlation: CorrelationId,
}

impl Wire for ActionAckFail {
    fn ser(&self, writer: &mut WireWriter) {
        writer.write_u8(self.raw_action);
        self.code.ser(writer);
        self.correlation.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, WireError> {
        Ok(Self {
            raw_action: reader.read_u8()?,
            code: ActionErrorCode::de(reader)?,
            correlation: CorrelationId::de(reader)?,
        })
    }
}
