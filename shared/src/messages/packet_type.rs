use tether_wire::{Wire, WireError, WireReader, WireWriter};

/// First byte of every packet: which message follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketType {
    /// A replicated entity came into existence. Always sent, whether
    /// or not any field is dirty.
    Spawn,
    /// A replicated entity was destroyed. Always sent.
    Despawn,
    /// Dirty-field state for one replicated entity.
    Update,
    /// Client asks the server to validate and replay an action.
    ActionRequest,
    /// Server tells the *other* clients an action happened.
    ActionDo,
    /// Server confirms the originator's action, echoing the
    /// correlation id.
    ActionAckSuccess,
    /// Server rejects the originator's action with a typed error code.
    ActionAckFail,
}

impl PacketType {
    fn to_u8(self) -> u8 {
        match self {
            PacketType::Spawn => 0,
            PacketType::Despawn => 1,
            PacketType::Update => 2,
            PacketType::ActionRequest => 3,
            PacketType::ActionDo => 4,
            PacketType::ActionAckSuccess => 5,
            PacketType::ActionAckFail => 6,
        }
    }
}

impl Wire for PacketType {
    fn ser(&self, writer: &mut WireWriter) {
        writer.write_u8(self.to_u8());
    }

    fn de(reader: &mut WireReader) -> Result<Self, WireError> {
        match reader.read_u8()? {
            0 => Ok(PacketType::Spawn),
            1 => Ok(PacketType::Despawn),
            2 => Ok(PacketType::Update),
            3 => Ok(PacketType::ActionRequest),
            4 => Ok(PacketType::ActionDo),
            5 => Ok(PacketType::ActionAckSuccess),
            6 => Ok(PacketType::ActionAckFail),
            value => Err(WireError::UnknownDiscriminant {
                what: "packet type",
                value,
            }),
        }
    }
}
