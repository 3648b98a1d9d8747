use std::collections::{BTreeMap, HashMap};

use tether_wire::{Wire, WireError, WireReader, WireWriter};

use crate::WireType;

/// Widest dirty mask carried per replica. A kind declaring more fields
/// than this fails at schema build, never silently truncates.
pub const MAX_REPLICATED_FIELDS: usize = 64;

/// Sort-derived integer identifying a replicable entity kind on the
/// wire. No kind names ever cross the network, only these positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KindId(pub(crate) u8);

impl KindId {
    pub fn to_u8(&self) -> u8 {
        self.0
    }
}

impl Wire for KindId {
    fn ser(&self, writer: &mut WireWriter) {
        writer.write_u8(self.0);
    }

    fn de(reader: &mut WireReader) -> Result<Self, WireError> {
        Ok(Self(reader.read_u8()?))
    }
}

/// Sort-derived integer identifying a player action on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActionId(pub(crate) u8);

impl ActionId {
    pub fn to_u8(&self) -> u8 {
        self.0
    }
}

impl Wire for ActionId {
    fn ser(&self, writer: &mut WireWriter) {
        writer.write_u8(self.0);
    }

    fn de(reader: &mut WireReader) -> Result<Self, WireError> {
        Ok(Self(reader.read_u8()?))
    }
}

#[derive(Clone, Debug)]
pub struct FieldSchema {
    pub name: String,
    pub wire: WireType,
}

/// One declared event of a kind. The sorted catalogue fixes each
/// event's id on both hosts; dispatch itself stays name-keyed and
/// local, so this is agreed-upon catalogue data, not a runtime
/// lookup path.
#[derive(Clone, Debug)]
pub struct EventSchema {
    pub name: String,
    pub args: Vec<WireType>,
}

/// One replicable entity kind: its replicated fields and its custom
/// events, each alphabetically ordered. The sorted order *is* the wire
/// format — field index N in a packet means the Nth field here.
#[derive(Clone, Debug)]
pub struct KindSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
    pub events: Vec<EventSchema>,
}

impl KindSchema {
    pub fn field_count(&self) -> u8 {
        self.fields.len() as u8
    }

    pub fn field_index(&self, name: &str) -> Option<u8> {
        self.fields
            .iter()
            .position(|field| field.name == name)
            .map(|index| index as u8)
    }

    pub fn event_index(&self, name: &str) -> Option<u8> {
        self.events
            .iter()
            .position(|event| event.name == name)
            .map(|index| index as u8)
    }
}

#[derive(Clone, Debug)]
pub struct ActionSchema {
    pub name: String,
    pub args: Vec<WireType>,
    pub results: Vec<WireType>,
}

/// The static catalogue both sides derive independently at process
/// start. Construction sorts declared kind names, field names, event
/// names and action names, so identical declarations yield identical
/// ids regardless of declaration order.
pub struct Schema {
    kinds: Vec<KindSchema>,
    kind_ids: HashMap<String, KindId>,
    actions: Vec<ActionSchema>,
    action_ids: HashMap<String, ActionId>,
}

impl Schema {
    pub(crate) fn build(
        kind_decls: BTreeMap<String, (Vec<(String, WireType)>, Vec<(String, Vec<WireType>)>)>,
        action_decls: BTreeMap<String, (Vec<WireType>, Vec<WireType>)>,
    ) -> Self {
        if kind_decls.len() > u8::MAX as usize {
            panic!("schema declares {} kinds; at most 256 fit a shared id byte", kind_decls.len());
        }
        if action_decls.len() > u8::MAX as usize {
            panic!(
                "schema declares {} actions; at most 256 fit a shared id byte",
                action_decls.len()
            );
        }

        let mut kinds = Vec::with_capacity(kind_decls.len());
        let mut kind_ids = HashMap::new();
        // BTreeMap iteration is already name-sorted; the position in
        // this loop becomes the shared kind id.
        for (position, (name, (mut fields, mut events))) in kind_decls.into_iter().enumerate() {
            if fields.len() > MAX_REPLICATED_FIELDS {
                panic!(
                    "kind {:?} declares {} replicated fields; dirty mask holds {}",
                    name,
                    fields.len(),
                    MAX_REPLICATED_FIELDS
                );
            }
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            events.sort_by(|a, b| a.0.cmp(&b.0));
            Self::check_duplicates(&name, "field", fields.iter().map(|(n, _)| n.as_str()));
            Self::check_duplicates(&name, "event", events.iter().map(|(n, _)| n.as_str()));
            for (field, wire) in &fields {
                if let WireType::Vec2(subtype) = wire {
                    if !subtype.is_numeric() {
                        panic!(
                            "kind {:?} field {:?}: vector subtype {:?} is not numeric",
                            name, field, subtype
                        );
                    }
                }
            }

            kind_ids.insert(name.clone(), KindId(position as u8));
            kinds.push(KindSchema {
                name,
                fields: fields
                    .into_iter()
                    .map(|(name, wire)| FieldSchema { name, wire })
                    .collect(),
                events: events
                    .into_iter()
                    .map(|(name, args)| EventSchema { name, args })
                    .collect(),
            });
        }

        let mut actions = Vec::with_capacity(action_decls.len());
        let mut action_ids = HashMap::new();
        for (position, (name, (args, results))) in action_decls.into_iter().enumerate() {
            action_ids.insert(name.clone(), ActionId(position as u8));
            actions.push(ActionSchema { name, args, results });
        }

        Self {
            kinds,
            kind_ids,
            actions,
            action_ids,
        }
    }

    fn check_duplicates<'n>(
        kind: &str,
        what: &str,
        mut names: impl Iterator<Item = &'n str>,
    ) {
        let mut previous: Option<&str> = None;
        for name in &mut names {
            if previous == Some(name) {
                panic!("kind {:?} declares {} {:?} twice", kind, what, name);
            }
            previous = Some(name);
        }
    }

    pub fn kind_count(&self) -> usize {
        self.kinds.len()
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn kind_id(&self, name: &str) -> Option<KindId> {
        self.kind_ids.get(name).copied()
    }

    pub fn kind(&self, id: KindId) -> Option<&KindSchema> {
        self.kinds.get(id.0 as usize)
    }

    pub fn kinds(&self) -> impl Iterator<Item = (KindId, &KindSchema)> {
        self.kinds
            .iter()
            .enumerate()
            .map(|(position, kind)| (KindId(position as u8), kind))
    }

    pub fn action_id(&self, name: &str) -> Option<ActionId> {
        self.action_ids.get(name).copied()
    }

    pub fn action(&self, id: ActionId) -> Option<&ActionSchema> {
        self.actions.get(id.0 as usize)
    }

    pub fn actions(&self) -> impl Iterator<Item = (ActionId, &ActionSchema)> {
        self.actions
            .iter()
            .enumerate()
            .map(|(position, action)| (ActionId(position as u8), action))
    }

    /// Checks a concrete kind registration against the declared schema:
    /// the two field-name sets must agree exactly.
    ///
    /// # Panics
    ///
    /// Panics naming the kind and the first offending field. There is
    /// no recovery path — a silent mismatch would corrupt every future
    /// packet of this kind.
    pub fn validate_kind_fields(&self, kind_name: &str, declared: &[&str]) {
        let Some(id) = self.kind_id(kind_name) else {
            panic!("registration for kind {:?} which the schema never declared", kind_name);
        };
        let kind = &self.kinds[id.0 as usize];
        for field in &kind.fields {
            if !declared.contains(&field.name.as_str()) {
                panic!(
                    "kind {:?}: schema field {:?} missing from concrete registration",
                    kind_name, field.name
                );
            }
        }
        for field in declared {
            if kind.field_index(field).is_none() {
                panic!(
                    "kind {:?}: concrete registration declares field {:?} unknown to the schema",
                    kind_name, field
                );
            }
        }
    }
}
