use std::collections::BTreeMap;

use crate::{Schema, WireType};

/// Builder collecting the kind and action declarations both sides
/// agree on, evaluated once at process start.
///
/// Declaration order never matters: [`Protocol::build`] sorts names,
/// and the sorted order is the wire format. After `build` the protocol
/// is locked; further mutation panics.
pub struct Protocol {
    kinds: BTreeMap<String, (Vec<(String, WireType)>, Vec<(String, Vec<WireType>)>)>,
    actions: BTreeMap<String, (Vec<WireType>, Vec<WireType>)>,
    locked: bool,
}

impl Protocol {
    pub fn builder() -> Self {
        Self {
            kinds: BTreeMap::new(),
            actions: BTreeMap::new(),
            locked: false,
        }
    }

    /// Declares a replicable entity kind with its replicated fields
    /// and its custom events.
    ///
    /// # Panics
    ///
    /// Panics if the kind was already declared or the protocol is
    /// locked.
    pub fn add_kind(
        &mut self,
        name: &str,
        fields: Vec<(&str, WireType)>,
        events: Vec<(&str, Vec<WireType>)>,
    ) -> &mut Self {
        self.check_lock();
        if self.kinds.contains_key(name) {
            panic!("kind {:?} declared twice", name);
        }
        self.kinds.insert(
            name.to_string(),
            (
                fields
                    .into_iter()
                    .map(|(field, wire)| (field.to_string(), wire))
                    .collect(),
                events
                    .into_iter()
                    .map(|(event, args)| (event.to_string(), args))
                    .collect(),
            ),
        );
        self
    }

    /// Declares a player-initiated action with its argument and result
    /// types.
    ///
    /// # Panics
    ///
    /// Panics if the action was already declared or the protocol is
    /// locked.
    pub fn add_action(
        &mut self,
        name: &str,
        args: Vec<WireType>,
        results: Vec<WireType>,
    ) -> &mut Self {
        self.check_lock();
        if self.actions.contains_key(name) {
            panic!("action {:?} declared twice", name);
        }
        self.actions.insert(name.to_string(), (args, results));
        self
    }

    fn check_lock(&self) {
        if self.locked {
            panic!("protocol already locked");
        }
    }

    /// Sorts and freezes the declarations into the shared [`Schema`].
    pub fn build(&mut self) -> Schema {
        self.check_lock();
        self.locked = true;
        Schema::build(std::mem::take(&mut self.kinds), std::mem::take(&mut self.actions))
    }
}
