use std::{any::TypeId, collections::HashMap};

/// Runtime id of a component type, assigned the first time an instance
/// of the type is registered. Fixed for the process lifetime after
/// that.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComponentTypeId(u16);

impl ComponentTypeId {
    pub fn to_u16(&self) -> u16 {
        self.0
    }
}

/// First-seen discovery table mapping Rust types to their small runtime
/// ids. There is no fixed enum of component types; the table grows as
/// types show up.
pub struct ComponentKinds {
    ids: HashMap<TypeId, ComponentTypeId>,
    names: Vec<&'static str>,
}

impl ComponentKinds {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            names: Vec::new(),
        }
    }

    pub fn kind_of<T: 'static>(&self) -> Option<ComponentTypeId> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    pub fn name_of(&self, kind: ComponentTypeId) -> &'static str {
        self.names
            .get(kind.0 as usize)
            .copied()
            .unwrap_or("<unknown component type>")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the type's id, assigning the next one on first sight.
    /// The boolean is true when this call discovered the type.
    pub(crate) fn register<T: 'static>(&mut self) -> (ComponentTypeId, bool) {
        if let Some(existing) = self.kind_of::<T>() {
            return (existing, false);
        }
        if self.names.len() > u16::MAX as usize {
            panic!("component type id space exhausted");
        }
        let id = ComponentTypeId(self.names.len() as u16);
        self.ids.insert(TypeId::of::<T>(), id);
        self.names.push(std::any::type_name::<T>());
        (id, true)
    }
}

impl Default for ComponentKinds {
    fn default() -> Self {
        Self::new()
    }
}
