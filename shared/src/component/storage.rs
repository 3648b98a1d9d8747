use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

use log::debug;

use crate::{ComponentKinds, ComponentTypeId};

/// Callback fired when a component of a given type is attached to or
/// detached from an entity, so other systems can stay in sync without
/// re-scanning storage.
pub type ComponentListener = fn(entity_index: u32);

/// Handle to a component membership query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryKey(usize);

const INVALID: u32 = u32::MAX;

struct TypedStore {
    dense: Vec<Box<dyn Any>>,
    owners: Vec<u32>,
    sparse: Vec<u32>,
    on_add: Vec<ComponentListener>,
    on_remove: Vec<ComponentListener>,
    queries: Vec<usize>,
}

impl TypedStore {
    fn new() -> Self {
        Self {
            dense: Vec::new(),
            owners: Vec::new(),
            sparse: Vec::new(),
            on_add: Vec::new(),
            on_remove: Vec::new(),
            queries: Vec::new(),
        }
    }

    fn slot(&self, entity: u32) -> Option<usize> {
        match self.sparse.get(entity as usize).copied() {
            Some(slot) if slot != INVALID => Some(slot as usize),
            _ => None,
        }
    }

    fn ensure_sparse(&mut self, entity: u32) {
        if self.sparse.len() <= entity as usize {
            self.sparse.resize(entity as usize + 1, INVALID);
        }
    }

    fn push(&mut self, entity: u32, value: Box<dyn Any>) {
        self.ensure_sparse(entity);
        self.sparse[entity as usize] = self.dense.len() as u32;
        self.dense.push(value);
        self.owners.push(entity);
    }

    /// Swap-removes the entity's component, fixing up the sparse entry
    /// of whichever component got moved into the vacated slot.
    fn remove_raw(&mut self, entity: u32) -> Option<Box<dyn Any>> {
        let slot = self.slot(entity)?;
        self.sparse[entity as usize] = INVALID;
        let value = self.dense.swap_remove(slot);
        self.owners.swap_remove(slot);
        if slot < self.dense.len() {
            let moved_owner = self.owners[slot];
            self.sparse[moved_owner as usize] = slot as u32;
        }
        Some(value)
    }
}

struct QueryState {
    members: Vec<u32>,
    positions: HashMap<u32, usize>,
}

impl QueryState {
    fn new() -> Self {
        Self {
            members: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn add(&mut self, entity: u32) {
        if !self.positions.contains_key(&entity) {
            self.positions.insert(entity, self.members.len());
            self.members.push(entity);
        }
    }

    fn remove(&mut self, entity: u32) {
        let Some(position) = self.positions.remove(&entity) else {
            return;
        };
        self.members.swap_remove(position);
        if position < self.members.len() {
            self.positions.insert(self.members[position], position);
        }
    }
}

enum PendingBinding {
    Query(usize),
    OnAdd(ComponentListener),
    OnRemove(ComponentListener),
}

/// Typed component containers indexed by entity slot index.
///
/// One dense array per type plus one sparse index array per type;
/// insertion, lookup and removal are O(1), with removal swapping the
/// last dense element into the vacated slot. A type's runtime id is
/// assigned by first-seen discovery when the first instance arrives;
/// queries and listeners registered before that moment are back-filled
/// against the type once it is discovered.
pub struct ComponentStorage {
    kinds: ComponentKinds,
    stores: Vec<TypedStore>,
    attached: HashMap<u32, Vec<ComponentTypeId>>,
    queries: Vec<QueryState>,
    pending: Vec<(TypeId, PendingBinding)>,
}

impl ComponentStorage {
    pub fn new() -> Self {
        Self {
            kinds: ComponentKinds::new(),
            stores: Vec::new(),
            attached: HashMap::new(),
            queries: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn kinds(&self) -> &ComponentKinds {
        &self.kinds
    }

    /// Attaches a component to the entity. Inserting a type the entity
    /// already carries replaces the value in place (no listener or
    /// query churn).
    pub fn insert<T: 'static>(&mut self, entity: u32, value: T) {
        let (kind, discovered) = self.kinds.register::<T>();
        if discovered {
            self.stores.push(TypedStore::new());
            self.bind_pending(TypeId::of::<T>(), kind);
            debug!(
                "component type {:?} discovered as id {}",
                std::any::type_name::<T>(),
                kind.to_u16()
            );
        }

        let store = &mut self.stores[kind.to_u16() as usize];
        if let Some(slot) = store.slot(entity) {
            store.dense[slot] = Box::new(value);
            return;
        }
        store.push(entity, Box::new(value));

        let listeners = store.on_add.clone();
        let queries = store.queries.clone();
        self.attached.entry(entity).or_default().push(kind);
        for query in queries {
            self.queries[query].add(entity);
        }
        for listener in listeners {
            listener(entity);
        }
    }

    /// Detaches and returns the entity's component of type `T`.
    pub fn remove<T: 'static>(&mut self, entity: u32) -> Option<T> {
        let kind = self.kinds.kind_of::<T>()?;
        let boxed = self.remove_by_kind(entity, kind)?;
        match boxed.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(_) => panic!(
                "component store {} held a value of the wrong type",
                self.kinds.name_of(kind)
            ),
        }
    }

    fn remove_by_kind(&mut self, entity: u32, kind: ComponentTypeId) -> Option<Box<dyn Any>> {
        let store = &mut self.stores[kind.to_u16() as usize];
        let value = store.remove_raw(entity)?;
        let listeners = store.on_remove.clone();
        let queries = store.queries.clone();

        if let Some(list) = self.attached.get_mut(&entity) {
            list.retain(|attached| *attached != kind);
            if list.is_empty() {
                self.attached.remove(&entity);
            }
        }
        for query in queries {
            self.queries[query].remove(entity);
        }
        for listener in listeners {
            listener(entity);
        }
        Some(value)
    }

    /// Detaches every component the entity carries, in attach order.
    pub fn remove_all(&mut self, entity: u32) {
        let Some(kinds) = self.attached.remove(&entity) else {
            return;
        };
        for kind in kinds {
            let store = &mut self.stores[kind.to_u16() as usize];
            if store.remove_raw(entity).is_none() {
                continue;
            }
            let listeners = store.on_remove.clone();
            let queries = store.queries.clone();
            for query in queries {
                self.queries[query].remove(entity);
            }
            for listener in listeners {
                listener(entity);
            }
        }
    }

    pub fn get<T: 'static>(&self, entity: u32) -> Option<&T> {
        let kind = self.kinds.kind_of::<T>()?;
        let store = &self.stores[kind.to_u16() as usize];
        store.dense[store.slot(entity)?].downcast_ref::<T>()
    }

    pub fn get_mut<T: 'static>(&mut self, entity: u32) -> Option<&mut T> {
        let kind = self.kinds.kind_of::<T>()?;
        let store = &mut self.stores[kind.to_u16() as usize];
        let slot = store.slot(entity)?;
        store.dense[slot].downcast_mut::<T>()
    }

    pub fn has<T: 'static>(&self, entity: u32) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// The entity's attached component types, in attach order.
    pub fn attached(&self, entity: u32) -> &[ComponentTypeId] {
        self.attached
            .get(&entity)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Creates a membership query for type `T`: the set of entity
    /// indices currently carrying a `T`, kept in sync by storage. The
    /// query may be created before any `T` has ever been inserted; it
    /// attaches once the type is discovered.
    pub fn create_query<T: 'static>(&mut self) -> QueryKey {
        let key = QueryKey(self.queries.len());
        let mut state = QueryState::new();
        if let Some(kind) = self.kinds.kind_of::<T>() {
            let store = &mut self.stores[kind.to_u16() as usize];
            for owner in &store.owners {
                state.add(*owner);
            }
            store.queries.push(key.0);
        } else {
            self.pending
                .push((TypeId::of::<T>(), PendingBinding::Query(key.0)));
        }
        self.queries.push(state);
        key
    }

    pub fn query(&self, key: QueryKey) -> &[u32] {
        &self.queries[key.0].members
    }

    pub fn on_add<T: 'static>(&mut self, listener: ComponentListener) {
        match self.kinds.kind_of::<T>() {
            Some(kind) => self.stores[kind.to_u16() as usize].on_add.push(listener),
            None => self
                .pending
                .push((TypeId::of::<T>(), PendingBinding::OnAdd(listener))),
        }
    }

    pub fn on_remove<T: 'static>(&mut self, listener: ComponentListener) {
        match self.kinds.kind_of::<T>() {
            Some(kind) => self.stores[kind.to_u16() as usize].on_remove.push(listener),
            None => self
                .pending
                .push((TypeId::of::<T>(), PendingBinding::OnRemove(listener))),
        }
    }

    fn bind_pending(&mut self, type_id: TypeId, kind: ComponentTypeId) {
        let store = &mut self.stores[kind.to_u16() as usize];
        let mut remaining = Vec::new();
        for (pending_type, binding) in self.pending.drain(..) {
            if pending_type != type_id {
                remaining.push((pending_type, binding));
                continue;
            }
            match binding {
                PendingBinding::Query(query) => store.queries.push(query),
                PendingBinding::OnAdd(listener) => store.on_add.push(listener),
                PendingBinding::OnRemove(listener) => store.on_remove.push(listener),
            }
        }
        self.pending = remaining;
    }
}

impl Default for ComponentStorage {
    fn default() -> Self {
        Self::new()
    }
}
