use std::collections::HashMap;

use crate::{Entity, EntityId};

/// Handle to a subset view registered on the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubsetKey(pub(crate) usize);

/// A filtered mirror of the main registry, so a scene can iterate only
/// its own entities while one global registry backs everything.
///
/// Removal is two-phase like the registry's own: ids are queued first
/// and dropped together in `flush`, so a subset never observes a
/// partially-destroyed entity.
pub struct EntitySubset {
    filter: fn(&dyn Entity) -> bool,
    dense: Vec<EntityId>,
    sparse: HashMap<u32, usize>,
    pending_removal: Vec<EntityId>,
}

impl EntitySubset {
    pub(crate) fn new(filter: fn(&dyn Entity) -> bool) -> Self {
        Self {
            filter,
            dense: Vec::new(),
            sparse: HashMap::new(),
            pending_removal: Vec::new(),
        }
    }

    pub(crate) fn offer(&mut self, id: EntityId, entity: &dyn Entity) {
        if (self.filter)(entity) && !self.sparse.contains_key(&id.index()) {
            self.sparse.insert(id.index(), self.dense.len());
            self.dense.push(id);
        }
    }

    pub(crate) fn queue_remove(&mut self, id: EntityId) {
        if self.sparse.contains_key(&id.index()) {
            self.pending_removal.push(id);
        }
    }

    pub(crate) fn flush(&mut self) {
        for id in std::mem::take(&mut self.pending_removal) {
            let Some(position) = self.sparse.remove(&id.index()) else {
                continue;
            };
            self.dense.swap_remove(position);
            if position < self.dense.len() {
                self.sparse.insert(self.dense[position].index(), position);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.dense.clear();
        self.sparse.clear();
        self.pending_removal.clear();
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.sparse.contains_key(&id.index())
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.dense.iter().copied()
    }
}
