use std::collections::{HashMap, VecDeque};

use crate::{Entity, FieldValue, TickContext};

/// Handler invoked when a subscribed event fires. `extra` is the
/// opaque word declared alongside the subscription.
pub type EventHandler = fn(&mut dyn Entity, &mut TickContext, u32, &[FieldValue]);

/// One static event subscription declared on an entity kind.
pub struct EventListener {
    pub event: &'static str,
    pub handler: EventHandler,
    pub extra: u32,
}

#[derive(Clone, Copy)]
pub(crate) struct Binding {
    pub(crate) entity_index: u32,
    pub(crate) handler: EventHandler,
    pub(crate) extra: u32,
}

/// Per-event sparse set of bindings, keyed by entity slot index so an
/// entity's binding can be dropped in O(1) when it dies.
struct SparseBindings {
    dense: Vec<Binding>,
    positions: HashMap<u32, usize>,
}

impl SparseBindings {
    fn new() -> Self {
        Self {
            dense: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn insert(&mut self, binding: Binding) -> bool {
        if self.positions.contains_key(&binding.entity_index) {
            return false;
        }
        self.positions
            .insert(binding.entity_index, self.dense.len());
        self.dense.push(binding);
        true
    }

    fn remove(&mut self, entity_index: u32) {
        let Some(position) = self.positions.remove(&entity_index) else {
            return;
        };
        self.dense.swap_remove(position);
        if position < self.dense.len() {
            self.positions
                .insert(self.dense[position].entity_index, position);
        }
    }
}

/// An event queued during a tick, dispatched at the next event pass.
pub struct QueuedEvent {
    pub name: String,
    pub args: Vec<FieldValue>,
}

/// "Call method M on entity E when event X fires" subscriptions.
///
/// Events are not dispatched inline: `emit` queues them, and the
/// registry drains the queue in its pre- and post-update passes so
/// handlers always run against a consistent entity list.
pub struct EventRegistry {
    events: HashMap<&'static str, SparseBindings>,
    subscriptions: HashMap<u32, Vec<&'static str>>,
    queue: VecDeque<QueuedEvent>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
            subscriptions: HashMap::new(),
            queue: VecDeque::new(),
        }
    }

    /// Binds one listener for one entity.
    ///
    /// # Panics
    ///
    /// Panics if the entity already holds a binding for this event —
    /// duplicate declarations are a configuration error caught when
    /// the entity is added, not a runtime condition.
    pub fn subscribe(&mut self, entity_index: u32, listener: &EventListener) {
        let bindings = self
            .events
            .entry(listener.event)
            .or_insert_with(SparseBindings::new);
        let inserted = bindings.insert(Binding {
            entity_index,
            handler: listener.handler,
            extra: listener.extra,
        });
        if !inserted {
            panic!(
                "entity slot {} already subscribed to event {:?}",
                entity_index, listener.event
            );
        }
        self.subscriptions
            .entry(entity_index)
            .or_default()
            .push(listener.event);
    }

    /// Drops every binding the entity holds, O(1) per subscription.
    pub fn remove_entity(&mut self, entity_index: u32) {
        let Some(names) = self.subscriptions.remove(&entity_index) else {
            return;
        };
        for name in names {
            if let Some(bindings) = self.events.get_mut(name) {
                bindings.remove(entity_index);
            }
        }
    }

    /// Queues an event for the next dispatch pass.
    pub fn emit(&mut self, name: impl Into<String>, args: Vec<FieldValue>) {
        self.queue.push_back(QueuedEvent {
            name: name.into(),
            args,
        });
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn pop_queued(&mut self) -> Option<QueuedEvent> {
        self.queue.pop_front()
    }

    pub(crate) fn bindings_for(&self, name: &str) -> Vec<Binding> {
        self.events
            .get(name)
            .map(|bindings| bindings.dense.clone())
            .unwrap_or_default()
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}
