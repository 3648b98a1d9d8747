use std::collections::HashMap;

use tether_shared::Schema;

use crate::action::handler::AttemptHandler;

/// Collects attempt handlers by action name before the server starts.
///
/// [`AttemptRegistry::finalize`] checks the set against the schema's
/// action catalogue: an action without a handler would strand every
/// request for it, and a handler for an undeclared action is dead
/// configuration. Both panic at startup.
pub struct AttemptRegistry {
    handlers: HashMap<String, Box<dyn AttemptHandler>>,
}

impl AttemptRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// # Panics
    ///
    /// Panics if a handler for this action name was already
    /// registered.
    pub fn register(&mut self, action: &str, handler: Box<dyn AttemptHandler>) -> &mut Self {
        if self
            .handlers
            .insert(action.to_string(), handler)
            .is_some()
        {
            panic!("action {:?} registered twice", action);
        }
        self
    }

    /// Resolves names to action-id slots. Called once by the server
    /// constructor.
    pub(crate) fn finalize(mut self, schema: &Schema) -> Vec<Option<Box<dyn AttemptHandler>>> {
        let mut slots: Vec<Option<Box<dyn AttemptHandler>>> = Vec::new();
        for (id, action) in schema.actions() {
            let Some(handler) = self.handlers.remove(&action.name) else {
                panic!("action {:?} has no registered attempt handler", action.name);
            };
            debug_assert_eq!(id.to_u8() as usize, slots.len());
            slots.push(Some(handler));
        }
        if let Some(orphan) = self.handlers.keys().next() {
            panic!(
                "attempt handler registered for action {:?} which the schema never declared",
                orphan
            );
        }
        slots
    }
}

impl Default for AttemptRegistry {
    fn default() -> Self {
        Self::new()
    }
}
