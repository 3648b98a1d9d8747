use std::collections::HashMap;

use log::warn;

use tether_shared::{ActionErrorCode, CorrelationId, FieldValue};

/// Client-side settlement hooks for one speculative action.
///
/// The local mutation has already been applied by the time the
/// prediction is registered; these hooks run when the server's answer
/// arrives. `confirm` may reconcile against the authoritative result
/// values; `rollback` must undo the speculative mutation.
pub trait Predicted {
    fn confirm(&mut self, results: &[FieldValue]);
    fn rollback(&mut self, code: ActionErrorCode);
}

/// Lifecycle of one prediction. Both settled states are terminal:
/// there are no retries, and a second ack for the same correlation id
/// is a logged no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredictionState {
    Predicted,
    Confirmed,
    RolledBack,
}

/// Mints correlation ids and holds unsettled predictions until the
/// matching ack arrives.
pub struct PredictionManager {
    next: u32,
    pending: HashMap<u32, Box<dyn Predicted>>,
    states: HashMap<u32, PredictionState>,
}

impl PredictionManager {
    pub fn new() -> Self {
        Self {
            next: 1,
            pending: HashMap::new(),
            states: HashMap::new(),
        }
    }

    /// Registers a prediction under a fresh correlation id. Ids
    /// increment from 1 and are never reused within a session.
    pub fn track(&mut self, prediction: Box<dyn Predicted>) -> CorrelationId {
        let correlation = CorrelationId(self.next);
        self.next += 1;
        self.pending.insert(correlation.0, prediction);
        self.states.insert(correlation.0, PredictionState::Predicted);
        correlation
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// `None` for a correlation id this manager never minted.
    pub fn state(&self, correlation: CorrelationId) -> Option<PredictionState> {
        self.states.get(&correlation.0).copied()
    }

    /// Settles the matching prediction as confirmed. Returns false
    /// (and changes nothing) when the correlation id is unknown or
    /// already settled.
    pub fn resolve_success(
        &mut self,
        correlation: CorrelationId,
        results: &[FieldValue],
    ) -> bool {
        let Some(mut prediction) = self.pending.remove(&correlation.0) else {
            warn!("ack-success for unmatched correlation {}; ignoring", correlation);
            return false;
        };
        prediction.confirm(results);
        self.states.insert(correlation.0, PredictionState::Confirmed);
        true
    }

    /// Settles the matching prediction as rolled back, running its
    /// rollback hook with the server's error code.
    pub fn resolve_fail(&mut self, correlation: CorrelationId, code: ActionErrorCode) -> bool {
        let Some(mut prediction) = self.pending.remove(&correlation.0) else {
            warn!("ack-fail for unmatched correlation {}; ignoring", correlation);
            return false;
        };
        prediction.rollback(code);
        self.states.insert(correlation.0, PredictionState::RolledBack);
        true
    }
}

impl Default for PredictionManager {
    fn default() -> Self {
        Self::new()
    }
}
