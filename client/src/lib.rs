//! # Tether Client
//! The consuming side of the replication stream: mirrors the server's
//! replicated entities, surfaces world changes as events, and manages
//! speculative action prediction against server acknowledgements.

mod client;
mod prediction;
mod remote_world;

pub use client::{Client, ClientEvent};
pub use prediction::{Predicted, PredictionManager, PredictionState};
pub use remote_world::RemoteWorld;
