//! # Tether Server
//! The authoritative side of the simulation: owns the entity registry
//! and the replica set, arbitrates client action attempts, and writes
//! the spawn/despawn/update packet stream every connected client
//! consumes.

mod action;
mod error;
mod server;
mod user;
mod world;

pub use action::{
    handler::{AttemptContext, AttemptHandler},
    registry::AttemptRegistry,
};
pub use error::ServerError;
pub use server::Server;
pub use world::host_world::HostWorld;
