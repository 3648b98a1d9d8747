//! Shared fixtures for the cross-crate end-to-end tests: a small test
//! protocol, the entities that implement it, and packet-exchange
//! helpers standing in for a transport.

pub mod helpers;
pub mod test_protocol;
pub mod test_world;

pub use helpers::*;
pub use test_protocol::{protocol, ProjectileShotAttempt, REGISTRATIONS};
pub use test_world::{Bullet, ItemEntity};
