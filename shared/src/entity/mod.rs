pub mod context;
pub mod entity;
pub mod id;
pub mod registry;
pub mod subset;
