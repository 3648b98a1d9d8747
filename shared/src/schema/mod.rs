pub mod field_value;
pub mod registration;
#[allow(clippy::module_inception)]
pub mod schema;
pub mod wire_type;
